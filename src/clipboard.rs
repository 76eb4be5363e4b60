use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Native(#[from] arboard::Error),

    #[error("no clipboard helper found (tried {0})")]
    Unavailable(String),

    #[error("{helper} failed: {reason}")]
    Helper { helper: &'static str, reason: String },
}

/// Command-line fallbacks tried in order; each reads the text on stdin.
const HELPERS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

/// Best-effort write to the system clipboard.
///
/// Uses the native clipboard first and falls back to command-line helpers
/// when no native clipboard can be opened (e.g. no display connection).
pub fn copy(text: &str) -> Result<(), ClipboardError> {
    let native = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
    match native {
        Ok(()) => {
            debug!(bytes = text.len(), "copied to native clipboard");
            Ok(())
        }
        Err(native) => {
            debug!(error = %native, "native clipboard failed, trying helpers");
            copy_with(HELPERS, text).map_err(|e| match e {
                ClipboardError::Unavailable(_) => ClipboardError::Native(native),
                other => other,
            })
        }
    }
}

/// Pipe `text` into the first helper that accepts it.
///
/// Only the helper's own exit is awaited; `xclip` and `wl-copy` leave a
/// process behind to serve the selection, so no output pipes are held.
fn copy_with(helpers: &[(&'static str, &[&str])], text: &str) -> Result<(), ClipboardError> {
    for &(helper, args) in helpers {
        let child = Command::new(helper)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(c) => c,
            Err(e) => {
                debug!(helper, error = %e, "clipboard helper not usable");
                continue;
            }
        };

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait().map_err(|e| ClipboardError::Helper {
            helper,
            reason: e.to_string(),
        })?;
        if let Err(e) = written {
            debug!(helper, error = %e, %status, "clipboard helper did not take input");
            continue;
        }

        if status.success() {
            debug!(helper, bytes = text.len(), "copied to clipboard");
            return Ok(());
        }
        return Err(ClipboardError::Helper {
            helper,
            reason: format!("exited with {status}"),
        });
    }

    let tried: Vec<&str> = helpers.iter().map(|(h, _)| *h).collect();
    Err(ClipboardError::Unavailable(tried.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const NO_ARGS: &[&str] = &[];

    #[test]
    fn missing_helpers_report_unavailable() {
        let err = copy_with(&[("ptgen-no-such-helper", NO_ARGS)], "x").unwrap_err();
        assert!(matches!(err, ClipboardError::Unavailable(_)));
        assert!(err.to_string().contains("ptgen-no-such-helper"));
    }

    #[cfg(unix)]
    #[test]
    fn first_working_helper_wins() {
        // `cat` consumes stdin and exits 0
        copy_with(&[("ptgen-no-such-helper", NO_ARGS), ("cat", NO_ARGS)], "hello").unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn failing_helper_is_reported() {
        let args: &[&str] = &["-c", "cat >/dev/null; exit 3"];
        let err = copy_with(&[("sh", args)], "hello").unwrap_err();
        assert!(matches!(err, ClipboardError::Helper { helper: "sh", .. }));
        assert!(err.to_string().contains("exited with"), "got: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn helper_leaving_background_process_does_not_block() {
        let args: &[&str] = &["-c", "cat >/dev/null; sleep 4 & exit 0"];
        let started = Instant::now();
        copy_with(&[("sh", args)], "hello").unwrap();
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "copy blocked for {:?}",
            started.elapsed()
        );
    }

    #[cfg(unix)]
    #[test]
    fn helper_closing_stdin_early_falls_through_to_next() {
        let args: &[&str] = &["-c", "exec 0<&-; exit 0"];
        let text = "x".repeat(1 << 20);
        copy_with(&[("sh", args), ("cat", NO_ARGS)], &text).unwrap();
    }
}
