mod api;
mod clipboard;
mod format;
mod query;
mod session;
mod state;

pub const USER_AGENT: &str = concat!("ptgen/", env!("CARGO_PKG_VERSION"));

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use api::ApiClient;
use api::types::Classified;
use query::Source;
use session::Session;
use state::AppState;

#[derive(Debug, Parser)]
#[command(
    name = "ptgen",
    version,
    about = "Generate PT descriptions from a link, or search by keyword and pick a result"
)]
struct Cli {
    /// URL (http...) or search keyword
    #[arg(required_unless_present = "list_sources")]
    input: Option<String>,

    /// Where keyword searches run; ignored for URLs
    #[arg(short, long, value_enum, default_value_t = Source::Auto)]
    source: Source,

    /// Pick the N-th search result without prompting
    #[arg(short, long, value_name = "N")]
    pick: Option<usize>,

    /// Copy the generated text to the clipboard
    #[arg(short, long)]
    copy: bool,

    /// Print the classified response as JSON
    #[arg(long)]
    json: bool,

    /// Backend endpoint (overrides PTGEN_ENDPOINT)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// List search sources and exit
    #[arg(long)]
    list_sources: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "ptgen=debug" } else { "ptgen=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    if cli.list_sources {
        print!("{}", format::format_sources());
        return Ok(ExitCode::SUCCESS);
    }

    let input = cli.input.unwrap_or_default();
    if let Err(message) = check_input(&input) {
        eprintln!("error: {message}");
        return Ok(ExitCode::from(2));
    }

    let http = ApiClient::http_client()?;
    let client = match cli.endpoint.as_deref() {
        Some(endpoint) => ApiClient::with_endpoint(http, endpoint)?,
        None => ApiClient::from_env(http)?,
    };
    info!(endpoint = %client.endpoint(), "using backend");

    let mut session = Session::new(client);
    session.submit(&input, cli.source).await;

    let interactive = std::io::stdin().is_terminal() && !cli.json;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pick = cli.pick;

    loop {
        let state = session.state();
        let (Some(items), Some(site)) = (&state.search_results, &state.last_search_site) else {
            break;
        };
        if let Some(n) = pick.take() {
            session.select(n).await;
            continue;
        }

        let len = items.len();
        if cli.json {
            print_json(state)?;
        } else {
            print!("{}", format::format_search_results(site, items));
        }
        if !interactive {
            return Ok(ExitCode::SUCCESS);
        }
        match prompt_pick(&mut lines, len).await? {
            Some(n) => session.select(n).await,
            None => return Ok(ExitCode::SUCCESS),
        }
    }

    if let Some(ref message) = session.state().error {
        if cli.json {
            print_json(session.state())?;
        }
        eprintln!("error: {message}");
        return Ok(ExitCode::FAILURE);
    }

    if cli.json {
        print_json(session.state())?;
    } else {
        println!("{}", session.state().result);
    }

    if cli.copy {
        match session.copy() {
            Some(text) => match clipboard::copy(&text) {
                Ok(()) => eprintln!("Copied to clipboard."),
                Err(e) => {
                    warn!(error = %e, "clipboard write failed");
                    eprintln!("note: could not copy to clipboard ({e})");
                }
            },
            None => eprintln!("note: nothing to copy"),
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Same rule as the reducer: only the empty string is rejected.
fn check_input(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        Err("input must not be empty")
    } else {
        Ok(())
    }
}

/// Rebuild the classified view of the current state for `--json`.
fn snapshot(state: &AppState) -> Option<Classified> {
    if let Some(ref message) = state.error {
        return Some(Classified::Failure {
            message: message.clone(),
        });
    }
    if let (Some(items), Some(site)) = (&state.search_results, &state.last_search_site) {
        return Some(Classified::Search {
            site: site.clone(),
            items: items.clone(),
        });
    }
    state.record.clone().map(Classified::Record)
}

fn print_json(state: &AppState) -> Result<(), serde_json::Error> {
    if let Some(classified) = snapshot(state) {
        println!("{}", serde_json::to_string_pretty(&classified)?);
    }
    Ok(())
}

/// Ask for a 1-based result number; `None` on quit or end of input.
async fn prompt_pick(lines: &mut Lines<BufReader<Stdin>>, len: usize) -> std::io::Result<Option<usize>> {
    loop {
        eprint!("Pick a result [1-{len}] (q to quit): ");
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => return Ok(Some(n)),
            _ => eprintln!("enter a number between 1 and {len}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{FormattedRecord, SearchResultItem};

    #[test]
    fn cli_parses_source_and_pick() {
        let cli = Cli::try_parse_from(["ptgen", "--source", "douban", "-p", "2", "三体"]).unwrap();
        assert_eq!(cli.source, Source::Douban);
        assert_eq!(cli.pick, Some(2));
        assert_eq!(cli.input.as_deref(), Some("三体"));
    }

    #[test]
    fn cli_defaults_to_auto() {
        let cli = Cli::try_parse_from(["ptgen", "Dune"]).unwrap();
        assert_eq!(cli.source, Source::Auto);
        assert!(!cli.copy);
    }

    #[test]
    fn cli_requires_input_unless_listing() {
        assert!(Cli::try_parse_from(["ptgen"]).is_err());
        assert!(Cli::try_parse_from(["ptgen", "--list-sources"]).is_ok());
        assert!(Cli::try_parse_from(["ptgen", "-s", "bangumi", "x"]).is_err());
    }

    #[test]
    fn only_empty_input_is_rejected() {
        assert!(check_input("").is_err());
        assert!(check_input("   ").is_ok());
        assert!(check_input(" 三体 ").is_ok());
    }

    #[test]
    fn snapshot_prefers_error_then_search_then_record() {
        let mut state = AppState::default();
        assert_eq!(snapshot(&state), None);

        state.record = Some(FormattedRecord {
            format: "f".into(),
            site: "douban".into(),
            id: "1".into(),
        });
        assert!(matches!(snapshot(&state), Some(Classified::Record(_))));

        state.search_results = Some(vec![SearchResultItem::default()]);
        state.last_search_site = Some("search-douban".into());
        assert!(matches!(snapshot(&state), Some(Classified::Search { .. })));

        state.error = Some("boom".into());
        assert_eq!(
            snapshot(&state),
            Some(Classified::Failure {
                message: "boom".into()
            })
        );
    }
}
