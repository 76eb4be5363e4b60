use tracing::{info, warn};

use crate::api::Backend;
use crate::api::types::{Classified, classify_response};
use crate::query::Source;
use crate::state::{AppState, Effect, Event};

/// Drives [`AppState`] against a backend, one request at a time.
pub struct Session<B> {
    backend: B,
    state: AppState,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn submit(&mut self, input: &str, source: Source) {
        self.state.update(Event::InputChanged(input.to_string()));
        self.state.update(Event::SourceChanged(source));
        self.dispatch(Event::Submit).await;
    }

    /// Pick a search result by its 1-based position in the current list.
    pub async fn select(&mut self, index: usize) {
        let target = self
            .state
            .search_results
            .as_deref()
            .and_then(|items| index.checked_sub(1).and_then(|i| items.get(i)))
            .map(|item| item.target().map(str::to_string));

        match target {
            Some(Some(link)) => self.select_link(&link).await,
            Some(None) => {
                warn!(index, "search result has no link");
                self.state
                    .update(Event::Failed(format!("result {index} has no link")));
            }
            None => {
                let len = self.state.search_results.as_ref().map_or(0, Vec::len);
                warn!(index, len, "selection out of range");
                self.state.update(Event::Failed(format!(
                    "no result at position {index} (choose 1-{len})"
                )));
            }
        }
    }

    pub async fn select_link(&mut self, link: &str) {
        self.dispatch(Event::Select(link.to_string())).await;
    }

    /// Text to put on the clipboard, if there is a generated result.
    pub fn copy(&mut self) -> Option<String> {
        match self.state.update(Event::Copy) {
            Some(Effect::CopyToClipboard(text)) => Some(text),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.state.update(Event::Clear);
    }

    async fn dispatch(&mut self, event: Event) {
        let Some(Effect::Request(params)) = self.state.update(event) else {
            return;
        };
        info!(?params, "api request");
        let outcome = match self.backend.call(&params).await {
            Ok(json) => {
                let classified = classify_response(&json);
                match &classified {
                    Classified::Search { site, items } => {
                        info!(site = %site, results = items.len(), "search results")
                    }
                    Classified::Record(record) => {
                        info!(site = %record.site, id = %record.id, "record generated")
                    }
                    Classified::Failure { message } => warn!(%message, "backend reported failure"),
                }
                Event::Resolved(classified)
            }
            Err(e) => {
                warn!(error = %e, "api request failed");
                Event::Failed(e.to_string())
            }
        };
        self.state.update(outcome);
    }
}
