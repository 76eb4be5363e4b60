//! Front-end state and the reducer that owns every transition.

use crate::api::types::{ApiParams, Classified, FormattedRecord, SearchResultItem};
use crate::query::{self, Source};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub input: String,
    pub source: Source,
    /// Text offered for copying; mirrors `record.format`.
    pub result: String,
    pub record: Option<FormattedRecord>,
    pub search_results: Option<Vec<SearchResultItem>>,
    pub last_search_site: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub copied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    InputChanged(String),
    SourceChanged(Source),
    Submit,
    Select(String),
    Resolved(Classified),
    Failed(String),
    Copy,
    Clear,
}

/// Work the reducer asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Request(ApiParams),
    CopyToClipboard(String),
}

impl AppState {
    pub fn update(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::InputChanged(input) => {
                self.input = input;
                None
            }
            Event::SourceChanged(source) => {
                self.source = source;
                None
            }
            Event::Submit => {
                if self.loading || self.input.is_empty() {
                    return None;
                }
                self.loading = true;
                self.error = None;
                self.clear_results();
                Some(Effect::Request(query::normalize_input(&self.input, self.source)))
            }
            Event::Select(link) => {
                if self.loading {
                    return None;
                }
                self.loading = true;
                self.error = None;
                self.search_results = None;
                self.last_search_site = None;
                self.result.clear();
                Some(Effect::Request(query::resolve_selected_link(&link)))
            }
            Event::Resolved(Classified::Search { site, items }) => {
                self.loading = false;
                self.result.clear();
                self.record = None;
                self.search_results = Some(items);
                self.last_search_site = Some(site);
                None
            }
            Event::Resolved(Classified::Record(record)) => {
                self.loading = false;
                self.result = record.format.clone();
                self.record = Some(record);
                self.search_results = None;
                self.last_search_site = None;
                None
            }
            Event::Resolved(Classified::Failure { message }) | Event::Failed(message) => {
                self.loading = false;
                self.error = Some(message);
                self.clear_results();
                None
            }
            Event::Copy => {
                if self.result.is_empty() {
                    return None;
                }
                self.copied = true;
                Some(Effect::CopyToClipboard(self.result.clone()))
            }
            Event::Clear => {
                *self = Self::default();
                None
            }
        }
    }

    fn clear_results(&mut self) {
        self.result.clear();
        self.record = None;
        self.search_results = None;
        self.last_search_site = None;
        self.copied = false;
    }
}
