//! Query resolution: turns user input and picked links into backend request parameters.

mod lang;
mod link;

use link::{LinkKind, imdb_id, tmdb_sid};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::types::ApiParams;

/// Where a keyword search should run.
#[derive(Debug, Deserialize, Serialize, ValueEnum, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Auto,
    Douban,
    Tmdb,
    Imdb,
}

impl Source {
    pub const ALL: [Source; 4] = [Source::Auto, Source::Douban, Source::Tmdb, Source::Imdb];

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Auto => "auto",
            Source::Douban => "douban",
            Source::Tmdb => "tmdb",
            Source::Imdb => "imdb",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Source::Auto => "Smart select",
            Source::Douban => "Douban",
            Source::Tmdb => "TMDB",
            Source::Imdb => "IMDb",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Source::Auto => "Chinese prefers TMDB, English prefers IMDb, with fallback",
            Source::Douban => "Douban movies and TV (recommended for Chinese queries)",
            Source::Tmdb => "The Movie Database (backend needs an API key)",
            Source::Imdb => "Internet Movie Database (recommended for English queries)",
        }
    }
}

/// Build request parameters for a form submission.
///
/// Anything starting with `http` is sent as a direct URL regardless of `source`.
/// In `auto` mode the backend chooses the search route, so no `source` key is sent.
/// Callers must reject empty input before getting here.
pub fn normalize_input(raw_input: &str, source: Source) -> ApiParams {
    if raw_input.starts_with("http") {
        return ApiParams::url(raw_input);
    }
    match source {
        Source::Auto => {
            debug!(
                route = ?lang::expected_auto_route(raw_input),
                "auto source; backend selects route"
            );
            ApiParams::query(raw_input)
        }
        other => ApiParams::sourced_query(other.as_str(), raw_input),
    }
}

/// Build request parameters for a search result the user picked.
///
/// IMDb and TMDB links are reduced to a source id when one can be extracted;
/// everything else is passed through as a URL.
pub fn resolve_selected_link(link: &str) -> ApiParams {
    let resolved = match LinkKind::of(link) {
        LinkKind::Imdb => imdb_id(link).map(|sid| ApiParams::sid("imdb", sid)),
        LinkKind::Tmdb => tmdb_sid(link).map(|sid| ApiParams::sid("tmdb", &sid)),
        LinkKind::Generic => None,
    };
    resolved.unwrap_or_else(|| {
        debug!(link, "no source id in link, sending as url");
        ApiParams::url(link)
    })
}
