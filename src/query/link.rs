use std::sync::LazyLock;

use regex::Regex;

static IMDB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tt[0-9]{7,}").expect("IMDb id pattern"));
static TMDB_MOVIE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"movie/([0-9]+)").expect("TMDB movie pattern"));
static TMDB_TV_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tv/([0-9]+)").expect("TMDB tv pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Imdb,
    Tmdb,
    Generic,
}

impl LinkKind {
    pub fn of(link: &str) -> Self {
        if link.contains("imdb.com") {
            LinkKind::Imdb
        } else if link.contains("themoviedb.org") {
            LinkKind::Tmdb
        } else {
            LinkKind::Generic
        }
    }
}

/// First `tt` + 7 or more digits in the link, prefix included.
pub fn imdb_id(link: &str) -> Option<&str> {
    IMDB_ID.find(link).map(|m| m.as_str())
}

/// `<media>/<id>` for a TMDB link, where media is `movie` or `tv`.
///
/// The numeric id comes from the first `movie/<digits>` match, else the first
/// `tv/<digits>` match. The media type is decided separately by whether the
/// link contains `/movie/` at all.
pub fn tmdb_sid(link: &str) -> Option<String> {
    let id = TMDB_MOVIE_ID
        .captures(link)
        .or_else(|| TMDB_TV_ID.captures(link))
        .and_then(|c| c.get(1))?
        .as_str();
    let media = if link.contains("/movie/") { "movie" } else { "tv" };
    Some(format!("{media}/{id}"))
}
