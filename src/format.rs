use crate::api::types::SearchResultItem;
use crate::query::Source;

/// Display name of a `search-*` site tag.
pub fn search_site_label(site: &str) -> &'static str {
    match site {
        "search-douban" => "Douban",
        "search-tmdb" => "TMDB",
        "search-imdb" => "IMDb",
        _ => "Unknown source",
    }
}

/// Display name of a media subtype; unknown values pass through.
pub fn subtype_label(subtype: &str) -> &str {
    match subtype {
        "movie" => "Movie",
        "tv" | "tvSeries" => "TV Series",
        "tvMovie" => "TV Movie",
        "video" => "Video",
        "tvSpecial" => "TV Special",
        "short" => "Short",
        other => other,
    }
}

/// Replace line breaks so backend text cannot break the list layout.
fn one_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

pub fn format_search_results(site: &str, items: &[SearchResultItem]) -> String {
    let mut out = format!("Results from {} ({})\n\n", search_site_label(site), items.len());

    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("{:>2}. {}", i + 1, one_line(&item.title)));
        if let Some(ref year) = item.year {
            out.push_str(&format!(" ({year})"));
        }
        if let Some(ref episode) = item.episode {
            out.push_str(&format!("  [{episode} eps]"));
        }
        if let Some(ref rating) = item.rating {
            out.push_str(&format!("  [{rating} / 10]"));
        }
        out.push('\n');

        let details: Vec<String> = [
            item.subtitle.as_deref().map(one_line),
            item.subtype.as_deref().map(|s| subtype_label(s).to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !details.is_empty() {
            out.push_str(&format!("    {}\n", details.join(" · ")));
        }
        if let Some(link) = item.target() {
            out.push_str(&format!("    {link}\n"));
        }
    }

    out
}

pub fn format_sources() -> String {
    Source::ALL
        .iter()
        .map(|s| format!("{:<7} {:<13} {}\n", s.as_str(), s.label(), s.description()))
        .collect()
}
