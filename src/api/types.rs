use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

pub const NO_RESULTS: &str = "no relevant results found";
pub const REQUEST_FAILED: &str = "request failed";

/// JSON body of a `POST /api` request.
///
/// Only the four shapes the backend accepts can be built: `{url}`, `{query}`,
/// `{source, query}` and `{source, sid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl ApiParams {
    pub fn url(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    pub fn query(query: &str) -> Self {
        Self {
            query: Some(query.to_string()),
            ..Default::default()
        }
    }

    pub fn sourced_query(source: &str, query: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            query: Some(query.to_string()),
            ..Default::default()
        }
    }

    pub fn sid(source: &str, sid: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            sid: Some(sid.to_string()),
            ..Default::default()
        }
    }
}

/// One entry of a `search-*` response.
///
/// Scalars may arrive as strings or numbers; empty strings and zero count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    #[serde(default, deserialize_with = "truthy", skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

impl SearchResultItem {
    /// Link to resolve when this item is picked: `link`, else `url`.
    pub fn target(&self) -> Option<&str> {
        self.link.as_deref().or(self.url.as_deref())
    }
}

/// A generated description the user can copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormattedRecord {
    pub format: String,
    pub site: String,
    pub id: String,
}

/// A backend response sorted into what the front end should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Classified {
    Search {
        site: String,
        items: Vec<SearchResultItem>,
    },
    Record(FormattedRecord),
    Failure {
        message: String,
    },
}

/// Classify a decoded `/api` response body.
///
/// An explicit `success: false` always wins. A `search-*` site with no usable
/// items is a failure rather than an empty list.
pub fn classify_response(json: &Value) -> Classified {
    if json.get("success").and_then(Value::as_bool) == Some(false) {
        let message = ["message", "error"]
            .iter()
            .find_map(|key| json.get(key).and_then(scalar_text))
            .unwrap_or_else(|| REQUEST_FAILED.to_string());
        return Classified::Failure { message };
    }

    if let Some(site) = json.get("site").and_then(Value::as_str)
        && site.starts_with("search-")
    {
        let items = search_items(json.get("data"));
        if items.is_empty() {
            return Classified::Failure {
                message: NO_RESULTS.to_string(),
            };
        }
        return Classified::Search {
            site: site.to_string(),
            items,
        };
    }

    let field = |key: &str| json.get(key).and_then(scalar_text).unwrap_or_default();
    Classified::Record(FormattedRecord {
        format: field("format"),
        site: field("site"),
        id: ["sid", "id"]
            .iter()
            .find_map(|key| json.get(key).and_then(scalar_text))
            .unwrap_or_default(),
    })
}

fn search_items(data: Option<&Value>) -> Vec<SearchResultItem> {
    let Some(Value::Array(entries)) = data else {
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            SearchResultItem::deserialize(entry)
                .inspect_err(|e| warn!(index, error = %e, "skipping malformed search result"))
                .ok()
        })
        .collect()
}

/// Text of a JSON scalar, or `None` for null, empty string, zero and non-scalars.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    truthy(deserializer).map(Option::unwrap_or_default)
}
