pub mod types;

use std::env;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use types::ApiParams;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787/api";

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: status {0}")]
    Status(u16),

    #[error("response format error: server did not return JSON")]
    NotJson,

    #[error("response format error: could not parse JSON ({0})")]
    InvalidJson(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// The seam between the session and the network.
/// Implemented by `ApiClient` for production; mock implementations used in tests.
pub trait Backend {
    async fn call(&self, params: &ApiParams) -> Result<Value, ApiError>;
}

/// Client for the PT-Gen `/api` endpoint.
///
/// Requests are never retried; every failure is handed back to the caller.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    endpoint: Url,
}

impl ApiClient {
    pub fn http_client() -> Result<Client, reqwest::Error> {
        Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
    }

    /// Endpoint from `PTGEN_ENDPOINT`, falling back to [`DEFAULT_ENDPOINT`].
    pub fn from_env(http: Client) -> Result<Self, ApiError> {
        let endpoint = env::var("PTGEN_ENDPOINT")
            .ok()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(http, &endpoint)
    }

    pub fn with_endpoint(http: Client, endpoint: &str) -> Result<Self, ApiError> {
        let endpoint = Url::parse(endpoint)?;
        debug!(%endpoint, "api endpoint configured");
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Backend for ApiClient {
    async fn call(&self, params: &ApiParams) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("X-Internal-Request", "true")
            .header("User-Agent", crate::USER_AGENT)
            .json(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "api returned error status");
            return Err(ApiError::Status(status.as_u16()));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if !is_json {
            warn!("api response is not JSON");
            return Err(ApiError::NotJson);
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).inspect_err(|e| {
            let snippet = &text[..text.floor_char_boundary(200)];
            warn!(error = %e, body = snippet, "api returned malformed JSON");
        })?;
        debug!(bytes = text.len(), "api call complete");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_endpoint_rejected() {
        let err = ApiClient::with_endpoint(Client::new(), "not a url").err().unwrap();
        assert!(matches!(err, ApiError::InvalidEndpoint(_)));
        assert!(err.to_string().contains("invalid endpoint"));
    }

    #[test]
    fn error_messages_are_distinct() {
        assert_eq!(ApiError::Status(502).to_string(), "HTTP error: status 502");
        assert!(ApiError::NotJson.to_string().contains("did not return JSON"));
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::with_endpoint(Client::new(), &format!("{}/api", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn posts_json_params_with_internal_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(header("X-Internal-Request", "true"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"source": "douban", "query": "三体"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "site": "search-douban",
                "data": [{"title": "三体", "link": "https://movie.douban.com/subject/1/"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server)
            .call(&ApiParams::sourced_query("douban", "三体"))
            .await
            .unwrap();
        assert_eq!(body["site"], "search-douban");
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"success": false})))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).call(&ApiParams::query("x")).await;
        assert!(matches!(result, Err(ApiError::Status(500))));
    }

    #[tokio::test]
    async fn non_json_content_type_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client(&server).call(&ApiParams::query("x")).await;
        assert!(matches!(result, Err(ApiError::NotJson)));
    }

    #[tokio::test]
    async fn malformed_json_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{\"site\":", "application/json"))
            .mount(&server)
            .await;

        let result = client(&server).call(&ApiParams::query("x")).await;
        match result {
            Err(e @ ApiError::InvalidJson(_)) => {
                assert!(e.to_string().contains("could not parse JSON"), "got: {e}");
            }
            other => panic!("expected InvalidJson, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn json_with_charset_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"format":"[img]x[/img]","site":"douban","sid":"1"}"#,
                "application/json; charset=utf-8",
            ))
            .mount(&server)
            .await;

        let body = client(&server).call(&ApiParams::url("https://movie.douban.com/subject/1/")).await.unwrap();
        assert_eq!(body["sid"], "1");
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let client = ApiClient::with_endpoint(Client::new(), "http://127.0.0.1:1/api").unwrap();
        let result = client.call(&ApiParams::query("x")).await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
