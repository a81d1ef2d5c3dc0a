//! Retrieval of remote documents.
//!
//! Detection code never talks to the network directly. It goes through the
//! [`Fetcher`] trait, which has a blocking HTTP implementation
//! ([`HttpFetcher`]) and an in-memory one ([`StaticFetcher`]) for tests,
//! benches and offline use. [`Resource`] wraps a single URL and turns fetch
//! failures into `ok() == false`.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::DataKittenError;

/// Default timeout applied to every HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("datakitten/", env!("CARGO_PKG_VERSION"));

const GITHUB_API_HOST: &str = "api.github.com";

/// Something that can retrieve the document behind a URL.
pub trait Fetcher: Send + Sync {
    /// Fetch `url`. Transport failures are errors; HTTP error statuses are
    /// reported through [`FetchResponse::status`].
    fn fetch(&self, url: &str) -> Result<FetchResponse, DataKittenError>;
}

impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    fn fetch(&self, url: &str) -> Result<FetchResponse, DataKittenError> {
        (**self).fetch(url)
    }
}

/// A fetched document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

impl FetchResponse {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: None,
            body: Some(body.into()),
        }
    }

    /// A bodiless response with the given status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: None,
        }
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// True for a 2xx status carrying a body.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.body.is_some()
    }

    /// The body of a successful response; otherwise a status error.
    pub fn into_body(self, url: &str) -> Result<String, DataKittenError> {
        match self.body {
            Some(body) if (200..300).contains(&self.status) => Ok(body),
            _ => Err(DataKittenError::Status {
                url: url.to_string(),
                status: self.status,
            }),
        }
    }
}

/// Options for [`HttpFetcher`].
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Global per-request timeout.
    pub timeout: Duration,
    /// Value of the User-Agent header.
    pub user_agent: String,
    /// Bearer token sent to the GitHub API only.
    pub github_token: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            github_token: None,
        }
    }
}

/// Blocking HTTP fetcher backed by a ureq agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
    options: FetchOptions,
}

impl HttpFetcher {
    pub fn new(options: FetchOptions) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(options.timeout))
            .http_status_as_error(false)
            .build();
        let agent: ureq::Agent = config.into();
        Self { agent, options }
    }

    fn wants_github_token(url: &str) -> bool {
        url::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|host| host == GITHUB_API_HOST))
            .unwrap_or(false)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchOptions::default())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, DataKittenError> {
        trace!(url, "fetching");
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", &self.options.user_agent);
        if let Some(token) = self.options.github_token.as_deref() {
            if Self::wants_github_token(url) {
                request = request.header("Authorization", &format!("Bearer {token}"));
            }
        }

        let mut response = request.call().map_err(|source| DataKittenError::Http {
            url: url.to_string(),
            message: source.to_string(),
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| DataKittenError::Http {
                url: url.to_string(),
                message: source.to_string(),
            })?;

        Ok(FetchResponse {
            status,
            content_type,
            body: Some(body),
        })
    }
}

/// In-memory fetcher serving canned responses.
///
/// Unknown URLs answer with a bodiless 404. Every call is counted so tests
/// can assert that lazy values are fetched only once.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, FetchResponse>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with status 200 for `url`.
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), FetchResponse::ok(body));
        self
    }

    /// Serves an arbitrary response for `url`.
    pub fn with_response(mut self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.responses.insert(url.into(), response);
        self
    }

    /// Number of times `url` has been fetched.
    pub fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total number of fetches across all URLs.
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.values().sum::<usize>())
            .unwrap_or(0)
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, DataKittenError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(url.to_string()).or_insert(0) += 1;
        }
        Ok(self
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchResponse::status(404)))
    }
}

/// A URL paired with the fetcher used to retrieve it.
///
/// The document is fetched on first use and the outcome (including
/// failure) is kept for the lifetime of the resource.
pub struct Resource {
    url: String,
    fetcher: Arc<dyn Fetcher>,
    response: OnceCell<Option<FetchResponse>>,
}

impl Resource {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
            response: OnceCell::new(),
        }
    }

    /// The wrapped URL, verbatim.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The wrapped URL, parsed.
    pub fn parsed_url(&self) -> Option<url::Url> {
        url::Url::parse(&self.url).ok()
    }

    /// The fetcher behind this resource.
    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    fn response(&self) -> Option<&FetchResponse> {
        self.response
            .get_or_init(|| match self.fetcher.fetch(&self.url) {
                Ok(response) if response.is_success() => Some(response),
                Ok(response) => {
                    debug!(url = %self.url, status = response.status, "resource not available");
                    None
                }
                Err(error) => {
                    debug!(url = %self.url, %error, "resource fetch failed");
                    None
                }
            })
            .as_ref()
    }

    /// Whether the URL could be fetched successfully.
    pub fn ok(&self) -> bool {
        self.response().is_some()
    }

    /// The raw body, when the fetch succeeded.
    pub fn body(&self) -> Option<&str> {
        self.response().and_then(|response| response.body.as_deref())
    }

    /// The content type reported by the server, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.response()
            .and_then(|response| response.content_type.as_deref())
    }

    /// The body parsed as JSON, when it is valid JSON.
    pub fn as_json(&self) -> Option<Value> {
        self.body()
            .and_then(|body| serde_json::from_str::<Value>(body).ok())
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url)
            .field("fetched", &self.response.get().is_some())
            .finish()
    }
}

/// Fetches `url` and parses it as JSON, absorbing every failure.
pub(crate) fn fetch_json(fetcher: &dyn Fetcher, url: &str) -> Option<Value> {
    let body = match fetcher.fetch(url).and_then(|response| response.into_body(url)) {
        Ok(body) => body,
        Err(error) => {
            debug!(url, %error, "json document not available");
            return None;
        }
    };
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(url, %error, "json document is malformed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_fetcher_serves_known_urls() {
        let fetcher = StaticFetcher::new().with_body("https://example.org/a", "{}");
        let response = fetcher.fetch("https://example.org/a").expect("fetch");
        assert!(response.is_success());
        assert_eq!(response.body.as_deref(), Some("{}"));
        assert_eq!(fetcher.calls("https://example.org/a"), 1);
    }

    #[test]
    fn static_fetcher_answers_404_for_unknown_urls() {
        let fetcher = StaticFetcher::new();
        let response = fetcher.fetch("https://example.org/missing").expect("fetch");
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[test]
    fn resource_fetches_once() {
        let fetcher = Arc::new(
            StaticFetcher::new().with_body("https://example.org/data.json", r#"{"a": 1}"#),
        );
        let resource = Resource::new("https://example.org/data.json", fetcher.clone());

        assert!(resource.ok());
        assert_eq!(resource.as_json(), Some(serde_json::json!({"a": 1})));
        assert_eq!(resource.body(), Some(r#"{"a": 1}"#));
        assert_eq!(fetcher.calls("https://example.org/data.json"), 1);
    }

    #[test]
    fn resource_absorbs_failures() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_response("https://example.org/gone", FetchResponse::status(500)),
        );
        let resource = Resource::new("https://example.org/gone", fetcher.clone());

        assert!(!resource.ok());
        assert_eq!(resource.body(), None);
        assert_eq!(resource.as_json(), None);
        assert!(!resource.ok());
        assert_eq!(fetcher.calls("https://example.org/gone"), 1);
    }

    #[test]
    fn resource_with_non_json_body_has_no_json() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(
            StaticFetcher::new().with_response(
                "https://example.org/page",
                FetchResponse::ok("<html></html>").with_content_type("text/html"),
            ),
        );
        let resource = Resource::new("https://example.org/page", fetcher);

        assert!(resource.ok());
        assert_eq!(resource.content_type(), Some("text/html"));
        assert_eq!(resource.as_json(), None);
    }

    #[test]
    fn into_body_reports_status() {
        assert_eq!(
            FetchResponse::ok("x").into_body("u").expect("body"),
            "x".to_string()
        );
        match FetchResponse::status(404).into_body("https://example.org/") {
            Err(DataKittenError::Status { url, status }) => {
                assert_eq!(url, "https://example.org/");
                assert_eq!(status, 404);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn fetch_json_absorbs_malformed_documents() {
        let fetcher = StaticFetcher::new()
            .with_body("https://example.org/good", r#"{"ok": true}"#)
            .with_body("https://example.org/bad", "{nope");
        assert_eq!(
            fetch_json(&fetcher, "https://example.org/good"),
            Some(serde_json::json!({"ok": true}))
        );
        assert_eq!(fetch_json(&fetcher, "https://example.org/bad"), None);
        assert_eq!(fetch_json(&fetcher, "https://example.org/missing"), None);
    }

    #[test]
    fn github_token_only_targets_the_api_host() {
        assert!(HttpFetcher::wants_github_token(
            "https://api.github.com/repos/a/b"
        ));
        assert!(!HttpFetcher::wants_github_token(
            "https://raw.githubusercontent.com/a/b/HEAD/datapackage.json"
        ));
        assert!(!HttpFetcher::wants_github_token("not a url"));
    }
}
