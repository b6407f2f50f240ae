//! Keyword web search returning a small ordered set of candidates.
//!
//! The pipeline only depends on the [`SearchProvider`] trait; the default
//! implementation scrapes DuckDuckGo's no-JavaScript HTML endpoint, which
//! needs no API key.

mod parser;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

use replidocs_shared::{RepliDocsError, Result, SearchCandidate, SearchConfig};

/// Browser-like User-Agent; the HTML endpoint rejects obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// A keyword search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return at most `max_results` candidates in the
    /// provider's relevance order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchCandidate>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// DuckDuckGo
// ---------------------------------------------------------------------------

/// DuckDuckGo HTML search (no API key required).
pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    /// Build a provider from the `[search]` config section.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                RepliDocsError::SearchUnavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    #[instrument(skip(self), fields(provider = "duckduckgo"))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchCandidate>> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| RepliDocsError::SearchUnavailable(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        // The HTML endpoint answers 202 with a bot-challenge page when it throttles.
        if status == StatusCode::ACCEPTED {
            return Err(RepliDocsError::SearchUnavailable(format!(
                "{}: rate limited (HTTP {status})",
                self.endpoint
            )));
        }
        if !status.is_success() {
            return Err(RepliDocsError::SearchUnavailable(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let html = response.text().await.map_err(|e| {
            RepliDocsError::SearchUnavailable(format!("failed to read search response: {e}"))
        })?;
        debug!(bytes = html.len(), "search page received");

        let candidates = parser::parse_results(&html, max_results);
        info!(results = candidates.len(), "search completed");

        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> DuckDuckGoProvider {
        let config = SearchConfig {
            endpoint: format!("{}/html/", server.uri()),
            ..SearchConfig::default()
        };
        DuckDuckGoProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_search_with_mock_server() {
        let server = MockServer::start().await;
        let page = std::fs::read_to_string("../../../fixtures/html/duckduckgo.html")
            .expect("read duckduckgo fixture");

        Mock::given(method("POST"))
            .and(path("/html/"))
            .and(body_string_contains("q=python"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let results = provider.search("python, how to open a file", 6).await.unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].link, "https://docs.python.org/3/tutorial/inputoutput.html");
        assert_eq!(provider.name(), "duckduckgo");
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let server = MockServer::start().await;
        let page = std::fs::read_to_string("../../../fixtures/html/duckduckgo.html")
            .expect("read duckduckgo fixture");

        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let results = provider_for(&server).search("rust, read a file", 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_http_error_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider_for(&server).search("go, goroutines", 6).await.unwrap_err();
        assert!(matches!(err, RepliDocsError::SearchUnavailable(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_search_rate_limit_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(202).set_body_string(
                r#"<html><body><div class="anomaly-modal__title">Unfortunately, bots use DuckDuckGo too.</div></body></html>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server).search("python, asyncio", 6).await.unwrap_err();
        assert!(matches!(err, RepliDocsError::SearchUnavailable(_)));
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_search_transport_error_is_unavailable() {
        let config = SearchConfig {
            // Nothing listens on port 9 (discard) on a test machine.
            endpoint: "http://127.0.0.1:9/html/".into(),
            timeout_secs: 2,
            ..SearchConfig::default()
        };
        let provider = DuckDuckGoProvider::new(&config).unwrap();
        let err = provider.search("zig, allocators", 6).await.unwrap_err();
        assert!(matches!(err, RepliDocsError::SearchUnavailable(_)));
    }
}
