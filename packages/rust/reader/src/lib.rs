//! Full-page text retrieval through a reader proxy.
//!
//! The proxy (r.jina.ai by default) renders a page and returns it as plain
//! text/markdown. The target URL is appended to the proxy's base endpoint
//! verbatim, e.g. `https://r.jina.ai/https://docs.python.org/3/`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use replidocs_shared::{ReaderConfig, RepliDocsError, Result};

/// User-Agent string for reader requests.
const USER_AGENT: &str = concat!("RepliDocs/", env!("CARGO_PKG_VERSION"));

/// Retrieves the textual content of a URL.
///
/// Implementations do not retry; any failure is a [`RepliDocsError::FetchFailed`].
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`ContentFetcher`] backed by a reader proxy service.
pub struct ReaderProxy {
    client: Client,
    base_url: String,
}

impl ReaderProxy {
    /// Build a fetcher from the `[reader]` config section.
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepliDocsError::FetchFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// The proxy URL requested for `target`.
    pub fn proxied_url(&self, target: &str) -> String {
        format!("{}{target}", self.base_url)
    }
}

#[async_trait]
impl ContentFetcher for ReaderProxy {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let full_url = self.proxied_url(url);
        debug!(%full_url, "fetching through reader proxy");

        let response = self
            .client
            .get(&full_url)
            .send()
            .await
            .map_err(|e| RepliDocsError::FetchFailed(format!("{full_url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepliDocsError::FetchFailed(format!("{full_url}: HTTP {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RepliDocsError::FetchFailed(format!("{full_url}: body read failed: {e}")))?;

        info!(chars = text.chars().count(), "page fetched");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn proxy_for(server: &MockServer) -> ReaderProxy {
        ReaderProxy::new(&ReaderConfig {
            base_url: format!("{}/", server.uri()),
            ..ReaderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn proxied_url_appends_target_verbatim() {
        let proxy = ReaderProxy::new(&ReaderConfig::default()).unwrap();
        assert_eq!(
            proxy.proxied_url("https://docs.python.org/3/library/functions.html#open"),
            "https://r.jina.ai/https://docs.python.org/3/library/functions.html#open"
        );
    }

    #[tokio::test]
    async fn test_fetch_with_mock_server() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/https://docs.rs/serde/latest/serde/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Title: serde\n\n# Crate serde"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = proxy_for(&server)
            .fetch("https://docs.rs/serde/latest/serde/")
            .await
            .unwrap();
        assert_eq!(text, "Title: serde\n\n# Crate serde");
    }

    #[tokio::test]
    async fn test_fetch_http_error_is_fetch_failed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(451))
            .mount(&server)
            .await;

        let err = proxy_for(&server)
            .fetch("https://example.com/blocked")
            .await
            .unwrap_err();
        assert!(matches!(err, RepliDocsError::FetchFailed(_)));
        assert!(err.to_string().contains("451"));
    }

    #[tokio::test]
    async fn test_fetch_transport_error_is_fetch_failed() {
        let proxy = ReaderProxy::new(&ReaderConfig {
            base_url: "http://127.0.0.1:9/".into(),
            timeout_secs: 2,
        })
        .unwrap();

        let err = proxy.fetch("https://example.com/").await.unwrap_err();
        assert!(matches!(err, RepliDocsError::FetchFailed(_)));
        assert!(err.to_string().starts_with("an error occurred while fetching the URL"));
    }
}
