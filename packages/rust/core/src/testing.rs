//! In-memory collaborators for exercising [`CurationPipeline`](crate::CurationPipeline)
//! without the network.

use std::sync::Mutex;

use async_trait::async_trait;

use replidocs_reader::ContentFetcher;
use replidocs_search::SearchProvider;
use replidocs_shared::{RepliDocsError, Result, SearchCandidate};

pub use replidocs_llm::testing::ScriptedClient;

/// Search double returning a fixed candidate list, or failing.
pub struct MockSearch {
    results: std::result::Result<Vec<SearchCandidate>, String>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockSearch {
    pub fn returning(results: Vec<SearchCandidate>) -> Self {
        Self {
            results: Ok(results),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            results: Err(reason.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// `(query, max_results)` pairs seen so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchCandidate>> {
        self.queries
            .lock()
            .expect("queries lock")
            .push((query.to_string(), max_results));
        match &self.results {
            Ok(results) => Ok(results.iter().take(max_results).cloned().collect()),
            Err(reason) => Err(RepliDocsError::SearchUnavailable(reason.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Fetcher double returning a fixed page, or failing.
pub struct MockFetcher {
    page: std::result::Result<String, String>,
    urls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn returning(page: impl Into<String>) -> Self {
        Self {
            page: Ok(page.into()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            page: Err(reason.to_string()),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("urls lock").clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.urls.lock().expect("urls lock").push(url.to_string());
        self.page.clone().map_err(RepliDocsError::FetchFailed)
    }
}

/// `n` candidates with links `https://docs.example.com/page-<i>` (1-based).
pub fn candidates(n: usize) -> Vec<SearchCandidate> {
    (1..=n)
        .map(|i| SearchCandidate {
            title: format!("Result {i}"),
            link: format!("https://docs.example.com/page-{i}"),
            body: format!("Excerpt number {i}"),
        })
        .collect()
}
