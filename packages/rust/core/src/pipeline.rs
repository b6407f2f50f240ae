//! End-to-end lookup: question → search → select → verify → fetch → crop → artifact.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use replidocs_artifacts::{DocumentArtifact, WriteSummary};
use replidocs_llm::{ChatClient, GroqClient, LanguageVerifier, RelevanceSelector, Sampling};
use replidocs_reader::{ContentFetcher, ReaderProxy};
use replidocs_search::{DuckDuckGoProvider, SearchProvider};
use replidocs_shared::{
    AppConfig, Query, RepliDocsError, Result, SearchCandidate, SelectionVerdict,
    VerificationVerdict, candidate_by_link,
};

use crate::retry::{RetryError, retry};

/// Tunables for [`CurationPipeline`].
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Candidates requested from the search provider.
    pub max_results: usize,
    /// Total attempts for the select+verify step.
    pub max_attempts: u32,
    pub sampling: Sampling,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_results: config.search.max_results,
            max_attempts: config.pipeline.max_attempts(),
            sampling: Sampling::from(&config.llm),
        }
    }
}

/// Result of one lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The artifact now holds the tail of `source`.
    Saved { source: String, summary: WriteSummary },
    /// The selected page is not about the session language; artifact untouched.
    LanguageMismatch { source: String },
    /// The search returned nothing to choose from; artifact untouched.
    NoCandidates,
}

/// Progress callback for reporting lookup status.
pub trait QueryProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a select+verify attempt failed and another one follows.
    fn retrying(&self, failed_attempt: u32, max_attempts: u32, error: &RepliDocsError);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl QueryProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn retrying(&self, _failed_attempt: u32, _max_attempts: u32, _error: &RepliDocsError) {}
}

/// Runs documentation lookups and maintains the artifact.
pub struct CurationPipeline {
    search: Arc<dyn SearchProvider>,
    selector: RelevanceSelector,
    verifier: LanguageVerifier,
    fetcher: Arc<dyn ContentFetcher>,
    artifact: DocumentArtifact,
    settings: PipelineSettings,
}

impl CurationPipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        chat: Arc<dyn ChatClient>,
        fetcher: Arc<dyn ContentFetcher>,
        artifact: DocumentArtifact,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            search,
            selector: RelevanceSelector::new(chat.clone(), settings.sampling),
            verifier: LanguageVerifier::new(chat, settings.sampling),
            fetcher,
            artifact,
            settings,
        }
    }

    /// Wire up the real DuckDuckGo, Groq and reader-proxy collaborators.
    pub fn from_config(config: &AppConfig, artifact: DocumentArtifact) -> Result<Self> {
        let search = Arc::new(DuckDuckGoProvider::new(&config.search)?);
        let chat = Arc::new(GroqClient::new(&config.llm)?);
        let fetcher = Arc::new(ReaderProxy::new(&config.reader)?);
        debug!(
            provider = search.name(),
            model = chat.model(),
            reader = %config.reader.base_url,
            "pipeline collaborators ready"
        );

        Ok(Self::new(
            search,
            chat,
            fetcher,
            artifact,
            PipelineSettings::from(config),
        ))
    }

    pub fn artifact(&self) -> &DocumentArtifact {
        &self.artifact
    }

    /// Run one lookup.
    ///
    /// The artifact is only written on [`QueryOutcome::Saved`]; every other
    /// outcome and every error leaves it exactly as it was.
    #[instrument(skip_all, fields(language = %query.language, question = %query.question))]
    pub async fn run_query(
        &self,
        query: &Query,
        progress: &dyn QueryProgress,
    ) -> Result<QueryOutcome> {
        // --- Phase 1: Search ---
        progress.phase("Searching the web");
        let candidates = self
            .search
            .search(&query.search_text(), self.settings.max_results)
            .await?;
        debug!(
            provider = self.search.name(),
            candidates = candidates.len(),
            "search finished"
        );

        if candidates.is_empty() {
            warn!("search returned no candidates");
            return Ok(QueryOutcome::NoCandidates);
        }

        // --- Phase 2: Select + verify, retried as one step ---
        progress.phase("Selecting the most relevant source");
        let max_attempts = self.settings.max_attempts;
        let candidates = candidates.as_slice();

        let (source, verdict) = retry(
            max_attempts,
            RepliDocsError::is_transient,
            |attempt, error| progress.retrying(attempt, max_attempts, error),
            move |_| self.get_source(query, candidates),
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted {
                attempts,
                last_error,
            } => RepliDocsError::SelectionFailed {
                attempts,
                source: Box::new(last_error),
            },
            RetryError::Aborted { error, .. } => error,
        })?;

        if verdict == VerificationVerdict::LanguageMismatch {
            info!(%source, "language mismatch, keeping current artifact");
            return Ok(QueryOutcome::LanguageMismatch { source });
        }

        // --- Phase 3: Fetch ---
        progress.phase("Fetching documentation");
        let page = self.fetcher.fetch(&source).await?;

        // --- Phase 4: Crop + persist ---
        let summary = self.artifact.write_tail(&page)?;
        info!(
            %source,
            original_chars = summary.original_chars,
            written_chars = summary.written_chars,
            "documentation saved"
        );

        Ok(QueryOutcome::Saved { source, summary })
    }

    /// One select+verify attempt.
    async fn get_source(
        &self,
        query: &Query,
        candidates: &[SearchCandidate],
    ) -> Result<(String, VerificationVerdict)> {
        let link = match self.selector.select(query, candidates).await? {
            SelectionVerdict::SelectedLink(link) => link,
            SelectionVerdict::NoSelection => return Err(RepliDocsError::NoSelection),
        };

        let candidate = candidate_by_link(candidates, &link)
            .ok_or_else(|| RepliDocsError::SelectionNotInCandidateSet { url: link.clone() })?;

        let verdict = self.verifier.verify(&query.language, &candidate.body).await?;
        Ok((candidate.link.clone(), verdict))
    }
}
