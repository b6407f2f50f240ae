//! Model-driven pick of the single most relevant, most current candidate.

use std::sync::Arc;

use tracing::{debug, instrument};

use replidocs_shared::{Query, Result, SearchCandidate, SelectionVerdict};

use crate::client::{ChatClient, CompletionRequest};
use crate::{SYSTEM_PROMPT, Sampling};

/// Asks the model which candidate link best answers the question.
pub struct RelevanceSelector {
    client: Arc<dyn ChatClient>,
    sampling: Sampling,
}

impl RelevanceSelector {
    pub fn new(client: Arc<dyn ChatClient>, sampling: Sampling) -> Self {
        Self { client, sampling }
    }

    /// Issue one completion and return the link the model chose.
    ///
    /// The answer is only trimmed; checking it against the candidate set is
    /// the caller's job. An empty candidate set or empty answer is
    /// [`SelectionVerdict::NoSelection`].
    #[instrument(skip_all, fields(language = %query.language, candidates = candidates.len()))]
    pub async fn select(
        &self,
        query: &Query,
        candidates: &[SearchCandidate],
    ) -> Result<SelectionVerdict> {
        if candidates.is_empty() {
            return Ok(SelectionVerdict::NoSelection);
        }

        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: selection_prompt(query, &flatten_candidates(candidates)),
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
        };

        let answer = self.client.complete(request).await?;
        let link = answer.trim();
        debug!(%link, "model selected link");

        if link.is_empty() {
            Ok(SelectionVerdict::NoSelection)
        } else {
            Ok(SelectionVerdict::SelectedLink(link.to_string()))
        }
    }
}

/// Join every field of every candidate into one space-separated blob.
///
/// Which body belongs to which link is not preserved; the model only needs
/// enough context to pick a URL.
pub(crate) fn flatten_candidates(candidates: &[SearchCandidate]) -> String {
    candidates
        .iter()
        .flat_map(|c| [c.title.as_str(), c.link.as_str(), c.body.as_str()])
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn selection_prompt(query: &Query, flattened: &str) -> String {
    format!(
        "programming language: {} \nuser question: {} \n\nsearch results: {flattened} \n\n\
         task: which resource is pointing to the most recent version of documentation \
         answering the user question? give one most relevant link! write the correct url \
         without any other explanations.",
        query.language, query.question
    )
}
