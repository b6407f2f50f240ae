//! Binary check that a result excerpt belongs to the target language.

use std::sync::Arc;

use tracing::{debug, instrument};

use replidocs_shared::{Result, VerificationVerdict};

use crate::client::{ChatClient, CompletionRequest};
use crate::{SYSTEM_PROMPT, Sampling};

/// The only completion accepted as a positive verdict.
pub const TRUE_MARKER: &str = "True";

/// What the model is told to answer when the language is wrong.
pub const MISMATCH_MARKER: &str = "Language mismatch";

/// Map raw model output to a verdict.
///
/// Only the exact string [`TRUE_MARKER`] counts as relevant. Case variants,
/// surrounding whitespace, or extra words are all a mismatch.
pub fn parse_verdict(raw: &str) -> VerificationVerdict {
    if raw == TRUE_MARKER {
        VerificationVerdict::Relevant
    } else {
        VerificationVerdict::LanguageMismatch
    }
}

/// Asks the model whether an excerpt fits the target language.
pub struct LanguageVerifier {
    client: Arc<dyn ChatClient>,
    sampling: Sampling,
}

impl LanguageVerifier {
    pub fn new(client: Arc<dyn ChatClient>, sampling: Sampling) -> Self {
        Self { client, sampling }
    }

    #[instrument(skip_all, fields(%language))]
    pub async fn verify(&self, language: &str, excerpt: &str) -> Result<VerificationVerdict> {
        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: verification_prompt(language, excerpt),
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
        };

        let answer = self.client.complete(request).await?;
        let verdict = parse_verdict(&answer);
        debug!(%answer, ?verdict, "verification answer");

        Ok(verdict)
    }
}

pub(crate) fn verification_prompt(language: &str, excerpt: &str) -> String {
    format!(
        "if this site content: \n'{excerpt}' \nis appropriate for {language} language \
         write '{TRUE_MARKER}', otherwise write '{MISMATCH_MARKER}'"
    )
}
