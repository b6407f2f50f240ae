//! Language-model steps of the curation pipeline.
//!
//! - [`client`]: the [`ChatClient`] seam and its Groq/OpenAI-compatible implementation
//! - [`select`]: [`RelevanceSelector`], picks one link out of the search results
//! - [`verify`]: [`LanguageVerifier`], exact-marker language check on an excerpt
//! - `testing` (feature `test-utils`): scripted client for tests in this and downstream crates

pub mod client;
pub mod select;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod verify;

pub use client::{ChatClient, CompletionRequest, GroqClient};
pub use select::RelevanceSelector;
pub use verify::{LanguageVerifier, MISMATCH_MARKER, TRUE_MARKER, parse_verdict};

use replidocs_shared::LlmConfig;

/// System role shared by every completion.
pub const SYSTEM_PROMPT: &str = "You are a smart AI assistant giving concise answers.";

/// Output budget and temperature for one completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl From<&LlmConfig> for Sampling {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_from_default_config() {
        let sampling = Sampling::from(&LlmConfig::default());
        assert_eq!(sampling.max_tokens, 100);
        assert!((sampling.temperature - 0.14).abs() < f32::EPSILON);
    }
}
