//! Core domain types for a single documentation lookup.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// One documentation question asked for a target programming language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Normalized (lowercase, trimmed) language name.
    pub language: String,
    /// Free-text question as typed by the user.
    pub question: String,
}

impl Query {
    pub fn new(language: &str, question: impl Into<String>) -> Self {
        Self {
            language: normalize_language(language),
            question: question.into(),
        }
    }

    /// Text sent to the search provider: language first, then the question.
    pub fn search_text(&self) -> String {
        format!("{}, {}", self.language, self.question)
    }
}

/// Lowercase and trim a language name as typed by the user.
pub fn normalize_language(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// SearchCandidate
// ---------------------------------------------------------------------------

/// A single web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Display title.
    pub title: String,
    /// Target URL.
    pub link: String,
    /// Short excerpt shown under the result.
    pub body: String,
}

/// Find the candidate whose link equals `link` verbatim.
pub fn candidate_by_link<'a>(
    candidates: &'a [SearchCandidate],
    link: &str,
) -> Option<&'a SearchCandidate> {
    candidates.iter().find(|c| c.link == link)
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

/// What the relevance selector picked out of the candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionVerdict {
    SelectedLink(String),
    NoSelection,
}

/// Whether an excerpt matches the target programming language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationVerdict {
    Relevant,
    LanguageMismatch,
}
