//! Error types for RepliDocs.
//!
//! Library crates use [`RepliDocsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all RepliDocs operations.
#[derive(Debug, thiserror::Error)]
pub enum RepliDocsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The upstream search service failed or returned garbage.
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    /// A single chat completion failed (transport, HTTP status, or body).
    #[error("model error: {0}")]
    Model(String),

    /// The model-service API key is not present in the environment.
    #[error("API key not found. Set the {var} environment variable.")]
    MissingCredential { var: String },

    /// The selector answered with an empty completion.
    #[error("model did not select any link")]
    NoSelection,

    /// The selector answered with a URL that is not one of the candidates.
    #[error("selected link is not among the search results: {url}")]
    SelectionNotInCandidateSet { url: String },

    /// Source selection kept failing until the retry budget ran out.
    #[error("failed to get source after {attempts} attempts: {source}")]
    SelectionFailed {
        attempts: u32,
        #[source]
        source: Box<RepliDocsError>,
    },

    /// The reader proxy returned a non-success status or the transport failed.
    #[error("an error occurred while fetching the URL: {0}")]
    FetchFailed(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RepliDocsError>;

impl RepliDocsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether re-running the same operation could plausibly succeed.
    ///
    /// A missing credential or a broken config will not fix itself between
    /// attempts, so the retry loop gives up on those immediately.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. } | Self::MissingCredential { .. } | Self::Io { .. }
        )
    }
}
