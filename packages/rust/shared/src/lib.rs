//! Shared types, error model, and configuration for RepliDocs.
//!
//! This crate is the foundation depended on by all other RepliDocs crates.
//! It provides:
//! - [`RepliDocsError`]: the unified error type
//! - Domain types ([`Query`], [`SearchCandidate`], the verdict enums)
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, LlmConfig, PipelineConfig, ReaderConfig, SearchConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, read_api_key, validate_config,
};
pub use error::{RepliDocsError, Result};
pub use types::{
    Query, SearchCandidate, SelectionVerdict, VerificationVerdict, candidate_by_link,
    normalize_language,
};
