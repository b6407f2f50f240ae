//! Core orchestration for RepliDocs.
//!
//! This crate ties together search, link selection, language verification,
//! the reader proxy and the documentation artifact into one lookup
//! ([`CurationPipeline::run_query`]), plus the interactive session model.

pub mod pipeline;
pub mod retry;
pub mod session;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use pipeline::{
    CurationPipeline, PipelineSettings, QueryOutcome, QueryProgress, SilentProgress,
};
pub use retry::{RetryError, retry};
pub use session::{Command, Session};
