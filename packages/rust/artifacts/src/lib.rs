//! The single documentation file handed to the AI assistant.
//!
//! The file holds at most `max_chars` characters and always reflects the
//! latest successful fetch. Writes replace the whole file (temp file +
//! rename), so a failed write leaves the previous content intact.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use replidocs_shared::{RepliDocsError, Result};

/// Handle to the on-disk documentation artifact.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    path: PathBuf,
    max_chars: usize,
}

/// What a successful [`DocumentArtifact::write_tail`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Characters in the fetched text.
    pub original_chars: usize,
    /// Characters actually written.
    pub written_chars: usize,
}

impl WriteSummary {
    pub fn truncated(&self) -> bool {
        self.written_chars < self.original_chars
    }
}

impl DocumentArtifact {
    /// Create parent directories and start from an empty file.
    pub fn create(path: impl Into<PathBuf>, max_chars: usize) -> Result<Self> {
        let artifact = Self::open(path, max_chars);

        if let Some(parent) = artifact.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RepliDocsError::io(parent, e))?;
        }
        artifact.clear()?;

        info!(path = %artifact.path.display(), max_chars, "documentation artifact ready");
        Ok(artifact)
    }

    /// Handle to an existing artifact without touching the file.
    pub fn open(path: impl Into<PathBuf>, max_chars: usize) -> Self {
        Self {
            path: path.into(),
            max_chars,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Replace the artifact with the trailing `max_chars` characters of `text`.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn write_tail(&self, text: &str) -> Result<WriteSummary> {
        let tail = crop_tail(text, self.max_chars);
        self.replace(tail)?;

        let summary = WriteSummary {
            original_chars: text.chars().count(),
            written_chars: tail.chars().count(),
        };
        debug!(
            original_chars = summary.original_chars,
            written_chars = summary.written_chars,
            "artifact written"
        );
        Ok(summary)
    }

    /// Reset the artifact to empty. Clearing an empty artifact is a no-op.
    pub fn clear(&self) -> Result<()> {
        self.replace("")
    }

    /// Current artifact content.
    pub fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| RepliDocsError::io(&self.path, e))
    }

    fn replace(&self, content: &str) -> Result<()> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".into());
        let temp = self.path.with_file_name(format!(".{file_name}.tmp"));

        // Write to temp file first
        std::fs::write(&temp, content).map_err(|e| RepliDocsError::io(&temp, e))?;

        // Atomic rename
        std::fs::rename(&temp, &self.path).map_err(|e| RepliDocsError::io(&self.path, e))
    }
}

/// The last `max_chars` characters of `text`, never splitting a character.
pub fn crop_tail(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
