//! Error types for rule generation, merging and undo
//!
//! Library operations return [`AdjustError`]. Application code wraps these
//! (and file I/O) in `anyhow` with [`ThaikernContext`] for readable messages.

use std::path::{Path, PathBuf};

use crate::adjust::batch::BatchStage;
use crate::adjust::merger::MergeReport;

pub type AdjustResult<T> = std::result::Result<T, AdjustError>;

#[derive(Debug, thiserror::Error)]
pub enum AdjustError {
    /// No font asset is selected in the session
    #[error("No font asset selected")]
    ResourceAbsent,

    /// A character has no glyph in the font. Merges count this as a skip.
    #[error("Glyph not found for character '{0}'")]
    GlyphNotFound(char),

    /// An undo was requested that cannot be honoured
    #[error("Cannot restore backup: {0}")]
    Precondition(String),

    #[error("A batch operation is already running")]
    BatchInProgress,

    /// A batch stage failed; the pre-batch backup is still available for undo
    #[error(
        "Batch failed during {stage} ({} added, {} updated, {} skipped so far): {source}",
        .counts.added, .counts.updated, .counts.skipped
    )]
    BatchFailed {
        stage: BatchStage,
        counts: MergeReport,
        #[source]
        source: Box<AdjustError>,
    },

    /// The font or layout collaborator reported a failure
    #[error("{operation} failed: {source}")]
    Collaborator {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AdjustError {
    pub fn collaborator(operation: &'static str, source: anyhow::Error) -> Self {
        AdjustError::Collaborator { operation, source }
    }
}

/// File-aware context for `anyhow` results
pub trait ThaikernContext<T> {
    fn with_file_context(self, operation: &str, path: &Path) -> anyhow::Result<T>;
}

impl<T, E> ThaikernContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_file_context(self, operation: &str, path: &Path) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::Error::new(e).context(format!("Failed to {operation} {}", path.display())))
    }
}

/// Check that a path can be opened as a UFO source
pub fn validate_ufo_path(path: &Path) -> anyhow::Result<PathBuf> {
    if !path.exists() {
        anyhow::bail!(
            "UFO source does not exist: {}\nMake sure the path is correct.",
            path.display()
        );
    }
    if !path.is_dir() || !path.join("metainfo.plist").exists() {
        anyhow::bail!(
            "Not a valid UFO directory: missing metainfo.plist in {}",
            path.display()
        );
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_not_found_message() {
        let error = AdjustError::GlyphNotFound('ก');
        assert_eq!(
            error.to_string(),
            "Glyph not found for character 'ก'"
        );
    }

    #[test]
    fn test_batch_failure_carries_stage_and_counts() {
        let error = AdjustError::BatchFailed {
            stage: BatchStage::Merging,
            counts: MergeReport {
                added: 3,
                updated: 1,
                skipped: 2,
            },
            source: Box::new(AdjustError::ResourceAbsent),
        };
        let message = error.to_string();
        assert!(message.contains("merging"));
        assert!(message.contains("3 added, 1 updated, 2 skipped"));
    }

    #[test]
    fn test_validate_ufo_path_rejects_missing() {
        let result = validate_ufo_path(Path::new("/definitely/not/here.ufo"));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_context_mentions_path() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let error = result
            .with_file_context("load", Path::new("font.json"))
            .unwrap_err();
        assert_eq!(error.to_string(), "Failed to load font.json");
    }
}
