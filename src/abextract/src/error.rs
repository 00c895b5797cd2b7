//! Fatal error types for the extraction run

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a run (or a single file's attempt) rather than being
/// folded into the batch statistics.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Input directory does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Input path is not a directory: {}", .0.display())]
    InputNotDirectory(PathBuf),

    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config from {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("No bundle decoder compiled in (rebuild with `--features unity`)")]
    DecoderUnavailable,

    #[error("Interrupted by user")]
    Interrupted,
}

impl ExtractError {
    /// Whether a retry could plausibly change the outcome.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ExtractError::InputNotFound(_)
                | ExtractError::InputNotDirectory(_)
                | ExtractError::InvalidSetting { .. }
                | ExtractError::DecoderUnavailable
                | ExtractError::Interrupted
        )
    }
}
