//! Error types for image reduction and batch conversion.
//!
//! Per-item failures are carried as values so the controller can show the
//! specific cause next to the file; none of them abort a batch.

use std::path::PathBuf;
use thiserror::Error;

/// Failure converting a single image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    /// Source could not be opened or decoded
    #[error("Decode error for {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Pixel resampling failed
    #[error("Resize failed for {}: {message}", path.display())]
    Resize { path: PathBuf, message: String },

    /// Output directory or file could not be written
    #[error("Write error for {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

impl ReduceError {
    /// Short label used in progress output and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ReduceError::Decode { .. } => "decode",
            ReduceError::Resize { .. } => "resize",
            ReduceError::Write { .. } => "write",
        }
    }
}

/// Invalid conversion settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Target size is not three comma-separated fields
    #[error("Target size must be formatted as 'dim1, dim2, max_ratio', got '{0}'")]
    TargetFormat(String),

    /// Target dimension is not a positive integer
    #[error("Invalid target dimension '{0}': expected a positive integer")]
    Dimension(String),

    /// Max ratio is negative, non-numeric or not finite
    #[error("Invalid max ratio '{0}': expected a number >= 0")]
    MaxRatio(String),

    #[error("Quality must be between 1 and 100, got {0}")]
    Quality(u32),

    #[error("Ratio must be between 1 and 100, got {0}")]
    Ratio(u32),

    /// An empty folder would write over the sources
    #[error("Output folder must not be empty")]
    EmptyFolder,
}

/// Controller-level refusals.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("A batch is already running")]
    BatchActive,

    #[error("All images have been converted")]
    NothingToConvert,
}
