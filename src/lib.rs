// Library exports for reuse by front-ends and other applications
pub mod cli;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod json_output;
pub mod logging;
pub mod utils;

// Re-export commonly used types
pub use cli::{Args, ResampleFilter};
pub use error::{ConfigError, QueueError, ReduceError};
pub use image_processing::{
    BatchEvent, BatchHandle, BatchSummary, ConversionOptions, ConversionQueue, ConversionSettings,
    SizingPolicy,
};
pub use json_output::JsonMessage;
