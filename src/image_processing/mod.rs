pub mod batch;
pub mod orientation;
pub mod output;
pub mod policy;
pub mod queue;
pub mod reducer;
pub mod report;
pub mod resize;
pub mod source;

pub use batch::{
    BatchEvent, BatchHandle, BatchJob, BatchSummary, CancellationToken, ConversionItem, ItemId,
};
pub use output::output_path;
pub use policy::{CropBox, Geometry, SizingPolicy};
pub use queue::{BatchProgress, ConversionQueue};
pub use reducer::{plan, reduce, reduce_file, Planned, Reduced};
pub use source::SourceImage;

use crate::cli::ResampleFilter;
use crate::error::ConfigError;

/// Extensions picked up when a directory is expanded
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Raw, unvalidated conversion inputs as entered by the user
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub quality: u32,
    pub ratio_percent: u32,
    pub target: Option<String>,
    pub folder: String,
    pub filter: ResampleFilter,
}

/// Validated settings for one batch
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSettings {
    pub policy: SizingPolicy,
    pub quality: u8,
    pub folder: String,
    pub filter: ResampleFilter,
}

/// Settings plus the recovered target-size error, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub settings: ConversionSettings,
    /// Set when the target size was malformed and ratio mode was used instead
    pub warning: Option<ConfigError>,
}

impl ConversionOptions {
    /// Validate the options and pick the sizing policy.
    ///
    /// A malformed target size does not fail: ratio mode is selected and the
    /// parse error is handed back as a warning for the user. Quality, ratio
    /// and folder errors are returned as-is.
    pub fn resolve(&self) -> Result<ResolvedSettings, ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Quality(self.quality));
        }
        if self.folder.is_empty() {
            return Err(ConfigError::EmptyFolder);
        }
        let ratio_policy = SizingPolicy::from_ratio_percent(self.ratio_percent)?;

        let (policy, warning) = match self.target.as_deref() {
            None => (ratio_policy, None),
            Some(spec) => match SizingPolicy::parse_target(spec) {
                Ok(policy) => (policy, None),
                Err(e) => {
                    tracing::warn!("{}; falling back to ratio mode", e);
                    (ratio_policy, Some(e))
                }
            },
        };

        Ok(ResolvedSettings {
            settings: ConversionSettings {
                policy,
                quality: self.quality as u8,
                folder: self.folder.clone(),
                filter: self.filter,
            },
            warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ConversionOptions {
        ConversionOptions {
            quality: 75,
            ratio_percent: 50,
            target: None,
            folder: "reduced".to_string(),
            filter: ResampleFilter::Lanczos3,
        }
    }

    #[test]
    fn test_resolve_ratio_mode() {
        let resolved = options().resolve().unwrap();
        assert_eq!(resolved.settings.policy, SizingPolicy::Ratio { ratio: 0.5 });
        assert_eq!(resolved.settings.quality, 75);
        assert_eq!(resolved.warning, None);
    }

    #[test]
    fn test_resolve_target_mode() {
        let resolved = ConversionOptions {
            target: Some("1080, 1920, 0".to_string()),
            ..options()
        }
        .resolve()
        .unwrap();

        assert_eq!(
            resolved.settings.policy,
            SizingPolicy::ScaleAndCrop {
                max_size: (1920, 1080)
            }
        );
        assert_eq!(resolved.warning, None);
    }

    #[test]
    fn test_malformed_target_falls_back_with_warning() {
        let resolved = ConversionOptions {
            target: Some("1920x1080".to_string()),
            ratio_percent: 30,
            ..options()
        }
        .resolve()
        .unwrap();

        assert_eq!(resolved.settings.policy, SizingPolicy::Ratio { ratio: 0.3 });
        assert_eq!(
            resolved.warning,
            Some(ConfigError::TargetFormat("1920x1080".to_string()))
        );
    }

    #[test]
    fn test_invalid_quality_and_folder() {
        let bad_quality = ConversionOptions {
            quality: 0,
            ..options()
        };
        assert_eq!(bad_quality.resolve(), Err(ConfigError::Quality(0)));

        let bad_quality = ConversionOptions {
            quality: 101,
            ..options()
        };
        assert_eq!(bad_quality.resolve(), Err(ConfigError::Quality(101)));

        let empty_folder = ConversionOptions {
            folder: String::new(),
            ..options()
        };
        assert_eq!(empty_folder.resolve(), Err(ConfigError::EmptyFolder));
    }

    #[test]
    fn test_invalid_ratio_is_fatal_even_with_target() {
        let bad_ratio = ConversionOptions {
            ratio_percent: 0,
            target: Some("1920, 1080, 1".to_string()),
            ..options()
        };
        assert_eq!(bad_ratio.resolve(), Err(ConfigError::Ratio(0)));
    }
}
