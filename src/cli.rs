use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

use crate::image_processing::ConversionOptions;

pub const DEFAULT_QUALITY: u32 = 75;
pub const DEFAULT_RATIO_PERCENT: u32 = 50;
pub const DEFAULT_FOLDER: &str = "reduced";

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Lanczos3 convolution (sharpest, default)
    #[default]
    #[value(name = "lanczos3")]
    Lanczos3,
    /// Catmull-Rom bicubic convolution
    #[value(name = "catmull-rom")]
    CatmullRom,
    /// Bilinear convolution (fast, softer)
    #[value(name = "bilinear")]
    Bilinear,
    /// Nearest neighbour (fastest, blocky)
    #[value(name = "nearest")]
    Nearest,
}

#[derive(Parser, Debug)]
#[command(
    name = "image-transformer",
    version,
    about = "Batch-reduce photos to smaller JPEG copies",
    long_about = "
Image Transformer - batch JPEG reducer

Converts every given image (directories are searched recursively for .jpg and
.jpeg files) into a reduced JPEG copy. Copies go to a sub-folder next to each
original, or to a sibling folder when the folder name starts with '-'.

Sizing modes:
• Ratio: scale every image by --ratio percent (default mode)
• Fit: --target \"W, H, MAX_RATIO\" scales to fit inside WxH (box follows the
  image orientation) without scaling by more than MAX_RATIO
• Fill and crop: --target \"W, H, 0\" scales to cover WxH and crops the center

Example Usage:
  # Halve every photo under ~/Photos into ~/Photos/**/reduced/
  image-transformer ~/Photos

  # Fit into 1920x1080 without enlarging, quality 85, into ~/Photos-small/
  image-transformer ~/Photos -t \"1920, 1080, 1\" -q 85 -o -small

  # Exact 400x600 crops, stop at the first unreadable file
  image-transformer ~/Photos -t \"400, 600, 0\" --stop-on-error

  # Preview the output paths and sizes without writing anything
  image-transformer ~/Photos -t \"1920, 1080, 1\" --dry-run"
)]
pub struct Args {
    /// Image files or directories to convert
    #[arg(required = true, value_name = "PATH")]
    pub input_paths: Vec<PathBuf>,

    /// JPEG quality of the reduced copies (1-100) [default: 75]
    #[arg(short = 'q', long = "quality", value_name = "1-100")]
    pub quality: Option<u32>,

    /// Scale percentage used when no target size is given (1-100) [default: 50]
    #[arg(short = 'r', long = "ratio", value_name = "PERCENT")]
    pub ratio: Option<u32>,

    /// Target size as "dim1, dim2, max_ratio"; a max_ratio of 0 fills and crops
    #[arg(short = 't', long = "target", value_name = "\"W, H, R\"")]
    pub target: Option<String>,

    /// Output folder name, or a suffix for the parent directory when it starts with '-' [default: reduced]
    #[arg(short = 'o', long = "folder", value_name = "NAME", allow_hyphen_values = true)]
    pub folder: Option<String>,

    /// Resampling filter used when resizing [default: lanczos3]
    #[arg(long = "filter", value_name = "FILTER")]
    pub filter: Option<ResampleFilter>,

    /// JSON configuration file; command-line values take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Show what would be written without converting anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Cancel the remaining images after the first failure
    #[arg(long = "stop-on-error")]
    pub stop_on_error: bool,

    /// Print a table with every converted image at the end
    #[arg(long = "report")]
    pub report: bool,

    /// Emit progress as JSON lines on stdout instead of human-readable output
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Conversion options with defaults filled in for anything left unset
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            quality: self.quality.unwrap_or(DEFAULT_QUALITY),
            ratio_percent: self.ratio.unwrap_or(DEFAULT_RATIO_PERCENT),
            target: self
                .target
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            folder: self
                .folder
                .clone()
                .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            filter: self.filter.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["image-transformer", "photo.jpg"]).unwrap();
        let options = args.conversion_options();

        assert_eq!(args.input_paths, vec![PathBuf::from("photo.jpg")]);
        assert_eq!(options.quality, 75);
        assert_eq!(options.ratio_percent, 50);
        assert_eq!(options.target, None);
        assert_eq!(options.folder, "reduced");
        assert_eq!(options.filter, ResampleFilter::Lanczos3);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "image-transformer",
            "a",
            "b",
            "-q",
            "90",
            "-r",
            "25",
            "-t",
            "1920, 1080, 1",
            "-o",
            "-small",
            "--filter",
            "catmull-rom",
            "--dry-run",
            "--stop-on-error",
        ])
        .unwrap();
        let options = args.conversion_options();

        assert_eq!(args.input_paths.len(), 2);
        assert_eq!(options.quality, 90);
        assert_eq!(options.ratio_percent, 25);
        assert_eq!(options.target.as_deref(), Some("1920, 1080, 1"));
        assert_eq!(options.folder, "-small");
        assert_eq!(options.filter, ResampleFilter::CatmullRom);
        assert!(args.dry_run);
        assert!(args.stop_on_error);
    }

    #[test]
    fn test_blank_target_means_ratio_mode() {
        let args = Args::try_parse_from(["image-transformer", "a", "-t", "  "]).unwrap();
        assert_eq!(args.conversion_options().target, None);
    }

    #[test]
    fn test_inputs_required() {
        assert!(Args::try_parse_from(["image-transformer"]).is_err());
    }
}
