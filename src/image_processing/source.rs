use image::RgbImage;
use std::path::{Path, PathBuf};

use super::orientation::{self, ExifOrientation};
use crate::error::ReduceError;

/// A decoded source image, stored upright
#[derive(Debug, Clone)]
pub struct SourceImage {
    path: PathBuf,
    pixels: RgbImage,
    orientation: ExifOrientation,
}

impl SourceImage {
    /// Decode an image from disk and normalize its EXIF orientation
    pub fn open(path: &Path) -> Result<Self, ReduceError> {
        let decode_error = |message: String| ReduceError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let img = image::ImageReader::open(path)
            .map_err(|e| decode_error(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?
            .decode()
            .map_err(|e| decode_error(e.to_string()))?;

        let orientation = orientation::read_orientation(path);
        tracing::debug!(
            "Decoded {} ({}x{}, orientation: {})",
            path.display(),
            img.width(),
            img.height(),
            orientation.description()
        );

        Ok(Self::from_pixels(path, img.to_rgb8(), orientation))
    }

    /// Wrap already decoded pixels, applying `orientation`
    pub fn from_pixels(path: &Path, pixels: RgbImage, orientation: ExifOrientation) -> Self {
        Self {
            path: path.to_path_buf(),
            pixels: orientation::apply_orientation(pixels, orientation),
            orientation,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Orientation found in the file, already applied to the pixels
    pub fn orientation(&self) -> ExifOrientation {
        self.orientation
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}
