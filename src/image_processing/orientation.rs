use anyhow::{Context, Result};
use exif::{In, Reader, Tag, Value};
use image::{imageops, RgbImage};
use std::path::Path;

/// EXIF orientation values (tag 0x0112)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExifOrientation {
    /// No orientation tag or an out-of-range value
    #[default]
    Undefined = 0,
    /// Normal orientation (0 degrees)
    TopLeft = 1,
    /// Horizontally flipped
    TopRight = 2,
    /// Rotated 180 degrees
    BottomRight = 3,
    /// Vertically flipped
    BottomLeft = 4,
    /// Transposed (mirrored along the main diagonal)
    LeftTop = 5,
    /// Rotated 90 degrees CW
    RightTop = 6,
    /// Transversed (mirrored along the anti-diagonal)
    RightBottom = 7,
    /// Rotated 90 degrees CCW
    LeftBottom = 8,
}

impl From<u32> for ExifOrientation {
    fn from(value: u32) -> Self {
        match value {
            1 => ExifOrientation::TopLeft,
            2 => ExifOrientation::TopRight,
            3 => ExifOrientation::BottomRight,
            4 => ExifOrientation::BottomLeft,
            5 => ExifOrientation::LeftTop,
            6 => ExifOrientation::RightTop,
            7 => ExifOrientation::RightBottom,
            8 => ExifOrientation::LeftBottom,
            _ => ExifOrientation::Undefined,
        }
    }
}

impl ExifOrientation {
    /// Get a human-readable description of the orientation
    pub fn description(&self) -> &'static str {
        match self {
            ExifOrientation::Undefined => "Undefined",
            ExifOrientation::TopLeft => "Normal",
            ExifOrientation::TopRight => "Horizontally flipped",
            ExifOrientation::BottomRight => "Rotated 180°",
            ExifOrientation::BottomLeft => "Vertically flipped",
            ExifOrientation::LeftTop => "Transposed",
            ExifOrientation::RightTop => "Rotated 90° CW",
            ExifOrientation::RightBottom => "Transversed",
            ExifOrientation::LeftBottom => "Rotated 90° CCW",
        }
    }

    /// Whether normalizing this orientation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            ExifOrientation::LeftTop
                | ExifOrientation::RightTop
                | ExifOrientation::RightBottom
                | ExifOrientation::LeftBottom
        )
    }

    /// Dimensions of the stored pixels once this orientation is applied
    pub fn oriented_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Read the EXIF orientation of a file, `Undefined` when it has none
///
/// Files without an EXIF block are common (PNG exports, stripped JPEGs),
/// so a missing tag is not an error.
pub fn read_orientation(image_path: &Path) -> ExifOrientation {
    match read_exif_orientation(image_path) {
        Ok(orientation) => orientation,
        Err(e) => {
            tracing::trace!("No EXIF orientation for {}: {:#}", image_path.display(), e);
            ExifOrientation::Undefined
        }
    }
}

/// Read EXIF orientation tag from an image file
fn read_exif_orientation(image_path: &Path) -> Result<ExifOrientation> {
    let file = std::fs::File::open(image_path).with_context(|| {
        format!(
            "Failed to open image for EXIF reading: {}",
            image_path.display()
        )
    })?;

    let mut buf_reader = std::io::BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf_reader)
        .context("Failed to read EXIF data")?;

    if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
        if let Value::Short(values) = &field.value {
            if let Some(&orientation_value) = values.first() {
                return Ok(ExifOrientation::from(orientation_value as u32));
            }
        }
    }

    Ok(ExifOrientation::Undefined)
}

/// Header-only dimensions after EXIF normalization, without decoding pixels
pub fn read_oriented_dimensions(image_path: &Path) -> Result<(u32, u32)> {
    let (width, height) = image::ImageReader::open(image_path)
        .with_context(|| format!("Failed to open image: {}", image_path.display()))?
        .with_guessed_format()
        .context("Failed to detect image format")?
        .into_dimensions()
        .context("Failed to read image header")?;

    Ok(read_orientation(image_path).oriented_dimensions(width, height))
}

/// Apply EXIF orientation so the pixels are stored upright
pub fn apply_orientation(img: RgbImage, orientation: ExifOrientation) -> RgbImage {
    match orientation {
        ExifOrientation::Undefined | ExifOrientation::TopLeft => img,
        ExifOrientation::TopRight => imageops::flip_horizontal(&img),
        ExifOrientation::BottomRight => imageops::rotate180(&img),
        ExifOrientation::BottomLeft => imageops::flip_vertical(&img),
        ExifOrientation::LeftTop => imageops::flip_horizontal(&imageops::rotate90(&img)),
        ExifOrientation::RightTop => imageops::rotate90(&img),
        ExifOrientation::RightBottom => imageops::flip_horizontal(&imageops::rotate270(&img)),
        ExifOrientation::LeftBottom => imageops::rotate270(&img),
    }
}

/// JPEG files carrying a real EXIF orientation tag
#[cfg(test)]
pub(crate) mod fixtures {
    use image::codecs::jpeg::JpegEncoder;
    use image::RgbImage;
    use std::path::Path;

    /// APP1 segment holding a big-endian TIFF block with one IFD0 entry
    fn exif_segment(orientation: u16) -> Vec<u8> {
        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(b"MM\0\x2A");
        payload.extend_from_slice(&8u32.to_be_bytes());
        payload.extend_from_slice(&1u16.to_be_bytes());
        // Orientation, SHORT, count 1, value left-aligned in the offset field
        payload.extend_from_slice(&0x0112u16.to_be_bytes());
        payload.extend_from_slice(&3u16.to_be_bytes());
        payload.extend_from_slice(&1u32.to_be_bytes());
        payload.extend_from_slice(&orientation.to_be_bytes());
        payload.extend_from_slice(&[0, 0]);
        payload.extend_from_slice(&0u32.to_be_bytes());

        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
        segment.extend_from_slice(&payload);
        segment
    }

    /// Encode `pixels` as stored (not rotated) and tag them with `orientation`
    pub fn jpeg_with_orientation(path: &Path, pixels: &RgbImage, orientation: u16) {
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, 90)
            .encode_image(pixels)
            .unwrap();
        assert_eq!(&encoded[..2], &[0xFF, 0xD8]);

        let mut tagged = encoded[..2].to_vec();
        tagged.extend_from_slice(&exif_segment(orientation));
        tagged.extend_from_slice(&encoded[2..]);
        std::fs::write(path, tagged).unwrap();
    }
}
