use anyhow::Result;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{imageops, RgbImage};

use super::policy::{CropBox, Geometry};
use crate::cli::ResampleFilter;

impl ResampleFilter {
    fn resize_alg(self) -> ResizeAlg {
        match self {
            ResampleFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
            ResampleFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ResampleFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResampleFilter::Nearest => ResizeAlg::Nearest,
        }
    }
}

/// Resize, then crop, as described by a precomputed geometry
pub fn apply_geometry(img: &RgbImage, geometry: &Geometry, filter: ResampleFilter) -> Result<RgbImage> {
    let (width, height) = geometry.resize_to;
    let resized = resize_image(img, width, height, filter)?;

    match geometry.crop {
        Some(crop) => crop_image(&resized, crop),
        None => Ok(resized),
    }
}

/// Crop an image to the given box
pub fn crop_image(img: &RgbImage, crop: CropBox) -> Result<RgbImage> {
    let (img_width, img_height) = img.dimensions();

    if crop.x + crop.width > img_width || crop.y + crop.height > img_height {
        return Err(anyhow::anyhow!(
            "Crop dimensions exceed image bounds: crop({},{},{}x{}) on {}x{} image",
            crop.x,
            crop.y,
            crop.width,
            crop.height,
            img_width,
            img_height
        ));
    }

    Ok(imageops::crop_imm(img, crop.x, crop.y, crop.width, crop.height).to_image())
}

/// Resize an image to exact dimensions
pub fn resize_image(img: &RgbImage, width: u32, height: u32, filter: ResampleFilter) -> Result<RgbImage> {
    let (src_width, src_height) = img.dimensions();

    if src_width == width && src_height == height {
        return Ok(img.clone());
    }

    if src_width == 0 || src_height == 0 {
        return Err(anyhow::anyhow!("Source image is empty"));
    }
    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!("Target size {}x{} is empty", width, height));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x3)?;
    let mut dst_image = Image::new(width, height, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(filter.resize_alg());
    resizer.resize(&src_image, &mut dst_image, &options)?;

    RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {}x{}", width, height))
}
