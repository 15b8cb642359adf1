//! Single-image reduction: geometry, resampling and JPEG output.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::orientation::read_oriented_dimensions;
use super::output::output_path;
use super::resize::apply_geometry;
use super::source::SourceImage;
use super::ConversionSettings;
use crate::error::ReduceError;

/// A reduced copy that was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduced {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_size: (u32, u32),
    pub output_size: (u32, u32),
}

/// What a conversion would produce, computed from the header only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_size: (u32, u32),
    pub output_size: (u32, u32),
}

/// Decode `path` and write its reduced copy
pub fn reduce_file(path: &Path, settings: &ConversionSettings) -> Result<Reduced, ReduceError> {
    let source = SourceImage::open(path)?;
    reduce(&source, settings)
}

/// Resize an already decoded image and write it as JPEG next to its source
pub fn reduce(source: &SourceImage, settings: &ConversionSettings) -> Result<Reduced, ReduceError> {
    let output = resolve_output(source.path(), &settings.folder)?;
    let geometry = settings.policy.geometry(source.width(), source.height());

    tracing::debug!(
        "{}: {}x{} -> {}x{} ({})",
        source.path().display(),
        source.width(),
        source.height(),
        geometry.output_size().0,
        geometry.output_size().1,
        settings.policy.describe()
    );

    let reduced = apply_geometry(source.pixels(), &geometry, settings.filter).map_err(|e| {
        ReduceError::Resize {
            path: source.path().to_path_buf(),
            message: format!("{:#}", e),
        }
    })?;

    write_jpeg(&reduced, &output, settings.quality)?;

    Ok(Reduced {
        source: source.path().to_path_buf(),
        output,
        source_size: source.dimensions(),
        output_size: reduced.dimensions(),
    })
}

/// Output path and size of a conversion without decoding pixels
pub fn plan(path: &Path, settings: &ConversionSettings) -> Result<Planned, ReduceError> {
    let output = resolve_output(path, &settings.folder)?;
    let source_size = read_oriented_dimensions(path).map_err(|e| ReduceError::Decode {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;
    let geometry = settings.policy.geometry(source_size.0, source_size.1);

    Ok(Planned {
        source: path.to_path_buf(),
        output,
        source_size,
        output_size: geometry.output_size(),
    })
}

fn resolve_output(source: &Path, folder: &str) -> Result<PathBuf, ReduceError> {
    let write_error = |message: &str| ReduceError::Write {
        path: source.to_path_buf(),
        message: message.to_string(),
    };

    let output = output_path(source, folder).ok_or_else(|| write_error("source path has no file name"))?;
    if output == source {
        return Err(write_error("output folder resolves to the source directory"));
    }
    Ok(output)
}

fn write_jpeg(img: &RgbImage, output: &Path, quality: u8) -> Result<(), ReduceError> {
    let write_error = |message: String| ReduceError::Write {
        path: output.to_path_buf(),
        message,
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| write_error(format!("cannot create {}: {}", parent.display(), e)))?;
    }

    let file = File::create(output).map_err(|e| write_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(img)
        .map_err(|e| write_error(e.to_string()))?;
    writer.flush().map_err(|e| write_error(e.to_string()))?;

    // The file on disk is the only success signal
    if !output.exists() {
        return Err(write_error("output file missing after write".to_string()));
    }

    Ok(())
}
