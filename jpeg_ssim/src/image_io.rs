//! Loading, resizing and naming of images for the compressor.

use crate::error::{CompressError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use shared_utils::common_utils::has_extension;
use shared_utils::JPEG_EXTENSIONS;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Only `.jpg` / `.jpeg` (any case) are processed.
pub fn check_extension(path: &Path) -> Result<()> {
    if has_extension(path, JPEG_EXTENSIONS) {
        Ok(())
    } else {
        Err(CompressError::UnsupportedExtension)
    }
}

/// Decodes by content, not by extension.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let io_err = |source| CompressError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;
    reader.decode().map_err(CompressError::Decode)
}

/// Target size for fitting `(width, height)` inside a `max`×`max` box.
///
/// Returns `None` when the image already fits.
pub fn fitted_dimensions(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max {
        return None;
    }
    let scale = max as f64 / longest as f64;
    let shrink = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max);
    if width >= height {
        Some((max, shrink(height)))
    } else {
        Some((shrink(width), max))
    }
}

/// Scales the longer side down to `max`, keeping the aspect ratio.
/// Never upscales.
pub fn resize_to_max_dimension(image: DynamicImage, max: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    match fitted_dimensions(width, height, max) {
        Some((w, h)) => {
            debug!(from_width = width, from_height = height, to_width = w, to_height = h, "resizing");
            image.resize_exact(w, h, FilterType::Lanczos3)
        }
        None => image,
    }
}

/// `output_dir/<basename of input>`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join(input),
    }
}
