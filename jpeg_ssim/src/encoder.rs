//! JPEG trial encoding.
//!
//! The quality search only needs "re-encode at quality Q and give me back what
//! a decoder would see". `TrialEncoder` is that capability; `JpegTrialEncoder`
//! implements it with the `image` crate's baseline JPEG encoder (no chroma
//! subsampling), routing bytes through memory or an explicit scratch directory.

use crate::error::EncodeError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use shared_utils::JpegQuality;
use std::fs;
use std::path::{Path, PathBuf};

/// Produces the decoded result of re-encoding `image` at `quality`.
///
/// Implementations must be deterministic for a given `(image, quality)` pair
/// and must reject qualities they cannot encode instead of coercing them.
pub trait TrialEncoder {
    fn encode_trial(&self, image: &DynamicImage, quality: f64)
        -> Result<DynamicImage, EncodeError>;
}

/// Where trial re-encodings are materialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialStorage {
    InMemory,
    /// A directory owned by a single search; trials overwrite `trial.jpg` in it.
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct JpegTrialEncoder {
    storage: TrialStorage,
}

impl Default for JpegTrialEncoder {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl JpegTrialEncoder {
    pub fn in_memory() -> Self {
        Self {
            storage: TrialStorage::InMemory,
        }
    }

    pub fn in_directory<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            storage: TrialStorage::Directory(dir.as_ref().to_path_buf()),
        }
    }

    fn round_trip(&self, bytes: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        match &self.storage {
            TrialStorage::InMemory => Ok(bytes),
            TrialStorage::Directory(dir) => {
                let path = dir.join("trial.jpg");
                fs::write(&path, &bytes).map_err(|source| EncodeError::Scratch {
                    path: path.clone(),
                    source,
                })?;
                fs::read(&path).map_err(|source| EncodeError::Scratch { path, source })
            }
        }
    }
}

impl TrialEncoder for JpegTrialEncoder {
    fn encode_trial(
        &self,
        image: &DynamicImage,
        quality: f64,
    ) -> Result<DynamicImage, EncodeError> {
        let quality = JpegQuality::from_candidate(quality)?;
        let bytes = self.round_trip(encode_jpeg_bytes(image, quality)?)?;
        Ok(image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)?)
    }
}

/// Baseline JPEG at `quality`, 4:4:4, RGB.
pub fn encode_jpeg_bytes(image: &DynamicImage, quality: JpegQuality) -> Result<Vec<u8>, EncodeError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.value()).encode_image(&rgb)?;
    Ok(buf)
}

/// Writes the final output and hands back the bytes that went to disk.
pub fn save_jpeg(
    image: &DynamicImage,
    quality: JpegQuality,
    path: &Path,
) -> Result<Vec<u8>, EncodeError> {
    let bytes = encode_jpeg_bytes(image, quality)?;
    fs::write(path, &bytes).map_err(|source| EncodeError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};
    use tempfile::TempDir;

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8])
        }))
    }

    #[test]
    fn test_trial_keeps_dimensions() {
        let img = sample();
        let trial = JpegTrialEncoder::in_memory().encode_trial(&img, 50.0).unwrap();
        assert_eq!(trial.dimensions(), img.dimensions());
    }

    #[test]
    fn test_trial_is_deterministic() {
        let img = sample();
        let enc = JpegTrialEncoder::in_memory();
        let a = enc.encode_trial(&img, 42.0).unwrap();
        let b = enc.encode_trial(&img, 42.0).unwrap();
        assert_eq!(a.to_rgb8().as_raw(), b.to_rgb8().as_raw());
    }

    #[test]
    fn test_fractional_quality_matches_rounded() {
        let img = sample();
        let enc = JpegTrialEncoder::in_memory();
        let a = enc.encode_trial(&img, 41.6).unwrap();
        let b = enc.encode_trial(&img, 42.0).unwrap();
        assert_eq!(a.to_rgb8().as_raw(), b.to_rgb8().as_raw());
    }

    #[test]
    fn test_out_of_range_quality_is_rejected() {
        let img = sample();
        let enc = JpegTrialEncoder::in_memory();
        assert!(matches!(
            enc.encode_trial(&img, 101.0),
            Err(EncodeError::Quality(_))
        ));
        assert!(matches!(
            enc.encode_trial(&img, -1.0),
            Err(EncodeError::Quality(_))
        ));
    }

    #[test]
    fn test_directory_storage_matches_memory() {
        let dir = TempDir::new().unwrap();
        let img = sample();
        let from_disk = JpegTrialEncoder::in_directory(dir.path())
            .encode_trial(&img, 70.0)
            .unwrap();
        let from_mem = JpegTrialEncoder::in_memory().encode_trial(&img, 70.0).unwrap();
        assert_eq!(from_disk.to_rgb8().as_raw(), from_mem.to_rgb8().as_raw());
        assert!(dir.path().join("trial.jpg").exists());
    }

    #[test]
    fn test_missing_scratch_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let enc = JpegTrialEncoder::in_directory(dir.path().join("gone"));
        assert!(matches!(
            enc.encode_trial(&sample(), 70.0),
            Err(EncodeError::Scratch { .. })
        ));
    }

    #[test]
    fn test_save_jpeg_returns_written_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jpg");
        let quality = JpegQuality::new(80).unwrap();
        let written = save_jpeg(&sample(), quality, &path).unwrap();
        assert!(!written.is_empty());
        assert_eq!(written, fs::read(&path).unwrap());
    }

    #[test]
    fn test_output_write_failure_is_not_a_scratch_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.jpg");
        let err = save_jpeg(&sample(), JpegQuality::new(80).unwrap(), &path).unwrap_err();

        assert!(matches!(&err, EncodeError::Output { path: p, .. } if *p == path));
        let message = err.to_string();
        assert!(message.starts_with("failed to write"), "{}", message);
        assert!(!message.contains("scratch"), "{}", message);
    }
}
