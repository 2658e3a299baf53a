//! Error types for the JPEG SSIM compressor.
//!
//! Every failure is local to one image; `CompressError::category` tells the
//! batch driver whether to count it as skipped or failed.

use shared_utils::{QualityError, SimilarityError, SsimError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("invalid trial quality: {0}")]
    Quality(#[from] QualityError),

    #[error("JPEG encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("scratch I/O failed at {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("cannot evaluate similarity for this image: {0}")]
    Similarity(#[from] SimilarityError),

    #[error("trial encode failed at quality {quality:.2}: {source}")]
    Encode {
        quality: f64,
        #[source]
        source: EncodeError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidSsim(#[from] SsimError),

    #[error("Maximum dimension should be a positive number.")]
    InvalidMaxDimension(i64),

    #[error("similarity window must be at least 1 pixel")]
    InvalidWindow,

    #[error("tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f64),

    #[error("input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("{0}")]
    Unsafe(String),
}

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("not a JPEG file (expected .jpg or .jpeg)")]
    UnsupportedExtension,

    #[error("not a recognized image: {0}")]
    Decode(#[source] image::ImageError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("failed to write output: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// How the batch driver accounts for a per-image error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Skip,
    Fail,
}

impl CompressError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompressError::UnsupportedExtension => ErrorCategory::Skip,
            _ => ErrorCategory::Fail,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressError>;
