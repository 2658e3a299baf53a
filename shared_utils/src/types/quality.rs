//! JPEG Quality Type-Safe Wrapper
//!
//! The quality search walks a real-valued candidate; the encoder only accepts
//! whole numbers in [1, 100]. `JpegQuality` is the boundary between the two:
//! candidates are rounded, then range-checked. Nothing is clamped.

use std::fmt;

/// Lowest quality accepted by the baseline JPEG encoder.
pub const JPEG_QUALITY_MIN: u8 = 1;

/// Highest quality accepted by the baseline JPEG encoder.
pub const JPEG_QUALITY_MAX: u8 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum QualityError {
    /// Rounded candidate outside [1, 100]
    OutOfRange { candidate: f64 },
    /// NaN or Inf candidate
    InvalidFloat,
}

impl fmt::Display for QualityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityError::OutOfRange { candidate } => write!(
                f,
                "JPEG quality {:.2} out of range [{}, {}]",
                candidate, JPEG_QUALITY_MIN, JPEG_QUALITY_MAX
            ),
            QualityError::InvalidFloat => write!(f, "Invalid JPEG quality: NaN or Infinity"),
        }
    }
}

impl std::error::Error for QualityError {}

/// A whole-number JPEG quality in [1, 100].
///
/// # Examples
/// ```
/// use shared_utils::types::quality::JpegQuality;
///
/// let q = JpegQuality::from_candidate(84.6).unwrap();
/// assert_eq!(q.value(), 85);
///
/// assert!(JpegQuality::from_candidate(0.4).is_err());
/// assert!(JpegQuality::from_candidate(100.6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JpegQuality(u8);

impl JpegQuality {
    pub fn new(value: u8) -> Result<Self, QualityError> {
        if !(JPEG_QUALITY_MIN..=JPEG_QUALITY_MAX).contains(&value) {
            return Err(QualityError::OutOfRange {
                candidate: value as f64,
            });
        }
        Ok(Self(value))
    }

    /// Rounds half away from zero, then checks the range.
    pub fn from_candidate(candidate: f64) -> Result<Self, QualityError> {
        if !candidate.is_finite() {
            return Err(QualityError::InvalidFloat);
        }
        let rounded = candidate.round();
        if rounded < JPEG_QUALITY_MIN as f64 || rounded > JPEG_QUALITY_MAX as f64 {
            return Err(QualityError::OutOfRange { candidate });
        }
        Ok(Self(rounded as u8))
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for JpegQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
