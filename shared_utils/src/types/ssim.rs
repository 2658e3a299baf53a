//! SSIM (Structural Similarity Index) Type-Safe Wrappers
//!
//! `Ssim` is a measured score in [0.0, 1.0]. `TargetSsim` is a caller-chosen
//! goal for the quality search and must lie strictly inside (0.0, 1.0).

use std::fmt;

/// Tolerance for approximate SSIM equality.
pub const SSIM_EPSILON: f64 = 1e-4;

pub const SSIM_MIN: f64 = 0.0;

pub const SSIM_MAX: f64 = 1.0;

/// Target used when the caller does not pick one.
pub const DEFAULT_TARGET_SSIM: f64 = 0.97;

// ============================================================================
// SsimError
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SsimError {
    /// Measured SSIM outside [0.0, 1.0]
    OutOfRange { value: f64 },
    /// Target SSIM not strictly inside (0.0, 1.0)
    TargetOutOfRange { value: f64 },
    /// NaN or Inf
    InvalidFloat,
}

impl fmt::Display for SsimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsimError::OutOfRange { value } => {
                write!(f, "SSIM {:.6} out of range [0.0, 1.0]", value)
            }
            SsimError::TargetOutOfRange { .. } => {
                write!(f, "SSIM factor should be between 0 and 1.")
            }
            SsimError::InvalidFloat => {
                write!(f, "Invalid SSIM: NaN or Infinity")
            }
        }
    }
}

impl std::error::Error for SsimError {}

// ============================================================================
// Ssim Newtype
// ============================================================================

/// A measured SSIM value in [0.0, 1.0], where 1.0 means identical.
///
/// # Examples
/// ```
/// use shared_utils::types::ssim::Ssim;
///
/// let ssim = Ssim::new(0.95).unwrap();
/// assert_eq!(ssim.value(), 0.95);
/// assert_eq!(ssim.display(), "0.950000");
///
/// assert!(Ssim::new(1.5).is_err());
/// assert!(Ssim::new(-0.1).is_err());
/// ```
#[derive(Clone, Copy)]
pub struct Ssim(f64);

impl Ssim {
    pub const PERFECT: Ssim = Ssim(1.0);

    pub fn new(value: f64) -> Result<Self, SsimError> {
        if value.is_nan() || value.is_infinite() {
            return Err(SsimError::InvalidFloat);
        }

        if value < SSIM_MIN || value > SSIM_MAX {
            return Err(SsimError::OutOfRange { value });
        }

        Ok(Self(value))
    }

    /// Clamps into [0.0, 1.0]; NaN maps to 0.0.
    pub fn clamped(value: f64) -> Self {
        let clamped = if value.is_nan() || value.is_infinite() {
            0.0
        } else {
            value.clamp(SSIM_MIN, SSIM_MAX)
        };
        Self(clamped)
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.0 - other.0).abs() < SSIM_EPSILON
    }

    pub fn display(&self) -> String {
        format!("{:.6}", self.0)
    }
}

impl fmt::Debug for Ssim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ssim({:.6})", self.0)
    }
}

impl fmt::Display for Ssim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl PartialEq for Ssim {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl PartialOrd for Ssim {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

// ============================================================================
// TargetSsim
// ============================================================================

/// SSIM goal for the quality search, strictly between 0 and 1.
#[derive(Clone, Copy, PartialEq)]
pub struct TargetSsim(f64);

impl TargetSsim {
    pub fn new(value: f64) -> Result<Self, SsimError> {
        if value.is_nan() || value.is_infinite() {
            return Err(SsimError::InvalidFloat);
        }
        if value <= SSIM_MIN || value >= SSIM_MAX {
            return Err(SsimError::TargetOutOfRange { value });
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Signed distance from a measured score: positive while below target.
    #[inline]
    pub fn error_of(&self, measured: Ssim) -> f64 {
        self.0 - measured.value()
    }
}

impl Default for TargetSsim {
    fn default() -> Self {
        Self(DEFAULT_TARGET_SSIM)
    }
}

impl fmt::Debug for TargetSsim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TargetSsim({:.6})", self.0)
    }
}

impl fmt::Display for TargetSsim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}
