//! Image Quality Metrics Module
//!
//! Windowed SSIM and PSNR between a reference image and a re-encoded candidate.
//! - SSIM: mean of per-window structural similarity over non-overlapping W×W
//!   luma windows (luminance/contrast/structure terms, Wang et al. constants)
//! - PSNR: Peak Signal-to-Noise Ratio over RGB with parallel MSE calculation

use crate::types::Ssim;
use image::{DynamicImage, GenericImageView, GrayImage};
use rayon::prelude::*;
use thiserror::Error;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const L: f64 = 255.0;
/// Wang et al. SSIM stability constants: (k_i * L)^2 to avoid division-by-zero in low-contrast regions.
const C1: f64 = (K1 * L) * (K1 * L);
const C2: f64 = (K2 * L) * (K2 * L);

/// Window edge used by the quality search unless configured otherwise.
pub const DEFAULT_SSIM_WINDOW: u32 = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("dimension mismatch: reference is {ref_width}x{ref_height}, candidate is {cand_width}x{cand_height}")]
    DimensionMismatch {
        ref_width: u32,
        ref_height: u32,
        cand_width: u32,
        cand_height: u32,
    },

    #[error("image too small for similarity window: {width}x{height} < {window}x{window}")]
    TooSmall { width: u32, height: u32, window: u32 },

    #[error("similarity window must be at least 1 pixel")]
    InvalidWindow,
}

/// Mean SSIM over non-overlapping square windows of a fixed size.
///
/// Right and bottom strips narrower than the window are not scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsimCalculator {
    window: u32,
}

impl Default for SsimCalculator {
    fn default() -> Self {
        Self {
            window: DEFAULT_SSIM_WINDOW,
        }
    }
}

impl SsimCalculator {
    pub fn new(window: u32) -> Result<Self, SimilarityError> {
        if window == 0 {
            return Err(SimilarityError::InvalidWindow);
        }
        Ok(Self { window })
    }

    #[inline]
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Fails before any pixel work if the pair cannot form a single window.
    pub fn check_dimensions(
        &self,
        reference: &DynamicImage,
        candidate: &DynamicImage,
    ) -> Result<(), SimilarityError> {
        let (w1, h1) = reference.dimensions();
        let (w2, h2) = candidate.dimensions();

        if w1 != w2 || h1 != h2 {
            return Err(SimilarityError::DimensionMismatch {
                ref_width: w1,
                ref_height: h1,
                cand_width: w2,
                cand_height: h2,
            });
        }
        if w1 < self.window || h1 < self.window {
            return Err(SimilarityError::TooSmall {
                width: w1,
                height: h1,
                window: self.window,
            });
        }
        Ok(())
    }

    pub fn score(
        &self,
        reference: &DynamicImage,
        candidate: &DynamicImage,
    ) -> Result<Ssim, SimilarityError> {
        self.check_dimensions(reference, candidate)?;

        let ref_gray = reference.to_luma8();
        let cand_gray = candidate.to_luma8();
        Ok(Ssim::clamped(self.mean_window_ssim(&ref_gray, &cand_gray)))
    }

    fn mean_window_ssim(&self, reference: &GrayImage, candidate: &GrayImage) -> f64 {
        let win = self.window;
        let cols = reference.width() / win;
        let rows = reference.height() / win;

        let positions: Vec<(u32, u32)> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (c * win, r * win)))
            .collect();

        let ssim_sum: f64 = positions
            .par_iter()
            .map(|&(x, y)| window_ssim(reference, candidate, x, y, win))
            .sum();

        ssim_sum / positions.len() as f64
    }
}

fn window_ssim(orig: &GrayImage, conv: &GrayImage, x0: u32, y0: u32, win: u32) -> f64 {
    let n = (win as f64) * (win as f64);

    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut sum_xx = 0.0f64;
    let mut sum_yy = 0.0f64;
    let mut sum_xy = 0.0f64;
    for y in y0..y0 + win {
        for x in x0..x0 + win {
            let a = orig.get_pixel(x, y)[0] as f64;
            let b = conv.get_pixel(x, y)[0] as f64;
            sum_x += a;
            sum_y += b;
            sum_xx += a * a;
            sum_yy += b * b;
            sum_xy += a * b;
        }
    }

    let mean_x = sum_x / n;
    let mean_y = sum_y / n;
    // Population moments; tiny negative values from cancellation are floored at zero.
    let var_x = (sum_xx / n - mean_x * mean_x).max(0.0);
    let var_y = (sum_yy / n - mean_y * mean_y).max(0.0);
    let cov_xy = sum_xy / n - mean_x * mean_y;

    let numerator = (2.0 * mean_x * mean_y + C1) * (2.0 * cov_xy + C2);
    let denominator = (mean_x * mean_x + mean_y * mean_y + C1) * (var_x + var_y + C2);

    numerator / denominator
}

/// Mean windowed SSIM of `candidate` against `reference`.
pub fn calculate_ssim(
    reference: &DynamicImage,
    candidate: &DynamicImage,
    window: u32,
) -> Result<Ssim, SimilarityError> {
    SsimCalculator::new(window)?.score(reference, candidate)
}

pub fn calculate_psnr(original: &DynamicImage, converted: &DynamicImage) -> Option<f64> {
    let (w1, h1) = original.dimensions();
    let (w2, h2) = converted.dimensions();

    if w1 != w2 || h1 != h2 || w1 == 0 || h1 == 0 {
        return None;
    }

    let orig_rgb = original.to_rgb8();
    let conv_rgb = converted.to_rgb8();

    let mse_sum: f64 = orig_rgb
        .as_raw()
        .par_iter()
        .zip(conv_rgb.as_raw().par_iter())
        .map(|(&a, &b)| {
            let d = a as f64 - b as f64;
            d * d
        })
        .sum();

    let mse = mse_sum / orig_rgb.as_raw().len() as f64;

    if mse < 1e-10 {
        return Some(f64::INFINITY);
    }

    Some(10.0 * (L * L / mse).log10())
}

pub fn ssim_quality_description(ssim: f64) -> &'static str {
    if ssim >= 0.999 {
        "Identical"
    } else if ssim >= 0.98 {
        "Excellent - virtually lossless"
    } else if ssim >= 0.95 {
        "Very good - minimal visible difference"
    } else if ssim >= 0.90 {
        "Good - acceptable quality"
    } else if ssim >= 0.85 {
        "Fair - noticeable degradation"
    } else {
        "Poor - significant quality loss"
    }
}
