//! Quality search: find the JPEG quality whose re-encode hits a target SSIM.
//!
//! Damped direction reversal: start low, walk upward in constant steps while
//! still below target; every time the measured error changes sign, halve the
//! step and reverse it. Stop when |target - ssim| <= tolerance and return the
//! quality that produced that measurement.
//!
//! The candidate is a real number and is not clamped here. Encoders reject
//! qualities they cannot encode and the search surfaces that as
//! `SearchError::Encode`. The loop is bounded by a trial budget and a
//! minimum step; when either trips, the lowest quality that met the target is
//! returned with `SearchStatus::Approximate`, or the closest trial if none did.

use crate::encoder::{JpegTrialEncoder, TrialEncoder};
use crate::error::{ConfigError, SearchError};
use image::DynamicImage;
use shared_utils::image_metrics::DEFAULT_SSIM_WINDOW;
use shared_utils::types::budget::{DEFAULT_MIN_STEP, NORMAL_MAX_ITERATIONS};
use shared_utils::{
    BudgetExhausted, JpegQuality, QualityError, SearchBudget, Ssim, SsimCalculator, TargetSsim,
};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

pub const DEFAULT_START_QUALITY: f64 = 5.0;

pub const DEFAULT_INITIAL_STEP: f64 = 3.0;

pub const DEFAULT_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// First candidate; low so the search approaches from the small-file side.
    pub start_quality: f64,
    pub initial_step: f64,
    /// Accepted |target - ssim| at the end of the search.
    pub tolerance: f64,
    /// SSIM window edge in pixels.
    pub window: u32,
    pub max_iterations: u32,
    /// Give up once a reversal would shrink the step below this.
    pub min_step: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start_quality: DEFAULT_START_QUALITY,
            initial_step: DEFAULT_INITIAL_STEP,
            tolerance: DEFAULT_TOLERANCE,
            window: DEFAULT_SSIM_WINDOW,
            max_iterations: NORMAL_MAX_ITERATIONS,
            min_step: DEFAULT_MIN_STEP,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_quality(mut self, quality: f64) -> Self {
        self.start_quality = quality;
        self
    }

    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window == 0 {
            return Err(ConfigError::InvalidWindow);
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// One encode-and-measure step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub quality: f64,
    pub score: Ssim,
    /// target - score
    pub error: f64,
}

pub type ApproximateReason = BudgetExhausted;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchStatus {
    Converged,
    /// Target not reached within tolerance; the lowest passing trial (or the
    /// closest one) was returned.
    Approximate(ApproximateReason),
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub quality: f64,
    pub score: Ssim,
    pub error: f64,
    pub iterations: usize,
    pub status: SearchStatus,
    pub trials: Vec<Trial>,
}

impl SearchOutcome {
    pub fn is_converged(&self) -> bool {
        self.status == SearchStatus::Converged
    }

    pub fn jpeg_quality(&self) -> Result<JpegQuality, QualityError> {
        JpegQuality::from_candidate(self.quality)
    }
}

/// Per-invocation state; never shared between searches.
#[derive(Debug, Clone)]
struct SearchState {
    quality: f64,
    step: f64,
    error: f64,
    below_target: bool,
}

impl SearchState {
    fn new(config: &SearchConfig) -> Self {
        Self {
            quality: config.start_quality,
            step: config.initial_step,
            error: 1.0,
            below_target: true,
        }
    }

    /// Records a measurement and moves to the next candidate.
    /// Returns true when the measurement crossed the target.
    fn observe(&mut self, error: f64) -> bool {
        self.error = error;
        let currently_below = error > 0.0;
        let crossed = currently_below != self.below_target;
        if crossed {
            self.below_target = currently_below;
            self.step = -self.step / 2.0;
        }
        self.quality += self.step;
        crossed
    }
}

fn closer(a: &Trial, b: &Trial) -> Ordering {
    a.error
        .abs()
        .partial_cmp(&b.error.abs())
        .unwrap_or(Ordering::Equal)
        .then_with(|| lower_quality(a, b))
}

fn lower_quality(a: &Trial, b: &Trial) -> Ordering {
    a.quality.partial_cmp(&b.quality).unwrap_or(Ordering::Equal)
}

/// Lowest quality whose score met the target, else the closest trial.
fn fallback_trial(trials: &[Trial]) -> Option<Trial> {
    trials
        .iter()
        .copied()
        .filter(|t| t.error <= 0.0)
        .min_by(lower_quality)
        .or_else(|| trials.iter().copied().min_by(closer))
}

#[derive(Debug, Clone)]
pub struct QualitySearch {
    config: SearchConfig,
    calculator: SsimCalculator,
}

impl Default for QualitySearch {
    fn default() -> Self {
        Self {
            config: SearchConfig::default(),
            calculator: SsimCalculator::default(),
        }
    }
}

impl QualitySearch {
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let calculator =
            SsimCalculator::new(config.window).map_err(|_| ConfigError::InvalidWindow)?;
        Ok(Self { config, calculator })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches for the quality at which `encoder`'s re-encode of `original`
    /// scores `target`.
    pub fn find_optimal_quality<E: TrialEncoder + ?Sized>(
        &self,
        original: &DynamicImage,
        target: TargetSsim,
        encoder: &E,
    ) -> Result<SearchOutcome, SearchError> {
        // An image that cannot form a window fails on the first trial anyway.
        self.calculator.check_dimensions(original, original)?;

        self.search_with(target, |quality| {
            let trial = encoder
                .encode_trial(original, quality)
                .map_err(|source| SearchError::Encode { quality, source })?;
            Ok(self.calculator.score(original, &trial)?)
        })
    }

    /// Runs the search against an arbitrary quality → SSIM objective.
    pub fn search_with<F>(&self, target: TargetSsim, mut evaluate: F) -> Result<SearchOutcome, SearchError>
    where
        F: FnMut(f64) -> Result<Ssim, SearchError>,
    {
        let mut state = SearchState::new(&self.config);
        let mut budget = SearchBudget::new(self.config.max_iterations, self.config.min_step);
        let mut trials: Vec<Trial> = Vec::new();

        loop {
            let quality = state.quality;
            let score = evaluate(quality)?;
            let error = target.error_of(score);
            let trial = Trial {
                quality,
                score,
                error,
            };
            trials.push(trial);

            let crossed = state.observe(error);
            debug!(
                iteration = trials.len(),
                quality,
                ssim = score.value(),
                error,
                next_step = state.step,
                crossed,
                "quality trial"
            );

            if error.abs() <= self.config.tolerance {
                info!(
                    quality,
                    ssim = score.value(),
                    target = target.value(),
                    iterations = trials.len(),
                    "quality search converged"
                );
                return Ok(SearchOutcome {
                    quality,
                    score,
                    error,
                    iterations: trials.len(),
                    status: SearchStatus::Converged,
                    trials,
                });
            }

            if let Err(reason) = budget.spend(state.step) {
                let best = fallback_trial(&trials).unwrap_or(trial);
                warn!(
                    quality = best.quality,
                    ssim = best.score.value(),
                    target = target.value(),
                    iterations = trials.len(),
                    %reason,
                    "target unreachable within tolerance, returning best trial"
                );
                return Ok(SearchOutcome {
                    quality: best.quality,
                    score: best.score,
                    error: best.error,
                    iterations: trials.len(),
                    status: SearchStatus::Approximate(reason),
                    trials,
                });
            }
        }
    }
}

/// Default search with an in-memory JPEG trial encoder.
pub fn find_optimal_quality(
    original: &DynamicImage,
    target: TargetSsim,
) -> Result<SearchOutcome, SearchError> {
    QualitySearch::default().find_optimal_quality(original, target, &JpegTrialEncoder::in_memory())
}
