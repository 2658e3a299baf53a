//! Type-Safe Wrappers Module
//!
//! - `ssim`: measured SSIM score and target SSIM
//! - `quality`: JPEG quality accepted by the encoder
//! - `budget`: trial and step limits for bounded searches

pub mod budget;
pub mod quality;
pub mod ssim;

pub use budget::{BudgetExhausted, SearchBudget};
pub use quality::{JpegQuality, QualityError, JPEG_QUALITY_MAX, JPEG_QUALITY_MIN};
pub use ssim::{Ssim, SsimError, TargetSsim, DEFAULT_TARGET_SSIM, SSIM_EPSILON};

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn ssim_validation_property(value in -2.0f64..2.0f64) {
            let result = Ssim::new(value);
            let in_range = (0.0..=1.0).contains(&value);
            prop_assert_eq!(result.is_ok(), in_range);
        }

        #[test]
        fn target_validation_property(value in -2.0f64..2.0f64) {
            let result = TargetSsim::new(value);
            let in_range = value > 0.0 && value < 1.0;
            prop_assert_eq!(result.is_ok(), in_range);
        }

        #[test]
        fn clamped_ssim_is_always_valid(value in proptest::num::f64::ANY) {
            let clamped = Ssim::clamped(value);
            prop_assert!(Ssim::new(clamped.value()).is_ok());
        }

        #[test]
        fn jpeg_quality_accepts_iff_rounded_in_range(candidate in -50.0f64..150.0f64) {
            let rounded = candidate.round();
            let in_range = (1.0..=100.0).contains(&rounded);
            let result = JpegQuality::from_candidate(candidate);
            prop_assert_eq!(result.is_ok(), in_range);
            if let Ok(q) = result {
                prop_assert!((q.value() as f64 - candidate).abs() <= 0.5);
            }
        }

        #[test]
        fn budget_allows_exactly_max_trials(max in 1u32..200, step in 0.01f64..10.0) {
            let mut budget = SearchBudget::new(max, 0.01);
            for spent in 1..max {
                prop_assert_eq!(budget.spend(step), Ok(spent));
            }
            prop_assert_eq!(budget.spend(step), Err(BudgetExhausted::IterationLimit { max }));
        }
    }
}
