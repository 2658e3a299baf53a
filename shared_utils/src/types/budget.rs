//! Search budget: how many trials a quality search may spend, and how small
//! its step may get, before it has to settle for the closest trial.

use std::fmt;

/// Default trial cap for one quality search.
pub const NORMAL_MAX_ITERATIONS: u32 = 100;

/// No budget may allow more trials than this.
pub const EMERGENCY_MAX_ITERATIONS: u32 = 500;

/// Default step floor; below it further reversals cannot change a rounded quality.
pub const DEFAULT_MIN_STEP: f64 = 0.01;

/// Why a search stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BudgetExhausted {
    IterationLimit { max: u32 },
    StepExhausted { step: f64 },
}

impl fmt::Display for BudgetExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetExhausted::IterationLimit { max } => {
                write!(f, "iteration limit of {} trials reached", max)
            }
            BudgetExhausted::StepExhausted { step } => {
                write!(f, "step shrank to {:.4}", step.abs())
            }
        }
    }
}

impl std::error::Error for BudgetExhausted {}

#[derive(Debug, Clone)]
pub struct SearchBudget {
    trials: u32,
    max_trials: u32,
    min_step: f64,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::new(NORMAL_MAX_ITERATIONS, DEFAULT_MIN_STEP)
    }
}

impl SearchBudget {
    /// `max_trials` is kept within `1..=EMERGENCY_MAX_ITERATIONS`.
    pub fn new(max_trials: u32, min_step: f64) -> Self {
        Self {
            trials: 0,
            max_trials: max_trials.clamp(1, EMERGENCY_MAX_ITERATIONS),
            min_step: min_step.abs(),
        }
    }

    /// Charges one finished trial that did not converge. `next_step` is the
    /// step the search would take next.
    pub fn spend(&mut self, next_step: f64) -> Result<u32, BudgetExhausted> {
        self.trials += 1;
        if next_step.abs() < self.min_step {
            return Err(BudgetExhausted::StepExhausted { step: next_step });
        }
        if self.trials >= self.max_trials {
            return Err(BudgetExhausted::IterationLimit {
                max: self.max_trials,
            });
        }
        Ok(self.trials)
    }

    #[inline]
    pub fn trials(&self) -> u32 {
        self.trials
    }

    #[inline]
    pub fn max_trials(&self) -> u32 {
        self.max_trials
    }

    #[inline]
    pub fn min_step(&self) -> f64 {
        self.min_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_limit() {
        let mut budget = SearchBudget::new(3, 0.01);
        assert_eq!(budget.spend(3.0), Ok(1));
        assert_eq!(budget.spend(3.0), Ok(2));
        assert_eq!(
            budget.spend(3.0),
            Err(BudgetExhausted::IterationLimit { max: 3 })
        );
        assert_eq!(budget.trials(), 3);
    }

    #[test]
    fn test_step_floor_wins_over_trial_limit() {
        let mut budget = SearchBudget::new(1, 0.01);
        assert_eq!(
            budget.spend(-0.005),
            Err(BudgetExhausted::StepExhausted { step: -0.005 })
        );
    }

    #[test]
    fn test_limits_are_clamped() {
        assert_eq!(SearchBudget::new(10_000, 0.01).max_trials(), EMERGENCY_MAX_ITERATIONS);
        assert_eq!(SearchBudget::new(0, 0.01).max_trials(), 1);
        assert_eq!(SearchBudget::new(5, -0.5).min_step(), 0.5);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BudgetExhausted::IterationLimit { max: 100 }.to_string(),
            "iteration limit of 100 trials reached"
        );
        assert_eq!(
            BudgetExhausted::StepExhausted { step: -0.00586 }.to_string(),
            "step shrank to 0.0059"
        );
    }
}
