//! Next-load suggestion from logged history.
//!
//! The estimate works in four steps:
//! 1. Keep only sets with a positive weight and reps, newest first, at most three
//! 2. Average their Epley one-rep-max estimates
//! 3. Aim at 75% of that average
//! 4. Nudge by ±2.5% based on how the most recent set went, then round to
//!    the smallest load step the lifter's equipment allows
//!
//! Rounding is to the nearest multiple of the increment with ties going up.

use crate::{RepRange, SetRecord, SuggestionResult};

/// Fraction of the estimated one-rep-max prescribed for the next session
pub const TARGET_INTENSITY: f64 = 0.75;

/// Relative load change applied after an easy or a grinding set
pub const ADJUSTMENT_STEP: f64 = 0.025;

/// Number of most recent eligible sets averaged into the estimate
pub const HISTORY_WINDOW: usize = 3;

/// Reps-in-reserve at or above which an over-range set counts as easy
pub const EASY_SET_RESERVE: i32 = 2;

/// Reps-in-reserve at or below which a set counts as taken to failure
pub const FAILURE_RESERVE: i32 = 0;

/// Default smallest load step (kg)
pub const DEFAULT_MICRO_INCREMENT: f64 = 2.5;

pub const RATIONALE_NO_HISTORY: &str = "No history for this exercise - run a baseline test first";
pub const RATIONALE_NO_USABLE_SETS: &str = "History has no sets with weight and reps";
pub const RATIONALE_NON_FINITE: &str = "History produced a non-finite load estimate";
pub const RATIONALE_BAD_INCREMENT: &str = "Load increment must be a positive number";

/// How the most recent set moves the proposed load
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Increase,
    Decrease,
    Hold,
}

impl Adjustment {
    /// Classify the most recent eligible set against the target range
    ///
    /// Over the range with reserve left → increase. Under the range, or at
    /// failure → decrease. The increase check wins when both could apply.
    pub fn for_set(set: &SetRecord, target: RepRange) -> Self {
        if set.reps > target.high && set.proximity_to_failure >= EASY_SET_RESERVE {
            Adjustment::Increase
        } else if set.reps < target.low || set.proximity_to_failure <= FAILURE_RESERVE {
            Adjustment::Decrease
        } else {
            Adjustment::Hold
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            Adjustment::Increase => 1.0 + ADJUSTMENT_STEP,
            Adjustment::Decrease => 1.0 - ADJUSTMENT_STEP,
            Adjustment::Hold => 1.0,
        }
    }
}

/// Estimated one-rep-max using the Epley formula
pub fn epley_e1rm(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + f64::from(reps) / 30.0)
}

/// Round `value` to the nearest multiple of `step`, ties away from zero
///
/// Returns None if either argument is non-finite, the step is not positive,
/// or the step is so small that the rounded value overflows.
pub fn round_to_increment(value: f64, step: f64) -> Option<f64> {
    if !value.is_finite() || !step.is_finite() || step <= 0.0 {
        return None;
    }
    let rounded = (value / step).round() * step;
    rounded.is_finite().then_some(rounded)
}

/// The eligible sets a suggestion is computed from, newest first
///
/// Sorting is stable, so sets sharing a timestamp keep their input order.
pub fn recent_eligible_sets(sets: &[SetRecord]) -> Vec<&SetRecord> {
    let mut eligible: Vec<&SetRecord> = sets.iter().filter(|s| s.is_eligible()).collect();
    eligible.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    eligible.truncate(HISTORY_WINDOW);
    eligible
}

/// Suggest the working load for the next session of one exercise
///
/// Never panics and never errors: empty or unusable history and degenerate
/// numbers come back as an absent load with a rationale.
pub fn suggest_from_history(
    sets: &[SetRecord],
    target: RepRange,
    micro_increment: f64,
) -> SuggestionResult {
    if sets.is_empty() {
        tracing::debug!("No sets supplied, cannot suggest from history");
        return SuggestionResult::none(RATIONALE_NO_HISTORY);
    }

    let recent = recent_eligible_sets(sets);
    let Some(latest) = recent.first() else {
        tracing::debug!("All {} sets are ineligible (zero weight or reps)", sets.len());
        return SuggestionResult::none(RATIONALE_NO_USABLE_SETS);
    };

    let base_e1rm =
        recent.iter().map(|s| epley_e1rm(s.weight, s.reps)).sum::<f64>() / recent.len() as f64;
    let adjustment = Adjustment::for_set(latest, target);
    let proposed = base_e1rm * TARGET_INTENSITY * adjustment.factor();

    tracing::debug!(
        "Suggestion from {} sets: base e1RM {:.2}, adjustment {:?}, proposed {:.2}",
        recent.len(),
        base_e1rm,
        adjustment,
        proposed
    );

    if !proposed.is_finite() {
        return SuggestionResult::none(RATIONALE_NON_FINITE);
    }

    match round_to_increment(proposed, micro_increment) {
        Some(load) => SuggestionResult::load(load),
        None => SuggestionResult::none(RATIONALE_BAD_INCREMENT),
    }
}
