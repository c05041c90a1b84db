//! Combined next-load advice for one exercise.
//!
//! History is tried first. Only when it holds no usable sets does the
//! cold-start seed take over, using the best body weight available.

use crate::cold_start::suggest_cold_start;
use crate::config::SuggestionConfig;
use crate::profile::AthleteProfile;
use crate::suggest::{recent_eligible_sets, suggest_from_history};
use crate::{RepRange, Result, SetRecord, SuggestionReport, SuggestionSource};

/// Explicit parameters for one piece of advice
#[derive(Clone, Debug, PartialEq)]
pub struct SuggestionParams {
    pub target: RepRange,
    pub micro_increment: f64,
    pub cold_start_target_reps: u32,
}

impl From<&SuggestionConfig> for SuggestionParams {
    fn from(config: &SuggestionConfig) -> Self {
        Self {
            target: config.target_rep_range(),
            micro_increment: config.micro_increment,
            cold_start_target_reps: config.cold_start_target_reps,
        }
    }
}

impl Default for SuggestionParams {
    fn default() -> Self {
        Self::from(&SuggestionConfig::default())
    }
}

/// Pick the body weight for a cold start
///
/// Order: explicit value, profile, latest set that recorded one, default.
/// Non-positive or non-finite candidates are skipped.
pub fn resolve_body_weight(
    explicit: Option<f64>,
    profile: &AthleteProfile,
    logged_sets: &[SetRecord],
    default_kg: f64,
) -> f64 {
    let usable = |kg: &f64| kg.is_finite() && *kg > 0.0;

    explicit
        .filter(usable)
        .or_else(|| profile.body_weight_kg.filter(usable))
        .or_else(|| crate::history::latest_body_weight(logged_sets))
        .unwrap_or(default_kg)
}

/// Advise the next load for `exercise` from its history
///
/// `body_weight` is only called when falling back to a cold start, so
/// lookups behind it are skipped whenever history is usable.
pub fn advise<F>(
    exercise: &str,
    history: &[SetRecord],
    body_weight: F,
    params: &SuggestionParams,
) -> Result<SuggestionReport>
where
    F: FnOnce() -> Result<f64>,
{
    let samples: Vec<SetRecord> = recent_eligible_sets(history).into_iter().cloned().collect();

    if !samples.is_empty() {
        let result = suggest_from_history(history, params.target, params.micro_increment);
        let source = if result.is_some() {
            SuggestionSource::History
        } else {
            SuggestionSource::None
        };
        tracing::info!(
            "History suggestion for {:?}: {:?} ({} samples)",
            exercise,
            result.suggested_load,
            samples.len()
        );
        return Ok(SuggestionReport {
            exercise: exercise.to_string(),
            suggested_load: result.suggested_load,
            note: result.rationale,
            source,
            samples,
        });
    }

    tracing::info!(
        "No usable history for {:?} ({} sets), falling back to cold start",
        exercise,
        history.len()
    );

    let result = suggest_cold_start(
        body_weight()?,
        exercise,
        params.cold_start_target_reps,
        params.micro_increment,
    );
    let source = if result.is_some() {
        SuggestionSource::ColdStart
    } else {
        SuggestionSource::None
    };

    Ok(SuggestionReport {
        exercise: exercise.to_string(),
        suggested_load: result.suggested_load,
        note: result.rationale,
        source,
        samples,
    })
}
