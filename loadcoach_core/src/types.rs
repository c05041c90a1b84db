//! Core domain types for the Loadcoach system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged sets (the history the suggestion engine reads)
//! - Target rep ranges
//! - Suggestion results and reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Set Records
// ============================================================================

/// Reps-in-reserve assumed when a set does not report one
pub const DEFAULT_PROXIMITY_TO_FAILURE: i32 = 2;

/// Rest period assumed when a set does not report one
pub const DEFAULT_REST_SECONDS: u32 = 120;

fn default_proximity_to_failure() -> i32 {
    DEFAULT_PROXIMITY_TO_FAILURE
}

/// A single performed set of one exercise
///
/// Missing `weight` or `reps` deserialize as zero, which makes the set
/// ineligible for suggestions rather than failing the whole read.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    pub id: Uuid,
    pub exercise: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default = "default_proximity_to_failure")]
    pub proximity_to_failure: i32,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub body_weight: Option<f64>,
}

impl SetRecord {
    /// Create a set recorded now, with default reps-in-reserve and rest
    pub fn new(exercise: impl Into<String>, weight: f64, reps: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise: exercise.into(),
            weight,
            reps,
            proximity_to_failure: DEFAULT_PROXIMITY_TO_FAILURE,
            recorded_at: Utc::now(),
            rest_seconds: Some(DEFAULT_REST_SECONDS),
            body_weight: None,
        }
    }

    pub fn with_proximity_to_failure(mut self, rir: i32) -> Self {
        self.proximity_to_failure = rir;
        self
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    pub fn with_body_weight(mut self, body_weight: Option<f64>) -> Self {
        self.body_weight = body_weight;
        self
    }

    /// A set counts towards a suggestion only with a positive weight and reps.
    /// NaN weights compare false and are excluded as well.
    pub fn is_eligible(&self) -> bool {
        self.weight > 0.0 && self.reps > 0
    }

    /// Whether this set belongs to the named exercise (trimmed, case-insensitive)
    pub fn matches_exercise(&self, exercise: &str) -> bool {
        normalize_exercise_name(&self.exercise) == normalize_exercise_name(exercise)
    }
}

/// Canonical form of an exercise name used for matching
pub fn normalize_exercise_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// Rep Range
// ============================================================================

/// Inclusive range of reps a suggestion should keep the lifter within
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepRange {
    pub low: u32,
    pub high: u32,
}

impl RepRange {
    /// Build a range, swapping the bounds if given in reverse order
    pub fn new(low: u32, high: u32) -> Self {
        if low <= high {
            Self { low, high }
        } else {
            Self {
                low: high,
                high: low,
            }
        }
    }
}

impl Default for RepRange {
    fn default() -> Self {
        Self { low: 5, high: 8 }
    }
}

// ============================================================================
// Suggestion Types
// ============================================================================

/// Outcome of a load suggestion
///
/// `suggested_load` is absent whenever no suggestion could be produced, and
/// `rationale` then says why. Cold-start results carry a note as well.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SuggestionResult {
    pub suggested_load: Option<f64>,
    pub rationale: Option<String>,
}

impl SuggestionResult {
    /// A load with no accompanying note
    pub fn load(load: f64) -> Self {
        Self {
            suggested_load: Some(load),
            rationale: None,
        }
    }

    /// A load with an explanatory note
    pub fn load_with_note(load: f64, note: impl Into<String>) -> Self {
        Self {
            suggested_load: Some(load),
            rationale: Some(note.into()),
        }
    }

    /// No load could be produced
    pub fn none(rationale: impl Into<String>) -> Self {
        Self {
            suggested_load: None,
            rationale: Some(rationale.into()),
        }
    }

    pub fn is_some(&self) -> bool {
        self.suggested_load.is_some()
    }
}

/// Which path produced a suggestion
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Estimated from logged sets
    History,
    /// Seeded from body weight and movement pattern
    ColdStart,
    /// Neither path produced a load
    None,
}

/// Full answer for one exercise, as shown to the lifter
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub exercise: String,
    pub suggested_load: Option<f64>,
    pub note: Option<String>,
    pub source: SuggestionSource,
    /// The sets the history path used (up to three, newest first)
    pub samples: Vec<SetRecord>,
}
