//! First-session load seeds for exercises with no logged history.
//!
//! Exercise names are classified by case-insensitive keyword match against
//! an ordered table of movement patterns (first match wins). Compound lifts
//! seed from a fraction of body weight; machine and isolation movements seed
//! from a fixed load. The seed is a deterministic starting point, not an
//! accurate estimate.

use crate::suggest::{round_to_increment, RATIONALE_BAD_INCREMENT};
use crate::SuggestionResult;
use once_cell::sync::Lazy;

/// Body weight assumed when none is known (kg)
pub const DEFAULT_BODY_WEIGHT: f64 = 70.0;

/// Target reps assumed for a first session
pub const DEFAULT_COLD_START_REPS: u32 = 8;

/// Load seeded for exercises matching no pattern (kg)
pub const FALLBACK_LOAD: f64 = 20.0;

/// Movement pattern an exercise name is classified into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementPattern {
    Squat,
    Hinge,
    HorizontalPress,
    VerticalPress,
    PullUp,
    BarbellRow,
    DumbbellRow,
    LegPress,
    KneeExtension,
    LegCurl,
    Pulldown,
    Fly,
    Biceps,
    Triceps,
}

impl MovementPattern {
    pub fn label(self) -> &'static str {
        match self {
            MovementPattern::Squat => "squat pattern",
            MovementPattern::Hinge => "hinge pattern",
            MovementPattern::HorizontalPress => "horizontal press",
            MovementPattern::VerticalPress => "vertical press",
            MovementPattern::PullUp => "pull-up",
            MovementPattern::BarbellRow => "barbell row",
            MovementPattern::DumbbellRow => "dumbbell row",
            MovementPattern::LegPress => "leg press",
            MovementPattern::KneeExtension => "knee extension",
            MovementPattern::LegCurl => "leg curl",
            MovementPattern::Pulldown => "pulldown",
            MovementPattern::Fly => "fly",
            MovementPattern::Biceps => "biceps isolation",
            MovementPattern::Triceps => "triceps isolation",
        }
    }
}

/// How a pattern's starting load is derived
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BaseLoad {
    /// Multiple of the lifter's body weight
    BodyWeight(f64),
    /// Absolute load in kg, independent of body weight
    Fixed(f64),
}

impl BaseLoad {
    pub fn resolve(self, body_weight: f64) -> f64 {
        match self {
            BaseLoad::BodyWeight(ratio) => ratio * body_weight,
            BaseLoad::Fixed(load) => load,
        }
    }
}

/// One row of the classification table
#[derive(Clone, Debug)]
pub struct PatternRule {
    pub pattern: MovementPattern,
    pub keywords: &'static [&'static str],
    pub base: BaseLoad,
}

/// Classification table, built once. Order matters: earlier rules shadow
/// later ones (e.g. "jalón triceps" is a pulldown).
static PATTERN_RULES: Lazy<Vec<PatternRule>> = Lazy::new(build_pattern_rules);

/// Get the cached classification table
pub fn pattern_rules() -> &'static [PatternRule] {
    &PATTERN_RULES
}

fn build_pattern_rules() -> Vec<PatternRule> {
    use BaseLoad::{BodyWeight, Fixed};
    use MovementPattern::*;

    vec![
        PatternRule {
            pattern: Squat,
            keywords: &["sentadilla", "squat"],
            base: BodyWeight(0.7),
        },
        PatternRule {
            pattern: Hinge,
            keywords: &["peso muerto", "deadlift", "hip hinge"],
            base: BodyWeight(0.9),
        },
        PatternRule {
            pattern: HorizontalPress,
            keywords: &["press banca", "bench", "press de banca"],
            base: BodyWeight(0.6),
        },
        PatternRule {
            pattern: VerticalPress,
            keywords: &["press militar", "overhead", "hombro barra"],
            base: BodyWeight(0.35),
        },
        // Assisted/weighted variants are too varied to seed; start unloaded
        PatternRule {
            pattern: PullUp,
            keywords: &["dominada", "pull-up", "chin-up"],
            base: Fixed(0.0),
        },
        PatternRule {
            pattern: BarbellRow,
            keywords: &["remo barra", "barbell row"],
            base: BodyWeight(0.5),
        },
        PatternRule {
            pattern: DumbbellRow,
            keywords: &["remo mancuernas", "dumbbell row"],
            base: Fixed(24.0),
        },
        PatternRule {
            pattern: LegPress,
            keywords: &["prensa", "leg press"],
            base: BodyWeight(1.5),
        },
        PatternRule {
            pattern: KneeExtension,
            keywords: &["extensión cuádriceps", "maquina cuadriceps", "leg extension"],
            base: Fixed(25.0),
        },
        PatternRule {
            pattern: LegCurl,
            keywords: &["curl femoral", "leg curl"],
            base: Fixed(25.0),
        },
        PatternRule {
            pattern: Pulldown,
            keywords: &["jalón", "lat pulldown"],
            base: Fixed(35.0),
        },
        PatternRule {
            pattern: Fly,
            keywords: &["aperturas", "fly", "cruce", "crossover"],
            base: Fixed(16.0),
        },
        PatternRule {
            pattern: Biceps,
            keywords: &["biceps", "curl", "martillo"],
            base: Fixed(16.0),
        },
        PatternRule {
            pattern: Triceps,
            keywords: &["triceps", "press francés", "jalón triceps"],
            base: Fixed(20.0),
        },
    ]
}

/// Find the first rule whose keyword appears in the exercise name
pub fn classify(exercise_name: &str) -> Option<&'static PatternRule> {
    let name = exercise_name.to_lowercase();
    pattern_rules()
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| name.contains(k)))
}

/// Scale factor for the planned rep target. Exactly one factor applies.
pub fn rep_target_factor(target_reps: u32) -> f64 {
    if target_reps >= 12 {
        0.85
    } else if target_reps >= 10 {
        0.90
    } else if target_reps <= 6 {
        1.05
    } else {
        1.0
    }
}

/// Seed a first-session load from body weight and exercise name
///
/// A non-positive or non-finite body weight is replaced by
/// [`DEFAULT_BODY_WEIGHT`]. The rationale names the matched pattern.
pub fn suggest_cold_start(
    body_weight: f64,
    exercise_name: &str,
    target_reps: u32,
    micro_increment: f64,
) -> SuggestionResult {
    let body_weight = if body_weight.is_finite() && body_weight > 0.0 {
        body_weight
    } else {
        tracing::debug!(
            "Unusable body weight {}, assuming {} kg",
            body_weight,
            DEFAULT_BODY_WEIGHT
        );
        DEFAULT_BODY_WEIGHT
    };

    let (base, note) = match classify(exercise_name) {
        Some(rule) => (
            rule.base.resolve(body_weight),
            format!("Cold start seed ({})", rule.pattern.label()),
        ),
        None => (
            FALLBACK_LOAD,
            "Cold start seed (unrecognised exercise, conservative default)".to_string(),
        ),
    };

    let seeded = base * rep_target_factor(target_reps);
    tracing::debug!(
        "Cold start for {:?}: base {:.2}, scaled {:.2}",
        exercise_name,
        base,
        seeded
    );

    match round_to_increment(seeded, micro_increment) {
        Some(load) => SuggestionResult::load_with_note(load, note),
        None => SuggestionResult::none(RATIONALE_BAD_INCREMENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(body_weight: f64, name: &str, reps: u32) -> f64 {
        suggest_cold_start(body_weight, name, reps, 2.5)
            .suggested_load
            .expect("expected a cold start load")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_sentadilla_at_80kg() {
        // 0.7 * 80 = 56.0, rounds down to 55.0
        assert_close(load(80.0, "Sentadilla", DEFAULT_COLD_START_REPS), 55.0);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(classify("BACK SQUAT").unwrap().pattern, MovementPattern::Squat);
        assert_eq!(classify("Peso Muerto Rumano").unwrap().pattern, MovementPattern::Hinge);
        assert_eq!(
            classify("EXTENSIÓN CUÁDRICEPS").unwrap().pattern,
            MovementPattern::KneeExtension
        );
        assert!(classify("Farmer carry").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // Both "jalón" and "jalón triceps" match; pulldown comes first
        assert_eq!(classify("Jalón triceps").unwrap().pattern, MovementPattern::Pulldown);
        // "leg curl" is a leg curl, not a biceps curl
        assert_eq!(classify("Leg curl").unwrap().pattern, MovementPattern::LegCurl);
        assert_eq!(classify("Hammer curl").unwrap().pattern, MovementPattern::Biceps);
    }

    #[test]
    fn test_body_weight_and_fixed_bases() {
        // 0.6 * 100 = 60
        assert_close(load(100.0, "Bench press", 8), 60.0);
        // 1.5 * 70 = 105
        assert_close(load(70.0, "Prensa", 8), 105.0);
        // Fixed loads ignore body weight
        assert_close(load(60.0, "Lat pulldown", 8), 35.0);
        assert_close(load(120.0, "Lat pulldown", 8), 35.0);
        // 24 kg dumbbell pair
        assert_close(load(80.0, "Dumbbell row", 8), 25.0);
    }

    #[test]
    fn test_pull_up_starts_at_body_weight() {
        let result = suggest_cold_start(80.0, "Dominadas", 8, 2.5);
        assert_close(result.suggested_load.unwrap(), 0.0);
        assert!(result.rationale.unwrap().contains("pull-up"));
    }

    #[test]
    fn test_unknown_exercise_uses_fallback() {
        let result = suggest_cold_start(80.0, "Sled push", 8, 2.5);
        assert_close(result.suggested_load.unwrap(), FALLBACK_LOAD);
        assert!(result.rationale.is_some());
    }

    #[test]
    fn test_rep_target_scaling_applies_once() {
        assert_close(rep_target_factor(8), 1.0);
        assert_close(rep_target_factor(7), 1.0);
        assert_close(rep_target_factor(6), 1.05);
        assert_close(rep_target_factor(10), 0.90);
        assert_close(rep_target_factor(11), 0.90);
        assert_close(rep_target_factor(12), 0.85);
        assert_close(rep_target_factor(15), 0.85);
    }

    #[test]
    fn test_rep_targets_change_the_seed() {
        // 0.9 * 100 = 90: x1.05 = 94.5 -> 95.0, x0.9 = 81 -> 80.0, x0.85 = 76.5 -> 77.5
        assert_close(load(100.0, "Deadlift", 5), 95.0);
        assert_close(load(100.0, "Deadlift", 10), 80.0);
        assert_close(load(100.0, "Deadlift", 12), 77.5);
    }

    #[test]
    fn test_bad_body_weight_falls_back_to_default() {
        let expected = load(DEFAULT_BODY_WEIGHT, "Squat", 8);
        assert_close(load(0.0, "Squat", 8), expected);
        assert_close(load(-5.0, "Squat", 8), expected);
        assert_close(load(f64::NAN, "Squat", 8), expected);
    }

    #[test]
    fn test_bad_increment_reports_rationale() {
        let result = suggest_cold_start(80.0, "Squat", 8, 0.0);
        assert!(result.suggested_load.is_none());
        assert!(result.rationale.is_some());
    }

    #[test]
    fn test_idempotent() {
        let a = suggest_cold_start(72.5, "Overhead press", 10, 1.25);
        let b = suggest_cold_start(72.5, "Overhead press", 10, 1.25);
        assert_eq!(a, b);
    }
}
