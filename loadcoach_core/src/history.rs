//! Exercise history loading.
//!
//! This module gathers the recent sets of one exercise from both the WAL
//! and the CSV archive, to feed the suggestion engine.

use crate::csv_rollup::CsvRow;
use crate::{Error, Result, SetRecord};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// How many sets are read back per exercise unless configured otherwise
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

impl TryFrom<CsvRow> for SetRecord {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;

        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(SetRecord {
            id,
            exercise: row.exercise,
            weight: row.weight,
            reps: row.reps,
            proximity_to_failure: row.proximity_to_failure,
            recorded_at,
            rest_seconds: row.rest_seconds,
            body_weight: row.body_weight,
        })
    }
}

/// Load the most recent sets of one exercise from both WAL and CSV
///
/// Exercise names match case-insensitively after trimming. Sets that appear
/// in both files are returned once. The result is sorted newest first and
/// holds at most `limit` sets.
pub fn load_exercise_history(
    wal_path: &Path,
    csv_path: &Path,
    exercise: &str,
    limit: usize,
) -> Result<Vec<SetRecord>> {
    let mut sets = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        for set in crate::wal::read_sets(wal_path)? {
            if set.matches_exercise(exercise) && seen_ids.insert(set.id) {
                sets.push(set);
            }
        }
        tracing::debug!("Loaded {} {:?} sets from WAL", sets.len(), exercise);
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for set in load_sets_from_csv(csv_path)? {
            if set.matches_exercise(exercise) && seen_ids.insert(set.id) {
                sets.push(set);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} {:?} sets from CSV", csv_count, exercise);
    }

    sets.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    sets.truncate(limit);

    tracing::info!("Loaded {} sets of {:?}", sets.len(), exercise);

    Ok(sets)
}

/// Load every set from both WAL and CSV, newest first
pub fn load_all_sets(wal_path: &Path, csv_path: &Path) -> Result<Vec<SetRecord>> {
    let mut sets = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        sets.extend(
            crate::wal::read_sets(wal_path)?
                .into_iter()
                .filter(|s| seen_ids.insert(s.id)),
        );
    }

    if csv_path.exists() {
        sets.extend(
            load_sets_from_csv(csv_path)?
                .into_iter()
                .filter(|s| seen_ids.insert(s.id)),
        );
    }

    sets.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    Ok(sets)
}

/// Load all sets from a CSV archive, skipping malformed rows
fn load_sets_from_csv(path: &Path) -> Result<Vec<SetRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut sets = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match SetRecord::try_from(row) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(sets)
}

/// Most recent body weight recorded alongside any set
pub fn latest_body_weight(sets: &[SetRecord]) -> Option<f64> {
    sets.iter()
        .filter_map(|s| s.body_weight.map(|bw| (s.recorded_at, bw)))
        .filter(|(_, bw)| bw.is_finite() && *bw > 0.0)
        .max_by_key(|(at, _)| *at)
        .map(|(_, bw)| bw)
}
