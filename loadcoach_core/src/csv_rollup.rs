//! CSV rollup for archiving logged sets.
//!
//! Moves the live set log into the CSV archive without risking data loss:
//! the WAL stays locked against appends until the CSV is synced and the
//! WAL is renamed away.

use crate::wal::{parse_sets, WalLock};
use crate::{Result, SetRecord};
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A row in the CSV archive
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct CsvRow {
    pub id: String,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub proximity_to_failure: i32,
    pub recorded_at: String,
    pub rest_seconds: Option<u32>,
    pub body_weight: Option<f64>,
}

impl From<&SetRecord> for CsvRow {
    fn from(set: &SetRecord) -> Self {
        CsvRow {
            id: set.id.to_string(),
            exercise: set.exercise.clone(),
            weight: set.weight,
            reps: set.reps,
            proximity_to_failure: set.proximity_to_failure,
            recorded_at: set.recorded_at.to_rfc3339(),
            rest_seconds: set.rest_seconds,
            body_weight: set.body_weight,
        }
    }
}

/// Roll up WAL sets into CSV and archive the WAL atomically
///
/// 1. Takes the WAL's exclusive lock, so no set can be appended meanwhile
/// 2. Reads all sets from the WAL
/// 3. Appends them to the CSV file (writing headers if it is new)
/// 4. Syncs the CSV to disk
/// 5. Renames the WAL to a unique `<name>.<timestamp>.processed`
///
/// Returns the number of sets archived. The WAL is renamed rather than
/// deleted so it can be recovered by hand; earlier archives are never
/// overwritten.
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let _lock = WalLock::exclusive(wal_path)?;

    let file = match File::open(wal_path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No WAL at {:?} to roll up", wal_path);
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };
    let sets = parse_sets(BufReader::new(file))?;

    if sets.is_empty() {
        tracing::info!("No sets in WAL to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for set in &sets {
        writer.serialize(CsvRow::from(set))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sets to CSV", sets.len());

    let processed_path = processed_path(wal_path);
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(sets.len())
}

/// First free `<wal name>.<timestamp>[.n].processed` path next to the WAL
fn processed_path(wal_path: &Path) -> PathBuf {
    let name = wal_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sets.wal".to_string());
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6f");

    let mut candidate = wal_path.with_file_name(format!("{}.{}.processed", name, stamp));
    let mut n = 1;
    while candidate.exists() {
        candidate = wal_path.with_file_name(format!("{}.{}.{}.processed", name, stamp, n));
        n += 1;
    }
    candidate
}

/// Remove all `.processed` WAL files in the given directory
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed WAL: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}
