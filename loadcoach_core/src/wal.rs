//! Write-Ahead Log (WAL) for logged sets.
//!
//! Sets are appended to a JSONL (JSON Lines) file. Writers and the rollup
//! serialize on a sidecar lock file next to the WAL, which stays put when
//! the WAL itself is renamed away.

use crate::{Result, SetRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Set sink trait for persisting sets
pub trait SetSink {
    fn append(&mut self, set: &SetRecord) -> Result<()>;
}

/// Advisory lock guarding one WAL path, released on drop
pub(crate) struct WalLock {
    file: File,
}

impl WalLock {
    /// Lock for appending to or archiving the WAL
    pub(crate) fn exclusive(wal_path: &Path) -> Result<Self> {
        let file = Self::open(wal_path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    /// Lock for reading the WAL
    pub(crate) fn shared(wal_path: &Path) -> Result<Self> {
        let file = Self::open(wal_path)?;
        file.lock_shared()?;
        Ok(Self { file })
    }

    fn open(wal_path: &Path) -> Result<File> {
        if let Some(parent) = wal_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path(wal_path))?;
        Ok(file)
    }
}

impl Drop for WalLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Lock file used for a WAL, e.g. `sets.lock` for `sets.wal`
pub fn lock_path(wal_path: &Path) -> PathBuf {
    wal_path.with_extension("lock")
}

/// JSONL-based set sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SetSink for JsonlSink {
    fn append(&mut self, set: &SetRecord) -> Result<()> {
        // Serialize before writing so a failure never leaves a partial line
        let mut line = serde_json::to_string(set)?;
        line.push('\n');

        let _lock = WalLock::exclusive(&self.path)?;

        // Opened under the lock so a concurrent rollup cannot rename it away
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // Terminate a line left unfinished by a crashed writer
        if ends_mid_line(&file)? {
            tracing::warn!("WAL {:?} ends mid-line, starting a new line", self.path);
            line.insert(0, '\n');
        }

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;

        tracing::debug!("Appended set {} ({}) to WAL", set.id, set.exercise);
        Ok(())
    }
}

fn ends_mid_line(mut file: &File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read all sets from a WAL file
///
/// Lines that fail to parse (e.g. a partial write, even one cut inside a
/// multi-byte character) are skipped with a warning.
pub fn read_sets(path: &Path) -> Result<Vec<SetRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let _lock = WalLock::shared(path)?;
    let sets = match File::open(path) {
        Ok(file) => parse_sets(BufReader::new(file))?,
        // Archived by a rollup between the check and the lock
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    tracing::debug!("Read {} sets from WAL", sets.len());
    Ok(sets)
}

/// Parse JSONL sets from raw bytes, skipping lines that are not valid sets
pub(crate) fn parse_sets(reader: impl BufRead) -> Result<Vec<SetRecord>> {
    let mut sets = Vec::new();

    for (line_num, line_result) in reader.split(b'\n').enumerate() {
        let line = line_result?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<SetRecord>(&line) {
            Ok(set) => sets.push(set),
            Err(e) => {
                tracing::warn!("Failed to parse set at line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_single_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sets.wal");

        let set = SetRecord::new("Squat", 100.0, 5).with_proximity_to_failure(1);
        let set_id = set.id;

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&set).unwrap();

        let sets = read_sets(&wal_path).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id, set_id);
        assert_eq!(sets[0].proximity_to_failure, 1);
    }

    #[test]
    fn test_append_multiple_sets() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nested").join("sets.wal");

        let mut sink = JsonlSink::new(&wal_path);
        for i in 0..5 {
            sink.append(&SetRecord::new("Bench", 60.0 + i as f64, 8))
                .unwrap();
        }

        let sets = read_sets(&wal_path).unwrap();
        assert_eq!(sets.len(), 5);
    }

    #[test]
    fn test_read_missing_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nonexistent.wal");

        let sets = read_sets(&wal_path).unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sets.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&SetRecord::new("Squat", 100.0, 5)).unwrap();

        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        writeln!(file, "{{ not json").unwrap();
        writeln!(file).unwrap();
        drop(file);

        sink.append(&SetRecord::new("Squat", 102.5, 5)).unwrap();

        let sets = read_sets(&wal_path).unwrap();
        assert_eq!(sets.len(), 2);
    }

    #[test]
    fn test_append_after_partial_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sets.wal");

        std::fs::write(&wal_path, r#"{"id":"00000000-0000-0000-0000-0000"#).unwrap();

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&SetRecord::new("Squat", 100.0, 5)).unwrap();

        let sets = read_sets(&wal_path).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].weight, 100.0);
    }

    #[test]
    fn test_torn_multibyte_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sets.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&SetRecord::new("Extensión cuádriceps", 40.0, 10))
            .unwrap();

        // Cut after the first byte of the two-byte 'ó'
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(b"{\"id\":\"00000000-0000-0000-0000-000000000009\",\"exercise\":\"Extensi\xC3")
            .unwrap();
        drop(file);

        sink.append(&SetRecord::new("Extensión cuádriceps", 42.5, 10))
            .unwrap();

        let sets = read_sets(&wal_path).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].weight, 40.0);
        assert_eq!(sets[1].weight, 42.5);
    }

    #[test]
    fn test_lock_file_sits_next_to_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("wal").join("sets.wal");

        JsonlSink::new(&wal_path)
            .append(&SetRecord::new("Squat", 100.0, 5))
            .unwrap();

        assert_eq!(lock_path(&wal_path), temp_dir.path().join("wal").join("sets.lock"));
        assert!(lock_path(&wal_path).exists());
    }
}
