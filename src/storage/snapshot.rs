//! JSONL storage for the inventory snapshot
//!
//! The snapshot is stored in `.medstock/inventory.jsonl` with one record per
//! line, in inventory order. Every save rewrites the whole file.
//! Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{Record, Snapshot};

/// Store for the inventory snapshot in JSONL format
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a new snapshot store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".medstock").join("inventory.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored snapshot; a missing file is an empty inventory
    pub fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open inventory: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on inventory")?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: Record = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse record at line {}", line_num + 1))?;

            records.push(record);
        }

        // Lock is released when file is dropped
        Ok(records)
    }

    /// Writes the whole snapshot (full rewrite, order preserved)
    pub fn save(&self, records: &[Record]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on inventory")?;

            let mut writer = BufWriter::new(&file);

            for record in records {
                let line = serde_json::to_string(record).context("Failed to serialize record")?;
                writeln!(writer, "{}", line).context("Failed to write record")?;
            }

            writer.flush().context("Failed to flush inventory")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!(path = %self.path.display(), records = records.len(), "saved inventory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordFields, RecordId};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn make_record(name: &str) -> Record {
        let fields = RecordFields {
            expiration_date: NaiveDate::from_ymd_opt(2027, 1, 31),
            ..RecordFields::named(name)
        };
        Record::new(RecordId::generate(name, Utc::now()), "user_main", fields).unwrap()
    }

    #[test]
    fn load_missing_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("inventory.jsonl"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_and_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("inventory.jsonl"));

        let records = vec![make_record("Zinco"), make_record("Amoxicilina"), make_record("Losartana")];
        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("inventory.jsonl"));

        store.save(&[make_record("A"), make_record("B")]).unwrap();
        store.save(&[make_record("C")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "C");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested").join("inventory.jsonl"));

        store.save(&[make_record("A")]).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("inventory.jsonl"));

        store.save(&[make_record("A")]).unwrap();

        // Temp file should not exist after write
        let temp_path = store.path().with_extension("jsonl.tmp");
        assert!(!temp_path.exists());
    }

    #[test]
    fn corrupt_line_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.jsonl");
        fs::write(&path, "{not json}\n").unwrap();

        let err = SnapshotStore::new(&path).load().unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }
}
