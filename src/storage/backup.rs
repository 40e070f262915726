//! JSON backup files
//!
//! A backup is the snapshot written as a pretty-printed JSON array, the same
//! shape the share protocol carries.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{Record, Snapshot};
use crate::share::parse_snapshot;

/// Writes `records` to `path` as a JSON array
pub fn write_backup(path: &Path, records: &[Record]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize inventory")?;
    fs::write(path, json).with_context(|| format!("Failed to write backup: {}", path.display()))
}

/// Reads and validates a backup file
pub fn read_backup(path: &Path) -> Result<Snapshot> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read backup: {}", path.display()))?;
    parse_snapshot(&bytes).with_context(|| format!("Invalid backup file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordFields, RecordId};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn backup_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        let records = vec![Record::new(
            RecordId::generate("Dipirona", Utc::now()),
            "user_main",
            RecordFields::named("Dipirona"),
        )
        .unwrap()];

        write_backup(&path, &records).unwrap();

        assert_eq!(read_backup(&path).unwrap(), records);
    }

    #[test]
    fn object_backup_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        fs::write(&path, r#"{"medications": []}"#).unwrap();

        let err = read_backup(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("must be a list"));
    }
}
