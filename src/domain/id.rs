//! Record identifiers
//!
//! ID Format:
//! - Generated IDs: `m-{12-char-hash}` (e.g., `m-7f2b4c19a0de`)
//! - Imported IDs: any non-empty string, kept verbatim
//!
//! The hash is derived from the record name, the creation timestamp and a
//! process-wide counter, so two records created in the same nanosecond with
//! the same name still get different IDs.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const HASH_LEN: usize = 12;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Record ID cannot be empty")]
    Empty,
}

/// Generates a 12-character hash from name, timestamp and sequence
fn generate_hash(name: &str, timestamp: DateTime<Utc>, sequence: u64) -> String {
    let input = format!(
        "{}{}{}",
        name,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        sequence
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..HASH_LEN].to_string()
}

/// Opaque record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new ID for a record with the given name
    pub fn generate(name: &str, timestamp: DateTime<Utc>) -> Self {
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("m-{}", generate_hash(name, timestamp, sequence)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this ID was minted by [`RecordId::generate`]
    pub fn is_generated(&self) -> bool {
        self.0
            .strip_prefix("m-")
            .map(|h| h.len() == HASH_LEN && h.chars().all(|c| c.is_ascii_hexdigit()))
            .unwrap_or(false)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for RecordId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}
