//! Snapshot transport encoding
//!
//! Pipeline: JSON array -> optional gzip -> URL-safe base64. The compressed
//! flag travels next to the payload, so decoding never has to guess.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use thiserror::Error;

use super::base64url;
use crate::domain::{Record, Snapshot};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to serialize inventory: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to compress inventory: {0}")]
    Compress(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Share data is empty")]
    Empty,

    #[error("Share data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Share data could not be decompressed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Share data is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Share data must be a list of records, got {0}")]
    NotAnArray(&'static str),

    #[error("Record {index} in share data is invalid: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Encodes a snapshot into a transport string
pub fn encode(snapshot: &[Record], compressed: bool) -> Result<String, EncodeError> {
    let json = serde_json::to_vec(snapshot)?;

    let bytes = if compressed {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&json)?;
        encoder.finish()?
    } else {
        json
    };

    Ok(base64url::encode(&bytes))
}

/// Decodes a transport string back into a snapshot.
///
/// Either the whole payload is valid or an error is returned; a partially
/// readable payload never yields records.
pub fn decode(transport: &str, compressed: bool) -> Result<Snapshot, DecodeError> {
    let transport = transport.trim();
    if transport.is_empty() {
        return Err(DecodeError::Empty);
    }

    let raw = base64url::decode(transport)?;

    let json = if compressed {
        let mut decoder = GzDecoder::new(raw.as_slice());
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(DecodeError::Decompress)?;
        out
    } else {
        raw
    };

    parse_snapshot(&json)
}

/// Parses serialized snapshot JSON, requiring a top-level array
pub fn parse_snapshot(json: &[u8]) -> Result<Snapshot, DecodeError> {
    let value: Value = serde_json::from_slice(json).map_err(DecodeError::Json)?;

    let items = match value {
        Value::Array(items) => items,
        other => return Err(DecodeError::NotAnArray(kind(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| DecodeError::InvalidRecord { index, source })
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
