//! # Share Protocol
//!
//! Exports the whole inventory as a compact, URL-safe string and imports it
//! back.
//!
//! ## Encoding
//!
//! ```text
//! Snapshot ──serde_json──▶ JSON array ──gzip (optional)──▶ bytes ──base64url──▶ transport
//! ```
//!
//! The transport string is carried in a link as `?data=<transport>`, with
//! `&compressed=true` appended when gzip was used.
//!
//! ## Importing
//!
//! Decoding yields a [`StagedImport`]. Nothing changes until
//! [`StagedImport::confirm`] replaces the inventory; a malformed payload is a
//! [`DecodeError`] and never produces records.
//!
//! ## Key Types
//!
//! - [`ShareLink`] - Transport string plus compression flag
//! - [`StagedImport`] - Decoded snapshot waiting for confirmation

pub mod base64url;
mod codec;
mod import;
mod link;

pub use codec::{decode, encode, parse_snapshot, DecodeError, EncodeError};
pub use import::{ImportReport, StagedImport};
pub use link::{build_share_link, strip_share_params, LinkError, ShareLink, COMPRESSED_PARAM, DATA_PARAM};
