//! medstock - A local-first medication inventory
//!
//! Tracks medications with their expiration dates, prices and owners,
//! classifies them by how soon they expire, and moves whole inventories
//! between people through compact share links.

pub mod cli;
pub mod domain;
pub mod share;
pub mod storage;
pub mod suggest;

pub use domain::{Actor, ActorRegistry, ExpiryStatus, Inventory, Record, RecordId, Snapshot};
