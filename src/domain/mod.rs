//! Domain models for medstock
//!
//! Contains the core inventory logic without any I/O concerns.

mod actor;
mod expiry;
mod id;
mod inventory;
mod query;
mod record;

pub use actor::{can_mutate, Actor, ActorError, ActorRegistry, Role};
pub use expiry::{
    classify, classify_str, format_display_date, parse_date_input, parse_iso_date, today,
    ExpiryStatus,
};
pub use id::{IdError, RecordId};
pub use inventory::{Inventory, Snapshot};
pub use query::{matches, search, sort_by_expiration, summarize, Summary, LOW_STOCK_THRESHOLD};
pub(crate) use record::de as lenient;
pub use record::{normalize_text, Record, RecordFields, RecordPatch, ValidationError, DEFAULT_QUANTITY};
