//! # Storage Layer
//!
//! Persistence for medstock with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Inventory | JSONL (one record per line, in order) | `.medstock/inventory.jsonl` |
//! | Config | TOML | `.medstock/config.toml` |
//! | Backup | JSON array | anywhere |
//!
//! ## Concurrency Safety
//!
//! - [`SnapshotStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .medstock/
//! ├── inventory.jsonl       # The whole inventory snapshot
//! ├── config.toml           # Actors, share and suggestion settings
//! ├── plugins/              # Local suggestion plugins
//! └── .gitignore
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a medstock project
//! - [`SnapshotStore`] - Read/write the snapshot as JSONL
//! - [`Config`] - Project and global configuration

mod backup;
mod config;
mod project;
mod snapshot;

pub use backup::{read_backup, write_backup};
pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, ShareConfig, SuggestConfig,
    DEFAULT_SHARE_BASE_URL,
};
pub use project::{Project, ProjectError};
pub use snapshot::SnapshotStore;
