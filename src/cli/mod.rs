//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init`, `actors` |
//! | Records | Inventory management | `add`, `edit`, `remove`, `show`, `list` |
//! | Queries | Dashboard and reports | `status`, `report` |
//! | Transfer | Moving the inventory around | `share`, `import`, `backup`, `restore` |
//! | Suggestions | Plugin-backed helpers | `extract`, `explain`, `add --suggest` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Acting User
//!
//! Commands act as the configured `current_actor`, or the main actor.
//! Use `--as <actor-id>` to act as someone else:
//! ```bash
//! medstock --as user_authorized_1 edit m-1a2b3c4d5e6f --quantity 3
//! ```
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! medstock --verbose status
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod query;
mod record;
mod report;
mod session;
mod share;
mod suggest_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use report::{format_pmc, render_report, ReportColumn, DEFAULT_COLUMNS};
