//! # Suggestion Plugins
//!
//! Optional assistance for filling in records: extraction of medications
//! from text or documents, and guesses for price, class, descriptive details
//! and mechanism of action.
//!
//! ## Protocol
//!
//! Suggestion plugins are separate binaries speaking JSON over stdin/stdout,
//! so any language (or any AI service wrapper) can implement one.
//!
//! ```text
//! CLI                              Plugin Binary
//!  │                                   │
//!  ├── Spawn: medstock-suggest-gemini  │
//!  │                                   │
//!  ├── Stdin: {"operation": "price", "params": {"name": "Dipirona"}}
//!  │                                   │
//!  └── Stdout: {"success": true, "data": 12.34}
//! ```
//!
//! ## Trust
//!
//! Everything a plugin returns is a suggestion. Values never overwrite what
//! the user entered, non-positive numbers are dropped, and a failing plugin
//! only means fewer fields get filled.
//!
//! ## Key Types
//!
//! - [`Suggester`] - The six suggestion operations
//! - [`PluginSuggester`] - Runs an external plugin
//! - [`Suggestion`] - A partial record proposed by a plugin

mod plugin;
mod protocol;
mod suggestion;

use thiserror::Error;

use crate::domain::RecordFields;

pub use plugin::{PluginSuggester, PLUGIN_PREFIX};
pub use protocol::{Operation, PluginRequest, PluginResponse};
pub use suggestion::{
    parse_details, parse_extraction, parse_price, parse_text, sanitize_price, strip_code_fences,
    Suggestion,
};

/// Names shorter than this are not worth asking about
pub const MIN_DETAILS_NAME_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("No suggestion plugin configured. Set [suggest] plugin in .medstock/config.toml")]
    NotConfigured,

    #[error("Suggestion plugin not found: {0}")]
    NotFound(String),

    #[error("Failed to run plugin {plugin}: {source}")]
    Io {
        plugin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin {0} sent no response")]
    NoResponse(String),

    #[error("Plugin {plugin} sent an invalid response: {source}")]
    InvalidResponse {
        plugin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Plugin {plugin} failed: {message}")]
    Failed { plugin: String, message: String },
}

/// Source of suggested record values
pub trait Suggester {
    /// Finds medications described in free text
    fn extract_from_text(&self, text: &str) -> Result<Vec<Suggestion>, SuggestError>;

    /// Finds medications in a document (image, PDF, ...)
    fn extract_from_file(&self, data: &[u8], mime_type: &str) -> Result<Vec<Suggestion>, SuggestError>;

    /// Guesses the unit consumer price
    fn suggest_price(&self, name: &str, presentation: Option<&str>) -> Result<Option<f64>, SuggestError>;

    /// Guesses the therapeutic class
    fn suggest_class(&self, name: &str, active_ingredient: Option<&str>) -> Result<Option<String>, SuggestError>;

    /// Guesses descriptive fields from the name
    fn suggest_details(&self, name: &str) -> Result<Option<Suggestion>, SuggestError>;

    /// Describes how an active ingredient works
    fn mechanism_of_action(&self, active_ingredient: &str) -> Result<Option<String>, SuggestError>;
}

/// Asks `suggester` for everything still missing in `fields`.
///
/// Failures are logged and skipped. Returns the number of fields filled.
pub fn enrich(suggester: &dyn Suggester, fields: &mut RecordFields) -> usize {
    let mut filled = 0;
    let name = fields.name.trim().to_string();

    if name.chars().count() >= MIN_DETAILS_NAME_LEN {
        if let Some(details) = log_failure("details", suggester.suggest_details(&name)).flatten() {
            filled += details.fill_empty(fields);
        }
    }

    if suggestion::is_unpriced(fields.pmc) {
        let presentation = fields.presentation.clone();
        if let Some(pmc) = log_failure("price", suggester.suggest_price(&name, presentation.as_deref()))
            .flatten()
            .and_then(|p| sanitize_price(Some(p)))
        {
            fields.pmc = Some(pmc);
            filled += 1;
        }
    }

    if fields.class.is_none() {
        let ingredient = fields.active_ingredient.clone();
        if let Some(class) =
            log_failure("class", suggester.suggest_class(&name, ingredient.as_deref())).flatten()
        {
            fields.class = Some(class);
            filled += 1;
        }
    }

    if fields.mechanism_of_action.is_none() {
        if let Some(ingredient) = fields.active_ingredient.clone() {
            if let Some(text) =
                log_failure("mechanism", suggester.mechanism_of_action(&ingredient)).flatten()
            {
                fields.mechanism_of_action = Some(text);
                filled += 1;
            }
        }
    }

    filled
}

fn log_failure<T>(operation: &str, result: Result<T, SuggestError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "suggestion failed");
            None
        }
    }
}
