//! Output formatting for CLI commands
//!
//! Text mode is human-facing: each command prints its own view and only
//! routes messages through here. JSON mode emits one object per line.

use serde::Serialize;
use serde_json::json;

use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Writes command results in the selected format
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Line for a status message, `Error: ` prefixed in text mode on failure
    fn status_line(&self, ok: bool, message: &str) -> String {
        match (self.format, ok) {
            (OutputFormat::Text, true) => message.to_string(),
            (OutputFormat::Text, false) => format!("Error: {}", message),
            (OutputFormat::Json, true) => json!({ "success": true, "message": message }).to_string(),
            (OutputFormat::Json, false) => json!({ "success": false, "error": message }).to_string(),
        }
    }

    /// Compact JSON for `data`, or `None` in text mode
    fn json_line<T: Serialize>(&self, data: &T) -> Option<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(data).ok(),
            OutputFormat::Text => None,
        }
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.status_line(true, message));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.status_line(false, message));
    }

    /// Emits a structured result. Does nothing in text mode.
    pub fn data<T: Serialize>(&self, data: &T) {
        if let Some(line) = self.json_line(data) {
            println!("{}", line);
        }
    }

    /// Prints a blank line (text only)
    pub fn blank(&self) {
        if self.format == OutputFormat::Text {
            println!();
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Debug line on stderr when --verbose is set
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Like `verbose`, tagged with the command or stage it came from
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_status_lines() {
        let output = Output::new(OutputFormat::Text, false);

        assert_eq!(output.status_line(true, "Removed Dipirona"), "Removed Dipirona");
        assert_eq!(output.status_line(false, "Record not found: x"), "Error: Record not found: x");
    }

    #[test]
    fn json_status_lines() {
        let output = Output::new(OutputFormat::Json, false);

        let ok: serde_json::Value = serde_json::from_str(&output.status_line(true, "done")).unwrap();
        assert_eq!(ok, json!({ "success": true, "message": "done" }));

        let err: serde_json::Value = serde_json::from_str(&output.status_line(false, "bad")).unwrap();
        assert_eq!(err, json!({ "success": false, "error": "bad" }));
    }

    #[test]
    fn data_is_json_only() {
        let value = json!({ "total": 2 });

        assert_eq!(Output::new(OutputFormat::Text, false).json_line(&value), None);
        assert_eq!(
            Output::new(OutputFormat::Json, false).json_line(&value).as_deref(),
            Some(r#"{"total":2}"#)
        );
    }

    #[test]
    fn stored_format_converts() {
        assert_eq!(OutputFormat::from(storage::OutputFormat::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(storage::OutputFormat::Text), OutputFormat::Text);
    }
}
