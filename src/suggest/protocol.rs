//! Plugin protocol types
//!
//! A suggestion plugin reads one JSON request from stdin and writes one JSON
//! response line to stdout.

use serde::{Deserialize, Serialize};

/// Operations a suggestion plugin can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Extract medications from free text
    ExtractText,
    /// Extract medications from a document (base64 data + mime type)
    ExtractFile,
    /// Guess the unit consumer price
    Price,
    /// Guess the therapeutic class
    Class,
    /// Guess descriptive fields from the name
    Details,
    /// Describe the mechanism of action of an active ingredient
    Mechanism,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ExtractText => "extract_text",
            Operation::ExtractFile => "extract_file",
            Operation::Price => "price",
            Operation::Class => "class",
            Operation::Details => "details",
            Operation::Mechanism => "mechanism",
        }
    }
}

/// A message sent to a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRequest {
    /// The operation to perform
    pub operation: Operation,

    /// Operation-specific parameters
    pub params: serde_json::Value,
}

impl PluginRequest {
    pub fn new(operation: Operation, params: impl Into<serde_json::Value>) -> Self {
        Self {
            operation,
            params: params.into(),
        }
    }
}

/// A response from a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResponse {
    /// Whether the operation succeeded
    pub success: bool,

    /// Result data (if success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Error message (if failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PluginResponse {
    pub fn success(data: impl Into<serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
