//! Structured error types for the Folio layout engine.
//!
//! Layout mistakes (bad splits, overflowing rows, malformed tables) are
//! reported at the moment a container is attached, so a caller never finds out
//! about a broken layout after drawing has begun. Backend failures pass
//! through unchanged.

use thiserror::Error;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// A layout or styling declaration is inconsistent (split percentages
    /// that do not add up, a highlight column outside the table, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Table data passed to the style compiler is malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A row or column does not fit in the space its container has left.
    #[error("{container} '{name}' overflows: needs {required:.2}pt but only {available:.2}pt available")]
    Overflow {
        container: &'static str,
        name: String,
        required: f64,
        available: f64,
    },

    /// An image could not be loaded or decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// Writing the finished document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input failed to parse as a valid report description.
    #[error("Failed to parse report: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FolioError>;

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { source: e, hint }
    }
}
