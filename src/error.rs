//! Error types for chanmarkup
//!
//! Only site configuration can fail. Parsing a comment never returns an
//! error; malformed markup degrades to literal text instead.

use thiserror::Error;

/// Result type alias for chanmarkup operations
pub type Result<T> = std::result::Result<T, MarkupError>;

/// Configuration error types
#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid site file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid {name} pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("{name} pattern needs {expected} capture groups, found {found}")]
    MissingCaptureGroup {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Site {site} has no quote patterns and does not extend another site")]
    MissingPattern { site: String },

    #[error("No such site: {0}")]
    UnknownSite(String),

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Unknown handler: {0}")]
    UnknownHandler(String),
}
