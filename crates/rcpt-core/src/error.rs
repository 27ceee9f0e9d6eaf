//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for RcptError {
    fn from(err: serde_json::Error) -> Self {
        RcptError::Config(err.to_string())
    }
}

/// Errors raised while building or running extractors.
///
/// Finding no amount or no date is not an error; those surface as `None`.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Input text could not be used (e.g. not valid UTF-8).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A strategy name that no built-in strategy answers to.
    #[error("unknown {field} strategy: {name}")]
    UnknownStrategy { field: String, name: String },

    /// A field name that no built-in extractor answers to.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A date format name outside the recognizer profile.
    #[error("unknown date format: {0}")]
    UnknownFormat(String),

    /// An amount strategy chain with nothing in it.
    #[error("no {0} strategies configured")]
    NoStrategies(String),

    /// A caller-supplied label pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
