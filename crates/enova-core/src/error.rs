//! Error types for the enova-core library.

use thiserror::Error;

/// Main error type for the enova library.
#[derive(Error, Debug)]
pub enum EnovaError {
    /// Certificate table extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Source or sink record error.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to certificate table extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No candidate table row was found in the text.
    #[error("no table data found")]
    NoData,

    /// The model answer was not the requested JSON object.
    #[error("invalid structured response: {0}")]
    InvalidResponse(String),
}

/// Errors related to reading source rows and writing storage rows.
#[derive(Error, Debug)]
pub enum RecordError {
    /// CSV reader/writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON Lines entry.
    #[error("invalid JSON on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Unsupported file extension for a source or sink.
    #[error("unsupported record format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for the enova library.
pub type Result<T> = std::result::Result<T, EnovaError>;
