//! Energiattest table extraction.

mod parser;
pub mod rules;
pub mod table;

pub use parser::{parse_certificate_text, CertificateTableParser};

use crate::error::ExtractionError;
use crate::models::record::ParsedDocument;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for certificate text parsers.
pub trait TableParser {
    /// Parse a certificate text into field records.
    ///
    /// Fails with [`ExtractionError::NoData`] when the text has no table rows.
    fn parse(&self, text: &str) -> Result<ParsedDocument>;
}
