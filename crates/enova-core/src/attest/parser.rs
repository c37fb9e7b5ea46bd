//! Certificate table parser producing field records.

use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::record::{FieldRecord, ParsedDocument};

use super::rules::{classify_value, is_header_label, DASH_MARKER, DOCUMENT_TITLE};
use super::table::table_rows;
use super::{Result, TableParser};

/// Parser for the two-column tables of an Energiattest text.
///
/// Stateless; one instance can be shared between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateTableParser;

impl CertificateTableParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract field records in source order, skipping header and empty rows.
    pub fn extract_records(&self, text: &str) -> Vec<FieldRecord> {
        let mut records = Vec::new();

        for row in table_rows(text) {
            if is_header_label(row.name) {
                trace!("Skipping header row {:?}", row.name);
                continue;
            }
            if row.value.is_empty() || row.value == DASH_MARKER {
                continue;
            }

            let shape = classify_value(row.value);
            let record = FieldRecord::from_shape(row.name, &shape);
            trace!(
                "Parsed: {} = {:?} {:?}",
                record.name, record.value, record.unit
            );
            records.push(record);
        }

        records
    }
}

impl TableParser for CertificateTableParser {
    fn parse(&self, text: &str) -> Result<ParsedDocument> {
        let records = self.extract_records(text);

        if records.is_empty() {
            debug!("No valid table data found in {} characters of text", text.len());
            return Err(ExtractionError::NoData);
        }

        debug!("Parsed {} fields", records.len());
        Ok(ParsedDocument::new(DOCUMENT_TITLE, records))
    }
}

/// Parse a certificate text, returning `None` when it has no table data.
pub fn parse_certificate_text(text: &str) -> Option<ParsedDocument> {
    CertificateTableParser::new().parse(text).ok()
}
