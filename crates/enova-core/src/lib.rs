//! Core library for Norwegian energy certificate (Energiattest) processing.
//!
//! This crate provides:
//! - Table extraction from certificate text into typed field records
//! - Storage mapping of parsed records to key/value rows
//! - Certificate API request and response models
//! - LLM review prompts and response parsing
//! - LLM structured extraction of the same field records

pub mod attest;
pub mod error;
pub mod geocode;
pub mod models;
pub mod review;
pub mod storage;
pub mod structured;

pub use attest::{parse_certificate_text, CertificateTableParser, TableParser};
pub use error::{EnovaError, ExtractionError, RecordError, Result};
pub use models::config::EnovaConfig;
pub use models::energy::EnergyCertificate;
pub use models::record::{FieldRecord, ParsedDocument, ValueShape};
pub use review::{CertificateReview, ReviewContext};
pub use storage::{KeyValueRow, SourceMetadata, SourceRow};
