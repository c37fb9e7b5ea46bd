//! WASM bindings for Norwegian energy certificate extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use js_sys::Array;
use wasm_bindgen::prelude::*;

use enova_core::attest::rules::classify_value as classify_cell;
use enova_core::models::record::ParsedDocument;
use enova_core::review::parse_response;
use enova_core::{CertificateTableParser, EnergyCertificate, TableParser};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse certificate text into `{ title, records }`.
///
/// Throws "no table data found" when the text has no table rows.
#[wasm_bindgen]
pub fn parse_certificate_text(text: &str) -> Result<JsValue, JsValue> {
    CertificateExtractor::new().extract(text)
}

/// Classify a single cell value, e.g. `"120 m²"` -> `{ kind: "quantity", value: 120, unit: "m²" }`.
#[wasm_bindgen]
pub fn classify_value(value: &str) -> Result<JsValue, JsValue> {
    to_js(&classify_cell(value))
}

/// Parse an LLM review answer into its four sections.
#[wasm_bindgen]
pub fn parse_review_response(content: &str) -> Result<JsValue, JsValue> {
    to_js(&parse_response(content))
}

/// Certificate extractor class for browser use.
#[wasm_bindgen]
pub struct CertificateExtractor {
    parser: CertificateTableParser,
}

#[wasm_bindgen]
impl CertificateExtractor {
    /// Create a new certificate extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: CertificateTableParser::new(),
        }
    }

    fn document(&self, text: &str) -> Result<ParsedDocument, JsValue> {
        self.parser
            .parse(text)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Extract field records. Throws when no table data is found.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.document(text)?)
    }

    /// Extract the normalized certificate summary.
    #[wasm_bindgen]
    pub fn extract_summary(&self, text: &str) -> Result<JsValue, JsValue> {
        let doc = self.document(text)?;
        to_js(&EnergyCertificate::from_document(&doc))
    }

    /// Field names in document order.
    #[wasm_bindgen]
    pub fn field_names(&self, text: &str) -> Result<Array, JsValue> {
        let doc = self.document(text)?;
        Ok(doc
            .records
            .iter()
            .map(|r| JsValue::from_str(&r.name))
            .collect())
    }

    /// Extract field records as a JSON string.
    #[wasm_bindgen]
    pub fn extract_json(&self, text: &str) -> Result<String, JsValue> {
        let doc = self.document(text)?;
        serde_json::to_string(&doc).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for CertificateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const SAMPLE: &str = "| Byggeår | 1985 |\n| BRA | 120 m² |\n| Dato | 18.06.2025 |\n";

    #[wasm_bindgen_test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_extract_json() {
        let json = CertificateExtractor::new().extract_json(SAMPLE).unwrap();
        assert!(json.contains("\"Energiattest\""));
        assert!(json.contains("\"m²\""));
    }

    #[wasm_bindgen_test]
    fn test_field_names() {
        let names = CertificateExtractor::new().field_names(SAMPLE).unwrap();
        assert_eq!(names.length(), 3);
    }

    #[wasm_bindgen_test]
    fn test_no_data_throws() {
        let err = parse_certificate_text("no tables here").unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some("no table data found"));
    }
}
