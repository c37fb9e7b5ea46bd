//! LLM structured extraction: ask a chat model for the field records as JSON.
//!
//! The answer has the same shape as [`ParsedDocument`], with the record list
//! under `beregningsresultat`.

use serde::Deserialize;

use crate::attest::rules::DOCUMENT_TITLE;
use crate::error::ExtractionError;
use crate::models::record::{FieldRecord, ParsedDocument};

/// Build the extraction prompt for one certificate text.
pub fn build_extraction_prompt(attest_text: &str) -> String {
    format!(
        "Convert this Energiattest into the specified format:\n\n{}\n\n\
         Answer with a single JSON object of the form \
         {{\"title\": string, \"beregningsresultat\": [{{\"name\": string, \"value\": number or null, \"unit\": string or null}}]}}. \
         \"value\" is the quantity of the entry and \"unit\" its unit of measurement (e.g. kWh/år, liter/år, %).",
        attest_text
    )
}

#[derive(Deserialize)]
struct StructuredAnswer {
    #[serde(default)]
    title: String,
    #[serde(default)]
    beregningsresultat: Vec<FieldRecord>,
}

/// Parse the model answer into a document.
///
/// A surrounding ```` ```json ```` fence is tolerated. Entries with a blank
/// name are dropped.
pub fn parse_structured_response(content: &str) -> Result<ParsedDocument, ExtractionError> {
    let answer: StructuredAnswer = serde_json::from_str(strip_fence(content))
        .map_err(|e| ExtractionError::InvalidResponse(e.to_string()))?;

    let records: Vec<FieldRecord> = answer
        .beregningsresultat
        .into_iter()
        .filter_map(|mut record| {
            let name = record.name.trim();
            if name.is_empty() {
                return None;
            }
            record.name = name.to_string();
            Some(record)
        })
        .collect();

    if records.is_empty() {
        return Err(ExtractionError::NoData);
    }

    let title = match answer.title.trim() {
        "" => DOCUMENT_TITLE,
        title => title,
    };
    Ok(ParsedDocument::new(title, records))
}

fn strip_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_structured_response() {
        let content = r#"{
            "title": "Netto energibudsjett",
            "beregningsresultat": [
                {"name": "Romoppvarming", "value": 8450.5, "unit": "kWh/år"},
                {"name": "Dato", "value": null, "unit": "18.06.2025"},
                {"name": "Byggeår", "value": 1978}
            ]
        }"#;

        let doc = parse_structured_response(content).unwrap();
        assert_eq!(doc.title, "Netto energibudsjett");
        assert_eq!(
            doc.records,
            vec![
                FieldRecord::new("Romoppvarming", Some(8450.5), Some("kWh/år".to_string())),
                FieldRecord::new("Dato", None, Some("18.06.2025".to_string())),
                FieldRecord::new("Byggeår", Some(1978.0), None),
            ]
        );
    }

    #[test]
    fn test_fenced_answer_and_default_title() {
        let content = "```json\n{\"title\": \" \", \"beregningsresultat\": [{\"name\": \" BRA \", \"value\": 120, \"unit\": \"m²\"}, {\"name\": \"\", \"value\": 1}]}\n```";

        let doc = parse_structured_response(content).unwrap();
        assert_eq!(doc.title, DOCUMENT_TITLE);
        assert_eq!(
            doc.records,
            vec![FieldRecord::new("BRA", Some(120.0), Some("m²".to_string()))]
        );
    }

    #[test]
    fn test_empty_list_is_no_data() {
        let result = parse_structured_response(r#"{"title": "Energiattest", "beregningsresultat": []}"#);
        assert_eq!(result, Err(ExtractionError::NoData));
    }

    #[test]
    fn test_malformed_answer() {
        let result = parse_structured_response("Beklager, jeg kan ikke hjelpe med det.");
        assert!(matches!(result, Err(ExtractionError::InvalidResponse(_))));

        let result = parse_structured_response(r#"{"beregningsresultat": [{"value": 3}]}"#);
        assert!(matches!(result, Err(ExtractionError::InvalidResponse(_))));
    }

    #[test]
    fn test_prompt_carries_text_and_shape() {
        let prompt = build_extraction_prompt("| BRA | 120 m² |");
        assert!(prompt.starts_with("Convert this Energiattest into the specified format:\n\n| BRA | 120 m² |"));
        assert!(prompt.contains("\"beregningsresultat\""));
    }
}
