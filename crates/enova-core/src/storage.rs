//! Source rows in, key/value storage rows out.
//!
//! Certificate texts arrive as [`SourceRow`]s (one per extracted PDF) and every
//! parsed field leaves as one [`KeyValueRow`] tagged with the source's metadata.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{RecordError, Result};
use crate::models::record::ParsedDocument;

/// Decimal places kept in [`KeyValueRow::value_as_number`].
pub const VALUE_SCALE: u32 = 4;

/// One extracted certificate text with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub pdfid: Option<i64>,
    pub extracted_text: Option<String>,
    pub merkenummer: Option<String>,
    pub energikarakter: Option<String>,
    pub oppvarmingskarakter: Option<String>,
    pub adresse: Option<String>,
}

impl SourceRow {
    /// A row is usable only when every column is present and non-blank.
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        self.pdfid.is_some()
            && present(&self.extracted_text)
            && present(&self.merkenummer)
            && present(&self.energikarakter)
            && present(&self.oppvarmingskarakter)
            && present(&self.adresse)
    }

    /// Metadata used to tag storage rows. `None` for incomplete rows.
    pub fn metadata(&self) -> Option<SourceMetadata> {
        if !self.is_complete() {
            return None;
        }

        Some(SourceMetadata {
            pdf_id: self.pdfid?,
            merkenummer: self.merkenummer.clone()?,
            adresse: self.adresse.clone()?,
        })
    }

    pub fn text(&self) -> &str {
        self.extracted_text.as_deref().unwrap_or_default()
    }
}

/// Caller-supplied tags for the rows of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub pdf_id: i64,
    pub merkenummer: String,
    pub adresse: String,
}

/// Storage shape of one field record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueRow {
    pub pdf_id: i64,
    pub record_id: Uuid,
    pub title: String,
    pub field_name: String,
    pub field_value: Option<String>,
    pub unit: Option<String>,
    pub value_as_number: Option<Decimal>,
    pub merkenummer: String,
    pub adresse: String,
    pub created: NaiveDateTime,
}

/// Map a parsed document to storage rows sharing one record id.
pub fn key_value_rows(
    doc: &ParsedDocument,
    meta: &SourceMetadata,
    record_id: Uuid,
    created: NaiveDateTime,
) -> Vec<KeyValueRow> {
    doc.records
        .iter()
        .map(|record| KeyValueRow {
            pdf_id: meta.pdf_id,
            record_id,
            title: doc.title.clone(),
            field_name: record.name.clone(),
            field_value: record.value.map(format_value),
            unit: record.unit.clone(),
            value_as_number: record.value.and_then(to_fixed_point),
            merkenummer: meta.merkenummer.clone(),
            adresse: meta.adresse.clone(),
            created,
        })
        .collect()
}

/// Textual rendering of a value; whole numbers keep a trailing `.0`.
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

fn to_fixed_point(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(VALUE_SCALE).normalize())
}

/// Destination for storage rows.
pub trait RecordSink {
    /// Write all rows of one document.
    fn write_rows(&mut self, rows: &[KeyValueRow]) -> Result<()>;

    /// Flush buffered rows.
    fn flush(&mut self) -> Result<()>;
}

/// CSV sink with a header row.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Finish writing and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}

impl CsvSink<std::fs::File> {
    pub fn create(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path).map_err(RecordError::from)?;
        Ok(Self { writer })
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_rows(&mut self, rows: &[KeyValueRow]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row).map_err(RecordError::from)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read source rows from a `.csv` or `.jsonl`/`.ndjson` file.
pub fn read_source_rows(path: &Path) -> Result<Vec<SourceRow>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file = std::fs::File::open(path)?;
    let rows = match extension.as_str() {
        "csv" => read_csv_rows(file)?,
        "jsonl" | "ndjson" => read_json_lines(BufReader::new(file))?,
        _ => return Err(RecordError::UnsupportedFormat(extension).into()),
    };

    debug!("Read {} source rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read source rows from CSV with a header row.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<SourceRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for row in rdr.deserialize() {
        rows.push(row.map_err(RecordError::from)?);
    }

    Ok(rows)
}

/// Read source rows from JSON Lines. Blank lines are skipped.
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<SourceRow>> {
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|source| RecordError::JsonLine {
            line: index + 1,
            source,
        })?;
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::FieldRecord;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 18)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn meta() -> SourceMetadata {
        SourceMetadata {
            pdf_id: 7,
            merkenummer: "A2025-136911".to_string(),
            adresse: "Storgata 1".to_string(),
        }
    }

    #[test]
    fn test_key_value_rows() {
        let doc = ParsedDocument::new(
            "Energiattest",
            vec![
                FieldRecord::new("Byggeår", Some(1978.0), None),
                FieldRecord::new("U-verdi", Some(0.18), Some("W/(m²·K)".to_string())),
                FieldRecord::new("Sted", None, Some("HAUGESUND".to_string())),
            ],
        );
        let id = Uuid::new_v4();
        let rows = key_value_rows(&doc, &meta(), id, created());

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.record_id == id && r.pdf_id == 7));
        assert_eq!(rows[0].field_name, "Byggeår");
        assert_eq!(rows[0].field_value.as_deref(), Some("1978.0"));
        assert_eq!(rows[0].value_as_number, Some(Decimal::from(1978)));
        assert_eq!(rows[1].field_value.as_deref(), Some("0.18"));
        assert_eq!(rows[1].value_as_number, Some(Decimal::new(18, 2)));
        assert_eq!(rows[1].unit.as_deref(), Some("W/(m²·K)"));
        assert_eq!(rows[2].field_value, None);
        assert_eq!(rows[2].value_as_number, None);
        assert_eq!(rows[2].adresse, "Storgata 1");
    }

    #[test]
    fn test_incomplete_rows_have_no_metadata() {
        let mut row = SourceRow {
            pdfid: Some(1),
            extracted_text: Some("| A | 1 |".to_string()),
            merkenummer: Some("M1".to_string()),
            energikarakter: Some("C".to_string()),
            oppvarmingskarakter: Some("gul".to_string()),
            adresse: Some("Storgata 1".to_string()),
        };
        assert!(row.is_complete());
        assert_eq!(row.metadata().unwrap().pdf_id, 1);

        row.energikarakter = Some("  ".to_string());
        assert!(!row.is_complete());
        assert!(row.metadata().is_none());
    }

    #[test]
    fn test_read_json_lines() {
        let input = concat!(
            r#"{"pdfid": 1, "extracted_text": "| A | 1 |", "merkenummer": "M1", "adresse": "X"}"#,
            "\n\n",
            r#"{"pdfid": 2, "extracted_text": null}"#,
            "\n"
        );
        let rows = read_json_lines(Cursor::new(input)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "| A | 1 |");
        assert_eq!(rows[1].extracted_text, None);
    }

    #[test]
    fn test_read_json_lines_reports_line() {
        let err = read_json_lines(Cursor::new("{}\nnot json\n")).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_read_csv_rows() {
        let input = "pdfid,extracted_text,merkenummer,energikarakter,oppvarmingskarakter,adresse\n\
                     3,\"| BRA | 120 m² |\n| Sted | Oslo |\",M3,B,gul,Storgata 2\n\
                     4,,M4,,,\n";
        let rows = read_csv_rows(Cursor::new(input)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_complete());
        assert!(rows[0].text().contains("| Sted | Oslo |"));
        assert_eq!(rows[1].extracted_text, None);
        assert!(!rows[1].is_complete());
    }

    #[test]
    fn test_csv_sink_writes_header_and_rows() {
        let doc = ParsedDocument::new(
            "Energiattest",
            vec![FieldRecord::new("BRA", Some(120.0), Some("m²".to_string()))],
        );
        let rows = key_value_rows(&doc, &meta(), Uuid::nil(), created());

        let mut sink = CsvSink::new(Vec::new());
        sink.write_rows(&rows).unwrap();
        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("pdf_id,record_id,title,field_name,field_value,unit,value_as_number,merkenummer,adresse,created")
        );
        assert_eq!(
            lines.next(),
            Some("7,00000000-0000-0000-0000-000000000000,Energiattest,BRA,120.0,m²,120,A2025-136911,Storgata 1,2025-06-18T12:00:00")
        );
    }
}
