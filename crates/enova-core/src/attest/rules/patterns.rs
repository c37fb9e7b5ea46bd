//! Regex patterns and fixed literals for certificate table extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Column separator of markdown-style table rows.
pub const COLUMN_SEPARATOR: char = '|';

/// Cell content meaning "no value".
pub const DASH_MARKER: &str = "-";

/// Decimal separator used in Norwegian certificates.
pub const DECIMAL_COMMA: char = ',';

/// Prefix of a comment/markup block line.
pub const COMMENT_OPENER: &str = "<!--";

/// Title given to every parsed certificate document.
pub const DOCUMENT_TITLE: &str = "Energiattest";

/// Lower-cased field names that label table columns rather than data.
pub const HEADER_LABELS: [&str; 3] = ["attesten gjelder", "enhet", "adresse"];

lazy_static! {
    // Dates are only checked at the start of the cell
    pub static ref DATE_DMY: Regex = Regex::new(
        r"^\d{1,2}\.\d{1,2}\.\d{4}"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"^\d{4}-\d{1,2}-\d{1,2}"
    ).unwrap();

    // Numeric run followed by something that is not part of a number
    pub static ref NUMBER_WITH_UNIT: Regex = Regex::new(
        r"[\d,.]+\s*[^\d\s,.]+"
    ).unwrap();

    // First numeric run and everything after it
    pub static ref NUMBER_UNIT_SPLIT: Regex = Regex::new(
        r"([\d,.]+)\s*(.+)"
    ).unwrap();

    // Separator/decoration rows such as |---|:---:|
    pub static ref TABLE_RULE: Regex = Regex::new(
        r"^[|\-:\s]+$"
    ).unwrap();
}

/// Check whether a field name is one of the table's own column headers.
pub fn is_header_label(name: &str) -> bool {
    let lowered = name.to_lowercase();
    HEADER_LABELS.iter().any(|label| *label == lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_labels_ignore_case() {
        assert!(is_header_label("Attesten gjelder"));
        assert!(is_header_label("ENHET"));
        assert!(is_header_label("adresse"));
        assert!(!is_header_label("Adresse 2"));
        assert!(!is_header_label("Postnummer"));
    }

    #[test]
    fn test_table_rule() {
        assert!(TABLE_RULE.is_match("|---|---|"));
        assert!(TABLE_RULE.is_match("| :--- | ---: |"));
        assert!(!TABLE_RULE.is_match("| BRA | 120 m² |"));
        assert!(!TABLE_RULE.is_match("| Dato | 2025-06-18 |"));
    }

    #[test]
    fn test_fixed_literals() {
        assert_eq!(DOCUMENT_TITLE, "Energiattest");
        assert_eq!(DASH_MARKER, "-");
        assert_eq!(DECIMAL_COMMA, ',');
        assert_eq!(COLUMN_SEPARATOR, '|');
    }
}
