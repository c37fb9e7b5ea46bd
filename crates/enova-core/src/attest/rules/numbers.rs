//! Number and number-with-unit parsing for certificate cells.

use super::patterns::{DECIMAL_COMMA, NUMBER_UNIT_SPLIT, NUMBER_WITH_UNIT};

/// Parse a cell that is nothing but a number, e.g. `34`, `36,5` or `5 538`.
///
/// Decimal commas become dots and spaces are dropped before parsing.
/// Non-finite results (`inf`, `NaN`) are rejected.
pub fn parse_pure_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .replace(DECIMAL_COMMA, ".")
        .chars()
        .filter(|c| *c != ' ')
        .collect();

    parse_finite(&cleaned)
}

/// Check whether a cell holds a numeric run followed by non-numeric text.
pub fn contains_number_with_unit(value: &str) -> bool {
    NUMBER_WITH_UNIT.is_match(value)
}

/// Split a cell into its first numeric run and the text after it.
///
/// When the numeric run does not parse (a lone `.` or `1.2.3`), the number is
/// absent and the unit is the whole cell.
pub fn split_number_and_unit(value: &str) -> (Option<f64>, String) {
    if let Some(caps) = NUMBER_UNIT_SPLIT.captures(value) {
        let number = caps[1].replace(DECIMAL_COMMA, ".");
        if let Some(number) = parse_finite(&number) {
            return (Some(number), caps[2].trim().to_string());
        }
    }

    (None, value.to_string())
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_pure_number() {
        assert_eq!(parse_pure_number("34"), Some(34.0));
        assert_eq!(parse_pure_number("36,5"), Some(36.5));
        assert_eq!(parse_pure_number("36.5"), Some(36.5));
        assert_eq!(parse_pure_number("5 538"), Some(5538.0));
        assert_eq!(parse_pure_number("-12,25"), Some(-12.25));
        assert_eq!(parse_pure_number("120 m²"), None);
        assert_eq!(parse_pure_number("1,234,5"), None);
        assert_eq!(parse_pure_number("inf"), None);
        assert_eq!(parse_pure_number("NaN"), None);
        assert_eq!(parse_pure_number(""), None);
    }

    #[test]
    fn test_contains_number_with_unit() {
        assert!(contains_number_with_unit("0,18 W/(m²·K)"));
        assert!(contains_number_with_unit("3855.0 m²"));
        assert!(contains_number_with_unit("120kWh/år"));
        assert!(!contains_number_with_unit("HAUGESUND"));
        assert!(!contains_number_with_unit("Oslo 0150"));
    }

    #[test]
    fn test_split_number_and_unit() {
        assert_eq!(
            split_number_and_unit("0,18 W/(m²·K)"),
            (Some(0.18), "W/(m²·K)".to_string())
        );
        assert_eq!(
            split_number_and_unit("3855.0 m²"),
            (Some(3855.0), "m²".to_string())
        );
        assert_eq!(
            split_number_and_unit("120kWh/år"),
            (Some(120.0), "kWh/år".to_string())
        );
    }

    #[test]
    fn test_split_takes_first_numeric_run() {
        assert_eq!(
            split_number_and_unit("Energiattest-2025-136911"),
            (Some(2025.0), "-136911".to_string())
        );
    }

    #[test]
    fn test_split_falls_back_to_whole_text() {
        assert_eq!(
            split_number_and_unit("ca. 120 kWh"),
            (None, "ca. 120 kWh".to_string())
        );
        assert_eq!(
            split_number_and_unit("1.2.3 m"),
            (None, "1.2.3 m".to_string())
        );
    }
}
