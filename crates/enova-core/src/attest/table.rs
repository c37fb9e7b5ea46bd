//! Candidate table row selection.

use super::rules::patterns::{COLUMN_SEPARATOR, COMMENT_OPENER, TABLE_RULE};

/// A two-column table row: label and raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRow<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Check whether a trimmed line looks like a data row of a markdown table.
pub fn is_candidate_line(line: &str) -> bool {
    line.contains(COLUMN_SEPARATOR)
        && !TABLE_RULE.is_match(line)
        && !line.starts_with(COMMENT_OPENER)
}

/// Split a candidate line into its first two non-empty cells.
///
/// Cells beyond the second are ignored.
pub fn split_row(line: &str) -> Option<TableRow<'_>> {
    let mut cells = line
        .split(COLUMN_SEPARATOR)
        .map(str::trim)
        .filter(|cell| !cell.is_empty());

    let name = cells.next()?;
    let value = cells.next()?;

    Some(TableRow { name, value })
}

/// Iterate over all two-column rows of a text, in source order.
pub fn table_rows(text: &str) -> impl Iterator<Item = TableRow<'_>> {
    text.lines()
        .map(str::trim)
        .filter(|line| is_candidate_line(line))
        .filter_map(split_row)
}
