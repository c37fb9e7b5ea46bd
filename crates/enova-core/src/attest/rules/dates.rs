//! Date-shaped cell detection.
//!
//! Certificate dates are stored as text. [`parse_certificate_date`] is only
//! used where a typed date is wanted (the normalized certificate summary).

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_YMD};

/// Check whether a cell starts with `d.m.yyyy` or `yyyy-m-d`.
pub fn is_date(value: &str) -> bool {
    DATE_DMY.is_match(value) || DATE_YMD.is_match(value)
}

/// Parse the leading date of a cell into a calendar date.
pub fn parse_certificate_date(value: &str) -> Option<NaiveDate> {
    if let Some(m) = DATE_DMY.find(value) {
        let mut parts = m.as_str().split('.');
        let day: u32 = parts.next()?.parse().ok()?;
        let month: u32 = parts.next()?.parse().ok()?;
        let year: i32 = parts.next()?.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(m) = DATE_YMD.find(value) {
        let mut parts = m.as_str().split('-');
        let year: i32 = parts.next()?.parse().ok()?;
        let month: u32 = parts.next()?.parse().ok()?;
        let day: u32 = parts.next()?.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}
