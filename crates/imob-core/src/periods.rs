//! Competence-period helpers. A period is a `YYYY-MM` label identifying one
//! monthly billing/payout cycle; invoices fall due on the 10th of it.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use contracts::StoreError;

const MONTH_LABELS_PT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub(crate) fn period_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub(crate) fn parse_period(raw: &str) -> Result<(i32, u32), StoreError> {
    let malformed = || StoreError::Validation(format!("malformed competence period: {raw}"));
    let (year_raw, month_raw) = raw.split_once('-').ok_or_else(malformed)?;
    let year = year_raw.parse::<i32>().map_err(|_| malformed())?;
    let month = month_raw.parse::<u32>().map_err(|_| malformed())?;
    if year_raw.len() != 4 || month_raw.len() != 2 || !(1..=12).contains(&month) {
        return Err(malformed());
    }
    Ok((year, month))
}

/// Due date for a period: the 10th of that month.
pub(crate) fn due_date(period: &str) -> Result<NaiveDate, StoreError> {
    let (year, month) = parse_period(period)?;
    NaiveDate::from_ymd_opt(year, month, 10)
        .ok_or_else(|| StoreError::Validation(format!("period out of range: {period}")))
}

/// The `count` trailing periods ending at the reference month, oldest first.
pub(crate) fn trailing_periods(reference: DateTime<Utc>, count: u32) -> Vec<String> {
    let mut year = reference.year();
    let mut month = reference.month() as i32;
    let mut labels = Vec::with_capacity(count as usize);
    for _ in 0..count {
        labels.push(format!("{year:04}-{month:02}"));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }
    labels.reverse();
    labels
}

pub(crate) fn month_label(period: &str) -> String {
    parse_period(period)
        .map(|(_, month)| MONTH_LABELS_PT[(month - 1) as usize].to_string())
        .unwrap_or_else(|_| period.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn trailing_periods_cross_year_boundary() {
        let reference = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let periods = trailing_periods(reference, 12);
        assert_eq!(periods.len(), 12);
        assert_eq!(periods.first().map(String::as_str), Some("2024-02"));
        assert_eq!(periods.last().map(String::as_str), Some("2025-01"));
    }

    #[test]
    fn due_date_is_the_tenth() {
        let due = due_date("2025-02").expect("period parses");
        assert_eq!(due, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
    }

    #[test]
    fn malformed_periods_are_rejected() {
        assert!(parse_period("2025").is_err());
        assert!(parse_period("2025-13").is_err());
        assert!(parse_period("25-02").is_err());
        assert!(parse_period("2025-2").is_err());
    }

    #[test]
    fn month_labels_are_localized() {
        assert_eq!(month_label("2025-02"), "Fev");
        assert_eq!(month_label("2024-12"), "Dez");
    }
}
