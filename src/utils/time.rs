use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Midnight UTC on the first day of `at`'s month.
pub fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let first = NaiveDate::from_ymd_opt(at.year(), at.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| at.naive_utc());
    Utc.from_utc_datetime(&first)
}

/// First instants of the last `count` calendar months, oldest first, ending
/// with the month containing `at`.
pub fn trailing_months(at: DateTime<Utc>, count: u32) -> Vec<DateTime<Utc>> {
    let current = month_start(at);
    (0..count)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

/// "Mar 2026" style label.
pub fn month_label(at: DateTime<Utc>) -> String {
    at.format("%b %Y").to_string()
}

pub fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_months_cross_year_boundary() {
        let at = Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap();
        let labels: Vec<String> = trailing_months(at, 6).into_iter().map(month_label).collect();
        assert_eq!(
            labels,
            vec!["Sep 2025", "Oct 2025", "Nov 2025", "Dec 2025", "Jan 2026", "Feb 2026"]
        );
    }

    #[test]
    fn month_start_truncates_to_first_day() {
        let at = Utc.with_ymd_and_hms(2026, 7, 31, 23, 59, 59).unwrap();
        assert_eq!(month_start(at), Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap());
    }
}
