// Date-range resolution for governor queries

use chrono::Datelike;

use crate::utils::{day_start_millis, millis_to_date, parse_date, MILLIS_PER_DAY};
use crate::value_objects::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub window: TimeWindow,
    pub year: i32,
}

impl DateRange {
    pub fn start_date(&self) -> String {
        format_day(self.window.start_millis)
    }

    /// Last day inside the range.
    pub fn end_date(&self) -> String {
        format_day(self.window.end_millis - 1)
    }
}

fn format_day(millis: i64) -> String {
    millis_to_date(millis)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `[Jan 1 of year, Jan 1 of year + 1)` in UTC.
pub fn year_window(year: i32) -> TimeWindow {
    let start = chrono::NaiveDate::from_ymd_opt(year, 1, 1).map(day_start_millis);
    let end = chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1).map(day_start_millis);
    TimeWindow::new(start.unwrap_or_default(), end.unwrap_or_default())
}

/// Midnight UTC of a `YYYY-MM-DD` day.
pub fn parse_day_start(raw: &str) -> Option<i64> {
    parse_date(raw).ok().map(day_start_millis)
}

/// Resolves a query window.
///
/// When both `start` and `end` parse and `end` is not before `start`, the
/// window runs from the start of `start` to the end of `end` (inclusive
/// day, exclusive bound) and the year is the year of `start`. Otherwise the
/// whole `fallback_year` is used.
pub fn resolve_date_range(start: Option<&str>, end: Option<&str>, fallback_year: i32) -> DateRange {
    let start_millis = start.and_then(parse_day_start);
    let end_millis = end.and_then(parse_day_start).map(|day| day + MILLIS_PER_DAY);

    if let (Some(start_millis), Some(end_millis)) = (start_millis, end_millis) {
        if end_millis > start_millis {
            let year = millis_to_date(start_millis)
                .map(|date| date.year())
                .unwrap_or(fallback_year);
            return DateRange {
                window: TimeWindow::new(start_millis, end_millis),
                year,
            };
        }
    }

    DateRange {
        window: year_window(fallback_year),
        year: fallback_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_range_includes_the_end_day() {
        let range = resolve_date_range(Some("2025-01-01"), Some("2025-01-01"), 2020);
        assert_eq!(range.year, 2025);
        assert_eq!(range.window.end_millis - range.window.start_millis, MILLIS_PER_DAY);
        assert_eq!(range.start_date(), "2025-01-01");
        assert_eq!(range.end_date(), "2025-01-01");
    }

    #[test]
    fn missing_or_inverted_bounds_fall_back_to_the_year() {
        let expected = year_window(2024);
        for (start, end) in [
            (None, Some("2025-01-01")),
            (Some("2025-01-01"), None),
            (Some("2025-02-01"), Some("2025-01-01")),
            (Some("garbage"), Some("2025-01-01")),
        ] {
            let range = resolve_date_range(start, end, 2024);
            assert_eq!(range.window, expected);
            assert_eq!(range.year, 2024);
        }
    }

    #[test]
    fn year_window_spans_the_calendar_year() {
        let window = year_window(2024);
        assert_eq!(parse_day_start("2024-01-01"), Some(window.start_millis));
        assert_eq!(parse_day_start("2025-01-01"), Some(window.end_millis));
    }
}
