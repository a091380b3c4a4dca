// Timestamp unit normalization
//
// Raw times arrive as seconds, milliseconds or microseconds. The thresholds
// below decide the unit and are kept exactly: changing them re-buckets every
// historical record.

use serde_json::Value;

use crate::services::finite_number;

/// Values at or above this are microseconds.
pub const MICROSECONDS_THRESHOLD: f64 = 1e14;
/// Values below this are seconds.
pub const SECONDS_THRESHOLD: f64 = 1e12;

/// Converts a raw time to whole epoch milliseconds.
///
/// Returns `None` for non-finite or non-positive input.
pub fn normalize_timestamp_millis(value: f64) -> Option<i64> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let millis = if value >= MICROSECONDS_THRESHOLD {
        value / 1000.0
    } else if value < SECONDS_THRESHOLD {
        value * 1000.0
    } else {
        value
    };
    Some(millis.trunc() as i64)
}

pub fn normalize_raw_timestamp(value: Option<&Value>) -> Option<i64> {
    finite_number(value).and_then(normalize_timestamp_millis)
}

/// `end - start`, floored at zero; zero when either bound is missing.
pub fn duration_millis(start: Option<i64>, end: Option<i64>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => (end - start).max(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seconds_are_scaled_up() {
        assert_eq!(
            normalize_timestamp_millis(1_700_000_000.0),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn microseconds_are_scaled_down() {
        assert_eq!(
            normalize_timestamp_millis(1_700_000_000_000_000.0),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn milliseconds_are_unchanged() {
        assert_eq!(
            normalize_timestamp_millis(1_700_000_000_123.0),
            Some(1_700_000_000_123)
        );
    }

    #[test]
    fn threshold_edges() {
        assert_eq!(
            normalize_timestamp_millis(SECONDS_THRESHOLD),
            Some(1_000_000_000_000)
        );
        assert_eq!(
            normalize_timestamp_millis(MICROSECONDS_THRESHOLD),
            Some(100_000_000_000)
        );
        assert_eq!(
            normalize_timestamp_millis(MICROSECONDS_THRESHOLD - 1.0),
            Some(99_999_999_999_999)
        );
    }

    #[test]
    fn idempotent_on_millisecond_range() {
        for value in [
            1_000_000_000_000_i64,
            1_650_000_000_000,
            1_700_000_000_123,
            99_999_999_999_999,
        ] {
            let once = normalize_timestamp_millis(value as f64).expect("valid");
            assert_eq!(once, value);
            assert_eq!(normalize_timestamp_millis(once as f64), Some(once));
        }
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(normalize_timestamp_millis(0.0), None);
        assert_eq!(normalize_timestamp_millis(-5.0), None);
        assert_eq!(normalize_timestamp_millis(f64::NAN), None);
        assert_eq!(normalize_timestamp_millis(f64::INFINITY), None);
        assert_eq!(normalize_raw_timestamp(Some(&json!("abc"))), None);
        assert_eq!(normalize_raw_timestamp(None), None);
    }

    #[test]
    fn raw_values_accept_numeric_strings() {
        assert_eq!(
            normalize_raw_timestamp(Some(&json!("1700000000"))),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn duration_is_floored_at_zero() {
        assert_eq!(duration_millis(Some(10), Some(40)), 30);
        assert_eq!(duration_millis(Some(40), Some(10)), 0);
        assert_eq!(duration_millis(None, Some(10)), 0);
    }
}
