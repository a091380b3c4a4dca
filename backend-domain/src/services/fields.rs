// Finite-number guard for loosely typed record fields

use serde_json::Value;

/// Coerces a raw field to a finite number. Numeric strings are accepted;
/// NaN, infinities, booleans, objects and unparseable strings are not.
pub fn finite_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

pub fn number_or_zero(value: Option<&Value>) -> f64 {
    finite_number(value).unwrap_or(0.0)
}

/// Integer identifier, `0` when absent or non-numeric.
pub fn id_or_zero(value: Option<&Value>) -> i64 {
    finite_number(value).map(|v| v.trunc() as i64).unwrap_or(0)
}

/// Text form of a field that may arrive as a string or a number.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(finite_number(Some(&json!(12))), Some(12.0));
        assert_eq!(finite_number(Some(&json!(" 7.5 "))), Some(7.5));
    }

    #[test]
    fn rejects_non_finite_and_non_numeric() {
        assert_eq!(finite_number(Some(&json!("NaN"))), None);
        assert_eq!(finite_number(Some(&json!("inf"))), None);
        assert_eq!(finite_number(Some(&json!(true))), None);
        assert_eq!(finite_number(Some(&json!(null))), None);
        assert_eq!(finite_number(None), None);
        assert_eq!(number_or_zero(Some(&json!({}))), 0.0);
    }

    #[test]
    fn ids_truncate() {
        assert_eq!(id_or_zero(Some(&json!(42.9))), 42);
        assert_eq!(id_or_zero(Some(&json!("x"))), 0);
    }
}
