//! Numeric patterns: `greaterThan`, `between`, `approximately`, etc.

use serde_json::Value;

use crate::error::PatternError;

/// Coerce `actual` to an `f64`: JSON numbers convert directly; JSON strings
/// parse as a numeric literal; anything else is not a number.
pub fn as_f64(actual: &Value) -> Option<f64> {
    match actual {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_arg(pattern: &'static str, raw: &str) -> Result<f64, PatternError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| PatternError::InvalidArgument {
            pattern,
            message: format!("'{raw}' is not a number"),
        })
}

pub fn evaluate(name: &str, raw_args: Option<&str>, actual: &Value) -> Result<bool, PatternError> {
    let require_args = |pattern: &'static str| {
        raw_args.ok_or(PatternError::ArityMismatch {
            pattern,
            expected: "one numeric argument",
            raw_args: String::new(),
        })
    };

    match name {
        "greaterThan" => {
            let target = parse_arg("greaterThan", require_args("greaterThan")?)?;
            Ok(as_f64(actual).map(|a| a > target).unwrap_or(false))
        }
        "lessThan" => {
            let target = parse_arg("lessThan", require_args("lessThan")?)?;
            Ok(as_f64(actual).map(|a| a < target).unwrap_or(false))
        }
        "greaterThanOrEqual" => {
            let target = parse_arg("greaterThanOrEqual", require_args("greaterThanOrEqual")?)?;
            Ok(as_f64(actual).map(|a| a >= target).unwrap_or(false))
        }
        "lessThanOrEqual" => {
            let target = parse_arg("lessThanOrEqual", require_args("lessThanOrEqual")?)?;
            Ok(as_f64(actual).map(|a| a <= target).unwrap_or(false))
        }
        "equals" => {
            let target = parse_arg("equals", require_args("equals")?)?;
            Ok(as_f64(actual).map(|a| a == target).unwrap_or(false))
        }
        "notEquals" => {
            let target = parse_arg("notEquals", require_args("notEquals")?)?;
            Ok(as_f64(actual).map(|a| a != target).unwrap_or(true))
        }
        "between" | "range" => {
            let raw = require_args(name_static(name))?;
            let (min_raw, max_raw) =
                raw.split_once(':')
                    .ok_or(PatternError::ArityMismatch {
                        pattern: name_static(name),
                        expected: "MIN:MAX",
                        raw_args: raw.to_string(),
                    })?;
            let min = parse_arg(name_static(name), min_raw)?;
            let max = parse_arg(name_static(name), max_raw)?;
            Ok(as_f64(actual).map(|a| a >= min && a <= max).unwrap_or(false))
        }
        "approximately" => {
            let raw = require_args("approximately")?;
            let (value_raw, tolerance_raw) =
                raw.split_once(':')
                    .ok_or(PatternError::ArityMismatch {
                        pattern: "approximately",
                        expected: "VALUE:TOLERANCE",
                        raw_args: raw.to_string(),
                    })?;
            let value = parse_arg("approximately", value_raw)?;
            let tolerance = parse_arg("approximately", tolerance_raw)?;
            Ok(as_f64(actual)
                .map(|a| (a - value).abs() <= tolerance)
                .unwrap_or(false))
        }
        "multipleOf" | "divisibleBy" => {
            let divisor = parse_arg(name_static(name), require_args(name_static(name))?)?;
            if divisor == 0.0 {
                return Err(PatternError::InvalidArgument {
                    pattern: name_static(name),
                    message: "divisor must not be zero".into(),
                });
            }
            Ok(as_f64(actual)
                .map(|a| (a % divisor).abs() < 1e-9)
                .unwrap_or(false))
        }
        "decimalPlaces" => {
            let expected = require_args("decimalPlaces")?
                .trim()
                .parse::<usize>()
                .map_err(|_| PatternError::InvalidArgument {
                    pattern: "decimalPlaces",
                    message: format!("'{}' is not a non-negative integer", require_args("decimalPlaces")?),
                })?;
            Ok(decimal_places(actual) == Some(expected))
        }
        _ => unreachable!("numeric::evaluate dispatched for non-numeric pattern {name}"),
    }
}

fn name_static(name: &str) -> &'static str {
    match name {
        "between" => "between",
        "range" => "range",
        "multipleOf" => "multipleOf",
        "divisibleBy" => "divisibleBy",
        _ => "numeric",
    }
}

fn decimal_places(actual: &Value) -> Option<usize> {
    let text = match actual {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    match text.split_once('.') {
        Some((_, frac)) => Some(frac.len()),
        None => Some(0),
    }
}

pub const NUMERIC_NAMES: &[&str] = &[
    "greaterThan",
    "lessThan",
    "greaterThanOrEqual",
    "lessThanOrEqual",
    "between",
    "range",
    "equals",
    "notEquals",
    "approximately",
    "multipleOf",
    "divisibleBy",
    "decimalPlaces",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn between_is_inclusive() {
        assert!(evaluate("between", Some("1:5"), &json!(1)).unwrap());
        assert!(evaluate("between", Some("1:5"), &json!(5)).unwrap());
        assert!(!evaluate("between", Some("1:5"), &json!(6)).unwrap());
    }

    #[test]
    fn between_n_n_matches_only_n() {
        assert!(evaluate("between", Some("3:3"), &json!(3)).unwrap());
        assert!(!evaluate("between", Some("3:3"), &json!(2)).unwrap());
    }

    #[test]
    fn approximately_zero_tolerance_is_exact_equality() {
        assert!(evaluate("approximately", Some("10:0"), &json!(10)).unwrap());
        assert!(!evaluate("approximately", Some("10:0"), &json!(10.1)).unwrap());
    }

    #[test]
    fn decimal_places_counts_fractional_digits() {
        assert_eq!(decimal_places(&json!(1.50)), Some(1));
        assert_eq!(decimal_places(&json!(2)), Some(0));
    }

    #[test]
    fn multiple_of_zero_divisor_is_an_error() {
        assert!(evaluate("multipleOf", Some("0"), &json!(4)).is_err());
    }
}
