//! Type, existence, length, string, and array patterns.

use serde_json::Value;

use crate::error::PatternError;

pub const GENERAL_NAMES: &[&str] = &[
    "type",
    "exists",
    "length",
    "arrayLength",
    "count",
    "contains",
    "containsIgnoreCase",
    "startsWith",
    "endsWith",
    "equalsIgnoreCase",
    "arrayContains",
    "regex",
];

/// The string form used by `contains`/`regex`/etc. when `actual` is not
/// already a string: numbers and booleans render as their JSON text,
/// arrays/objects are not coerced (callers treat that as no match).
fn string_form(actual: &Value) -> Option<String> {
    match actual {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn require_args(pattern: &'static str, raw_args: Option<&str>) -> Result<&str, PatternError> {
    raw_args.ok_or(PatternError::ArityMismatch {
        pattern,
        expected: "one argument",
        raw_args: String::new(),
    })
}

pub fn evaluate(name: &str, raw_args: Option<&str>, actual: &Value) -> Result<bool, PatternError> {
    match name {
        "type" => {
            let expected = require_args("type", raw_args)?;
            Ok(json_type_name(actual) == expected)
        }
        "exists" => Ok(!actual.is_null()),
        "length" => {
            let n: usize = require_args("length", raw_args)?
                .parse()
                .map_err(|_| invalid_arg("length", raw_args))?;
            Ok(length_of(actual) == Some(n))
        }
        "arrayLength" => {
            let n: usize = require_args("arrayLength", raw_args)?
                .parse()
                .map_err(|_| invalid_arg("arrayLength", raw_args))?;
            Ok(actual.as_array().map(|a| a.len() == n).unwrap_or(false))
        }
        "count" => {
            let n: usize = require_args("count", raw_args)?
                .parse()
                .map_err(|_| invalid_arg("count", raw_args))?;
            let actual_count = actual
                .as_array()
                .map(|a| a.len())
                .or_else(|| actual.as_object().map(|o| o.len()));
            Ok(actual_count == Some(n))
        }
        "contains" => {
            let needle = require_args("contains", raw_args)?;
            Ok(contains(actual, needle, false))
        }
        "containsIgnoreCase" => {
            let needle = require_args("containsIgnoreCase", raw_args)?;
            Ok(contains(actual, needle, true))
        }
        "startsWith" => {
            let prefix = require_args("startsWith", raw_args)?;
            Ok(string_form(actual).map(|s| s.starts_with(prefix)).unwrap_or(false))
        }
        "endsWith" => {
            let suffix = require_args("endsWith", raw_args)?;
            Ok(string_form(actual).map(|s| s.ends_with(suffix)).unwrap_or(false))
        }
        "equalsIgnoreCase" => {
            let expected = require_args("equalsIgnoreCase", raw_args)?;
            Ok(string_form(actual)
                .map(|s| s.eq_ignore_ascii_case(expected))
                .unwrap_or(false))
        }
        "arrayContains" => array_contains(raw_args, actual),
        "regex" => {
            let pattern_src = require_args("regex", raw_args)?;
            let re = regex::Regex::new(pattern_src).map_err(|source| PatternError::InvalidRegex {
                pattern: "regex",
                source,
            })?;
            Ok(string_form(actual).map(|s| re.is_match(&s)).unwrap_or(false))
        }
        _ => unreachable!("general::evaluate dispatched for unrecognized pattern {name}"),
    }
}

fn invalid_arg(pattern: &'static str, raw_args: Option<&str>) -> PatternError {
    PatternError::InvalidArgument {
        pattern,
        message: format!("'{}' is not a non-negative integer", raw_args.unwrap_or("")),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    }
}

fn contains(actual: &Value, needle: &str, ignore_case: bool) -> bool {
    let haystack_matches = |haystack: &str| {
        if ignore_case {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        } else {
            haystack.contains(needle)
        }
    };

    match actual {
        Value::Array(items) => items
            .iter()
            .filter_map(string_form)
            .any(|item| haystack_matches(&item)),
        _ => string_form(actual).map(|s| haystack_matches(&s)).unwrap_or(false),
    }
}

fn array_contains(raw_args: Option<&str>, actual: &Value) -> Result<bool, PatternError> {
    let raw = require_args("arrayContains", raw_args)?;
    let array = match actual.as_array() {
        Some(a) => a,
        None => return Ok(false),
    };

    // `F:V` form (object field match) vs bare `V` form (element match).
    // Disambiguated the same way the source harness does: if a colon
    // appears and the left-hand side looks like a field name (no spaces),
    // try object-field matching first.
    if let Some((field, value_raw)) = raw.split_once(':') {
        if !field.is_empty() && !field.contains(' ') {
            let field_match = array.iter().any(|item| {
                item.as_object()
                    .and_then(|obj| obj.get(field))
                    .map(|v| value_equals_raw(v, value_raw))
                    .unwrap_or(false)
            });
            if field_match {
                return Ok(true);
            }
        }
    }

    Ok(array.iter().any(|item| value_equals_raw(item, raw)))
}

/// Compares a JSON value against a raw textual argument: numeric strings
/// convert for comparison, everything else compares as its string form.
fn value_equals_raw(value: &Value, raw: &str) -> bool {
    if let (Value::Number(n), Ok(target)) = (value, raw.parse::<f64>()) {
        if let Some(actual) = n.as_f64() {
            return actual == target;
        }
    }
    match value {
        Value::String(s) => s == raw,
        Value::Bool(b) => b.to_string() == raw,
        Value::Number(n) => n.to_string() == raw,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_length_zero_matches_only_empty_array() {
        assert!(evaluate("arrayLength", Some("0"), &json!([])).unwrap());
        assert!(!evaluate("arrayLength", Some("0"), &json!([1])).unwrap());
    }

    #[test]
    fn array_contains_matches_by_object_field() {
        let actual = json!([{ "name": "get_sfcc_class_info" }, { "name": "other" }]);
        assert!(array_contains(Some("name:get_sfcc_class_info"), &actual).unwrap());
        assert!(!array_contains(Some("name:nonexistent"), &actual).unwrap());
    }

    #[test]
    fn contains_ignore_case_is_case_insensitive() {
        assert!(evaluate("containsIgnoreCase", Some("REQUEST"), &json!("the request body")).unwrap());
    }

    #[test]
    fn type_pattern_matches_json_type_name() {
        assert!(evaluate("type", Some("array"), &json!([1, 2])).unwrap());
        assert!(!evaluate("type", Some("object"), &json!([1, 2])).unwrap());
    }
}
