//! Top-level pattern dispatch: negation, the three pattern families, and
//! the regex-or-substring fallback for unregistered `match:` expressions.

use serde_json::Value;

use crate::date::{self, DATE_NAMES};
use crate::error::PatternError;
use crate::general::{self, GENERAL_NAMES};
use crate::names::suggest;
use crate::numeric::{self, NUMERIC_NAMES};
use crate::tokenize::{split_name, split_negation};

/// The literal prefix identifying a pattern-string in suite/config data.
pub const MATCH_PREFIX: &str = "match:";

/// True iff `s` is a pattern-string (`match:...`).
pub fn is_pattern_string(s: &str) -> bool {
    s.starts_with(MATCH_PREFIX)
}

/// Evaluate a pattern expression (without the `match:` prefix) against
/// `actual`. `[not:]?name[:args]`.
pub fn evaluate(expr: &str, actual: &Value) -> Result<bool, PatternError> {
    let (negated, expr) = split_negation(expr);
    let result = evaluate_positive(expr, actual)?;
    Ok(if negated { !result } else { result })
}

/// Evaluate a full `match:...` string, stripping the prefix first.
pub fn evaluate_match_string(raw: &str, actual: &Value) -> Result<bool, PatternError> {
    let expr = raw.strip_prefix(MATCH_PREFIX).unwrap_or(raw);
    evaluate(expr, actual)
}

fn evaluate_positive(expr: &str, actual: &Value) -> Result<bool, PatternError> {
    let (name, raw_args) = split_name(expr);

    if GENERAL_NAMES.contains(&name) {
        return general::evaluate(name, raw_args, actual);
    }
    if NUMERIC_NAMES.contains(&name) {
        return numeric::evaluate(name, raw_args, actual);
    }
    if DATE_NAMES.contains(&name) {
        return date::evaluate(name, raw_args, actual);
    }

    // Backward-compatible fallback: treat an unrecognized `match:` body as
    // a literal regex if it looks like one, else a plain substring test.
    if looks_like_regex(expr) {
        if let Ok(re) = regex::Regex::new(expr) {
            return Ok(re.is_match(&actual_as_string(actual)));
        }
    }
    if !name.is_empty() && raw_args.is_none() {
        return Ok(actual_as_string(actual).contains(expr));
    }

    Err(PatternError::UnknownPattern {
        name: name.to_string(),
        suggestion: suggest(name),
    })
}

fn actual_as_string(actual: &Value) -> String {
    match actual {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

const REGEX_METACHARACTERS: &[char] = &['^', '$', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '\\'];

fn looks_like_regex(expr: &str) -> bool {
    expr.chars().any(|c| REGEX_METACHARACTERS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn negation_inverts_any_non_negated_pattern() {
        let actual = json!([]);
        assert!(evaluate("not:arrayLength:1", &actual).unwrap());
        assert!(!evaluate("arrayLength:1", &actual).unwrap());
    }

    #[test]
    fn not_exists_means_absent_or_null() {
        assert!(evaluate("not:exists", &Value::Null).unwrap());
        assert!(!evaluate("not:exists", &json!("present")).unwrap());
    }

    #[test]
    fn unknown_pattern_name_is_an_error_with_a_suggestion() {
        let err = evaluate("arrayLenght:1", &json!([1])).unwrap_err();
        match err {
            PatternError::UnknownPattern { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("arrayLength"));
            }
            other => panic!("expected UnknownPattern, got {other:?}"),
        }
    }

    #[test]
    fn fallback_treats_non_metacharacter_body_as_substring() {
        assert!(evaluate("hello world", &json!("say hello world now")).unwrap());
    }

    #[test]
    fn fallback_treats_metacharacter_body_as_regex() {
        assert!(evaluate(r"^\d+$", &json!("12345")).unwrap());
    }
}
