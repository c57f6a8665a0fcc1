//! The recursive structural validator (spec §4.4): walks an `ExpectedNode`
//! against an `actual` JSON value, accumulating path-annotated errors
//! without ever short-circuiting on a directive.

use aegis_domain::{ValidationError, ValidationErrorType, ValidationResult};
use serde_json::Value;

use crate::cross_field;
use crate::expected::{Directive, ExpectedNode};
use crate::path;

/// Validate `expected` against `actual`, with `root_path` as the prefix for
/// every reported error path (typically `"response"`).
pub fn validate(expected: &Value, actual: &Value, root_path: &str) -> ValidationResult {
    let node = crate::expected::parse(expected);
    let mut errors = Vec::new();
    validate_node(&node, actual, root_path, &mut errors);
    ValidationResult::from_errors(errors)
}

fn validate_node(node: &ExpectedNode, actual: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match node {
        ExpectedNode::Pattern(expr) => validate_pattern(expr, actual, path, errors),
        ExpectedNode::Scalar(expected_value) => validate_scalar(expected_value, actual, path, errors),
        ExpectedNode::ArrayOf(elements) => validate_array(elements, actual, path, errors),
        ExpectedNode::ObjectOf { directives, fields } => {
            if directives.is_empty() {
                validate_object_fields(fields, actual, path, false, errors);
                return;
            }
            for directive in directives {
                validate_directive(directive, actual, path, errors);
            }
            // Rule 3: sibling plain keys validate in the same pass as any
            // directive — composition is mandatory, never short-circuited.
            if !fields.is_empty() {
                validate_object_fields(fields, actual, path, true, errors);
            }
        }
    }
}

fn validate_pattern(expr: &str, actual: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match aegis_match::evaluate(expr, actual) {
        Ok(true) => {}
        Ok(false) => errors.push(
            ValidationError::new(
                ValidationErrorType::PatternFailed,
                path,
                format!("pattern 'match:{expr}' did not match"),
            )
            .with_actual(actual.clone()),
        ),
        Err(aegis_match::PatternError::UnknownPattern { name, suggestion }) => {
            let mut error = ValidationError::new(
                ValidationErrorType::PatternFailed,
                path,
                format!("unknown pattern '{name}'"),
            );
            if let Some(suggestion) = suggestion {
                error = error.with_suggestion(format!("did you mean 'match:{suggestion}'?"));
            }
            errors.push(error);
        }
        Err(other) => {
            errors.push(ValidationError::new(
                ValidationErrorType::PatternFailed,
                path,
                other.to_string(),
            ));
        }
    }
}

fn validate_scalar(expected_value: &Value, actual: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    if expected_value == actual {
        return;
    }
    if std::mem::discriminant(expected_value) != std::mem::discriminant(actual) {
        errors.push(
            ValidationError::new(ValidationErrorType::TypeMismatch, path, "value has an unexpected type")
                .with_expected(expected_value.clone())
                .with_actual(actual.clone()),
        );
        return;
    }
    errors.push(
        ValidationError::new(ValidationErrorType::ValueMismatch, path, "value does not match")
            .with_expected(expected_value.clone())
            .with_actual(actual.clone()),
    );
}

fn validate_array(elements: &[ExpectedNode], actual: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(actual_items) = actual.as_array() else {
        errors.push(
            ValidationError::new(ValidationErrorType::TypeMismatch, path, "expected an array")
                .with_actual(actual.clone()),
        );
        return;
    };
    if actual_items.len() != elements.len() {
        errors.push(
            ValidationError::new(
                ValidationErrorType::LengthMismatch,
                path,
                format!(
                    "expected array of length {}, got {}",
                    elements.len(),
                    actual_items.len()
                ),
            )
            .with_suggestion("remove or add elements, or use match:arrayElements for a variable-length array".into()),
        );
        return;
    }
    for (index, (expected_item, actual_item)) in elements.iter().zip(actual_items).enumerate() {
        validate_node(expected_item, actual_item, &format!("{path}[{index}]"), errors);
    }
}

fn validate_object_fields(
    fields: &[(String, ExpectedNode)],
    actual: &Value,
    path: &str,
    partial: bool,
    errors: &mut Vec<ValidationError>,
) {
    let Some(actual_obj) = actual.as_object() else {
        errors.push(
            ValidationError::new(ValidationErrorType::TypeMismatch, path, "expected an object")
                .with_actual(actual.clone()),
        );
        return;
    };

    for (key, expected_child) in fields {
        let child_path = format!("{path}.{key}");
        match actual_obj.get(key) {
            Some(actual_child) => validate_node(expected_child, actual_child, &child_path, errors),
            None => errors.push(ValidationError::new(
                ValidationErrorType::MissingField,
                child_path,
                format!("missing field '{key}'"),
            )),
        }
    }

    if !partial {
        let expected_keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        for key in actual_obj.keys() {
            if !expected_keys.contains(&key.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorType::ExtraField,
                    format!("{path}.{key}"),
                    format!("unexpected field '{key}'"),
                ));
            }
        }
    }
}

fn validate_directive(directive: &Directive, actual: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match directive {
        Directive::Partial(sub) => validate_partial(sub, actual, path, errors),
        Directive::ArrayElements(elem) => validate_array_elements(elem, actual, path, errors),
        Directive::ExtractField { path: field_path, value } => {
            validate_extract_field(field_path, value, actual, path, errors)
        }
        Directive::CrossField { lhs, op, rhs, negated } => {
            validate_cross_field(lhs, *op, rhs, *negated, actual, path, errors)
        }
    }
}

fn validate_partial(sub: &ExpectedNode, actual: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match sub {
        ExpectedNode::ObjectOf { directives, fields } => {
            for directive in directives {
                validate_directive(directive, actual, path, errors);
            }
            validate_object_fields(fields, actual, path, true, errors);
        }
        other => validate_node(other, actual, path, errors),
    }
}

fn validate_array_elements(elem: &ExpectedNode, actual: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(items) = actual.as_array() else {
        errors.push(
            ValidationError::new(ValidationErrorType::TypeMismatch, path, "match:arrayElements requires an array")
                .with_actual(actual.clone()),
        );
        return;
    };
    for (index, item) in items.iter().enumerate() {
        let element_path = format!("{path}[{index}]");
        match elem {
            ExpectedNode::ObjectOf { directives, fields } => {
                for directive in directives {
                    validate_directive(directive, item, &element_path, errors);
                }
                validate_object_fields(fields, item, &element_path, true, errors);
            }
            other => validate_node(other, item, &element_path, errors),
        }
    }
}

fn validate_extract_field(
    field_path: &str,
    value: &ExpectedNode,
    actual: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    match path::resolve(actual, field_path) {
        Some(extracted) => validate_node(value, &extracted, &format!("{path} (extractField:{field_path})"), errors),
        None => errors.push(ValidationError::new(
            ValidationErrorType::PatternFailed,
            path,
            format!("extractField path '{field_path}' did not resolve"),
        )),
    }
}

fn validate_cross_field(
    lhs: &str,
    op: cross_field::CrossFieldOp,
    rhs: &str,
    negated: bool,
    actual: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let description = cross_field::describe(lhs, op, rhs);
    match cross_field::evaluate(actual, lhs, op, rhs) {
        Ok(true) if !negated => {}
        Ok(false) if negated => {}
        Ok(_) => errors.push(ValidationError::new(
            ValidationErrorType::PatternFailed,
            path,
            format!("crossField '{description}' did not hold"),
        )),
        // Path did not resolve: positive form fails, negated form succeeds.
        Err(()) if negated => {}
        Err(()) => errors.push(ValidationError::new(
            ValidationErrorType::PatternFailed,
            path,
            format!("crossField '{description}' could not be evaluated: a referenced path did not resolve"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pure_json_with_no_patterns_round_trips() {
        let value = json!({ "a": 1, "b": [1, 2, 3] });
        assert!(validate(&value, &value, "response").passed);
    }

    #[test]
    fn extra_keys_fail_unless_partial() {
        let expected = json!({ "a": 1 });
        let actual = json!({ "a": 1, "b": 2 });
        assert!(!validate(&expected, &actual, "response").passed);
    }

    #[test]
    fn partial_allows_extra_keys_but_still_validates_siblings() {
        let expected = json!({
            "match:partial": { "isError": false },
            "content": [{ "type": "text", "text": "match:contains:request" }]
        });
        let actual = json!({
            "isError": false,
            "extra": "ignored",
            "content": [{ "type": "text", "text": "...requesst..." }]
        });
        let result = validate(&expected, &actual, "response");
        assert!(!result.passed);
        assert!(result.errors.iter().any(|e| e.path == "response.content[0].text"));
    }

    #[test]
    fn cross_field_nested_in_a_subobject() {
        let expected = json!({ "account": { "credit": { "match:crossField": "used <= limit" } } });
        let ok = json!({ "account": { "credit": { "used": 750, "limit": 2000 } } });
        assert!(validate(&expected, &ok, "response").passed);

        let bad = json!({ "account": { "credit": { "used": 2500, "limit": 2000 } } });
        let result = validate(&expected, &bad, "response");
        assert!(!result.passed);
        assert_eq!(result.errors[0].path, "response.account.credit");
    }

    #[test]
    fn array_length_mismatch_is_reported() {
        let expected = json!([1, 2, 3]);
        let actual = json!([1, 2]);
        let result = validate(&expected, &actual, "response");
        assert!(!result.passed);
        assert_eq!(result.errors[0].kind, ValidationErrorType::LengthMismatch);
    }
}
