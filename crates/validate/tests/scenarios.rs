use aegis_domain::ValidationErrorType;
use aegis_validate::validate;
use serde_json::json;

#[test]
fn tools_list_happy_path() {
    let expected = json!("match:arrayLength:1");
    let actual = json!([{ "name": "read_file", "description": "Reads a file", "inputSchema": { "type": "object" } }]);
    assert!(validate(&expected, &actual, "response.result.tools").passed);
}

#[test]
fn pattern_negation_passes() {
    let expected = json!("match:not:arrayLength:0");
    let actual = json!([{ "name": "read_file" }]);
    assert!(validate(&expected, &actual, "response.result.tools").passed);
}

#[test]
fn array_contains_object_field_then_fails_on_change() {
    let actual = json!([{ "name": "get_sfcc_class_info" }]);
    assert!(validate(&json!("match:arrayContains:name:get_sfcc_class_info"), &actual, "response.result.tools").passed);

    let result = validate(&json!("match:arrayContains:name:nonexistent"), &actual, "response.result.tools");
    assert!(!result.passed);
    assert_eq!(result.errors[0].kind, ValidationErrorType::PatternFailed);
    assert_eq!(result.errors[0].path, "response.result.tools");
}

#[test]
fn partial_does_not_short_circuit_sibling_validation() {
    let expected = json!({
        "match:partial": { "isError": false },
        "content": [{ "type": "text", "text": "match:contains:request" }]
    });
    let actual = json!({
        "isError": false,
        "content": [{ "type": "text", "text": "...requesst..." }]
    });
    let result = validate(&expected, &actual, "response");
    assert!(!result.passed);
    assert!(result
        .errors
        .iter()
        .any(|e| e.kind == ValidationErrorType::PatternFailed && e.path == "response.content[0].text"));
}

#[test]
fn cross_field_nested_passes_then_fails_with_located_error() {
    let expected = json!({ "account": { "credit": { "match:crossField": "used <= limit" } } });

    let ok = json!({ "account": { "credit": { "used": 750, "limit": 2000 } } });
    assert!(validate(&expected, &ok, "response").passed);

    let bad = json!({ "account": { "credit": { "used": 2500, "limit": 2000 } } });
    let result = validate(&expected, &bad, "response");
    assert!(!result.passed);
    assert_eq!(result.errors[0].path, "response.account.credit");
    assert_eq!(result.errors[0].kind, ValidationErrorType::PatternFailed);
    assert!(result.errors[0].message.contains("used <= limit"));
}

#[test]
fn pure_json_round_trip_with_no_patterns() {
    let value = json!({ "a": 1, "nested": { "b": [1, 2, 3] } });
    assert!(validate(&value, &value, "response").passed);
}

#[test]
fn extra_keys_fail_unless_partial_is_used() {
    let expected = json!({ "a": 1 });
    let actual_exact = json!({ "a": 1 });
    assert!(validate(&expected, &actual_exact, "response").passed);

    let actual_extra = json!({ "a": 1, "b": 2 });
    assert!(!validate(&expected, &actual_extra, "response").passed);

    let partial_expected = json!({ "match:partial": { "a": 1 } });
    assert!(validate(&partial_expected, &actual_extra, "response").passed);
}

#[test]
fn extract_field_with_wildcard_validates_extracted_values() {
    let expected = json!({
        "match:extractField": "tools.*.name",
        "value": ["read_file", "write_file"]
    });
    let actual = json!({ "tools": [{ "name": "read_file" }, { "name": "write_file" }] });
    assert!(validate(&expected, &actual, "response").passed);
}
