//! Translates the magic-key JSON encoding of `expect.response` into a
//! tagged union (spec §9 design note), so the validator dispatches on a
//! Rust enum instead of re-sniffing object keys at every recursion level.

use serde_json::Value;

use crate::cross_field::{parse_expr, CrossFieldOp};

#[derive(Debug, Clone)]
pub enum ExpectedNode {
    /// A non-pattern scalar (string, number, bool, or null) compared by
    /// strict equality.
    Scalar(Value),
    /// An array of expected nodes, compared pairwise by index.
    ArrayOf(Vec<ExpectedNode>),
    /// An object: directive children (may be empty) plus ordinary fields
    /// that are always validated alongside them.
    ObjectOf {
        directives: Vec<Directive>,
        fields: Vec<(String, ExpectedNode)>,
    },
    /// A `match:...` pattern-string, evaluated by `aegis_match`.
    Pattern(String),
}

#[derive(Debug, Clone)]
pub enum Directive {
    Partial(Box<ExpectedNode>),
    ArrayElements(Box<ExpectedNode>),
    ExtractField { path: String, value: Box<ExpectedNode> },
    CrossField {
        lhs: String,
        op: CrossFieldOp,
        rhs: String,
        negated: bool,
    },
}

const KEY_PARTIAL: &str = "match:partial";
const KEY_ARRAY_ELEMENTS: &str = "match:arrayElements";
const KEY_EXTRACT_FIELD: &str = "match:extractField";
const KEY_CROSS_FIELD: &str = "match:crossField";
const KEY_NOT_CROSS_FIELD: &str = "match:not:crossField";
const KEY_EXTRACTED_VALUE: &str = "value";

/// Parse a raw `expected` JSON value into its tagged-union form.
pub fn parse(value: &Value) -> ExpectedNode {
    match value {
        Value::String(s) if aegis_match::is_pattern_string(s) => {
            ExpectedNode::Pattern(s.trim_start_matches(aegis_match::MATCH_PREFIX).to_string())
        }
        Value::Array(items) => ExpectedNode::ArrayOf(items.iter().map(parse).collect()),
        Value::Object(map) => parse_object(map),
        scalar => ExpectedNode::Scalar(scalar.clone()),
    }
}

fn parse_object(map: &serde_json::Map<String, Value>) -> ExpectedNode {
    let mut directives = Vec::new();
    let mut consumed: Vec<&str> = Vec::new();

    if let Some(sub) = map.get(KEY_PARTIAL) {
        directives.push(Directive::Partial(Box::new(parse(sub))));
        consumed.push(KEY_PARTIAL);
    }
    if let Some(elem) = map.get(KEY_ARRAY_ELEMENTS) {
        directives.push(Directive::ArrayElements(Box::new(parse(elem))));
        consumed.push(KEY_ARRAY_ELEMENTS);
    }
    if let Some(path_value) = map.get(KEY_EXTRACT_FIELD) {
        if let Some(path) = path_value.as_str() {
            let inner = map
                .get(KEY_EXTRACTED_VALUE)
                .map(parse)
                .unwrap_or(ExpectedNode::Scalar(Value::Null));
            directives.push(Directive::ExtractField {
                path: path.to_string(),
                value: Box::new(inner),
            });
            consumed.push(KEY_EXTRACT_FIELD);
            consumed.push(KEY_EXTRACTED_VALUE);
        }
    }
    if let Some(expr_value) = map.get(KEY_CROSS_FIELD) {
        push_cross_field(&mut directives, expr_value, false);
        consumed.push(KEY_CROSS_FIELD);
    } else if let Some(expr_value) = map.get(KEY_NOT_CROSS_FIELD) {
        push_cross_field(&mut directives, expr_value, true);
        consumed.push(KEY_NOT_CROSS_FIELD);
    }

    let fields = map
        .iter()
        .filter(|(key, _)| !consumed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), parse(value)))
        .collect();

    ExpectedNode::ObjectOf { directives, fields }
}

fn push_cross_field(directives: &mut Vec<Directive>, expr_value: &Value, negated: bool) {
    let Some(expr) = expr_value.as_str() else { return };
    let Some((lhs, op, rhs)) = parse_expr(expr) else {
        return;
    };
    directives.push(Directive::CrossField { lhs, op, rhs, negated });
}
