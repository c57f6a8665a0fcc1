//! `match:crossField` comparator: `"<lhs> <op> <rhs>"` with paths resolved
//! against the local actual subobject.

use serde_json::Value;

use crate::path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossFieldOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CrossFieldOp {
    fn as_str(self) -> &'static str {
        match self {
            CrossFieldOp::Lt => "<",
            CrossFieldOp::Le => "<=",
            CrossFieldOp::Gt => ">",
            CrossFieldOp::Ge => ">=",
            CrossFieldOp::Eq => "=",
            CrossFieldOp::Ne => "!=",
        }
    }
}

/// Parse `"<lhs> <op> <rhs>"`. Operators are tried longest-first so `<=`
/// isn't mistaken for `<`.
pub fn parse_expr(expr: &str) -> Option<(String, CrossFieldOp, String)> {
    const OPERATORS: &[(&str, CrossFieldOp)] = &[
        ("<=", CrossFieldOp::Le),
        (">=", CrossFieldOp::Ge),
        ("!=", CrossFieldOp::Ne),
        ("<", CrossFieldOp::Lt),
        (">", CrossFieldOp::Gt),
        ("=", CrossFieldOp::Eq),
    ];

    for (token, op) in OPERATORS {
        if let Some(pos) = expr.find(token) {
            let lhs = expr[..pos].trim();
            let rhs = expr[pos + token.len()..].trim();
            if !lhs.is_empty() && !rhs.is_empty() {
                return Some((lhs.to_string(), *op, rhs.to_string()));
            }
        }
    }
    None
}

/// Evaluate `lhs <op> rhs` where both paths are resolved against `actual`.
/// Returns `Ok(true/false)` once both paths resolve; `Err(())` if either
/// path does not resolve (caller decides pass/fail based on negation).
pub fn evaluate(actual: &Value, lhs_path: &str, op: CrossFieldOp, rhs_path: &str) -> Result<bool, ()> {
    let lhs = path::resolve(actual, lhs_path).ok_or(())?;
    let rhs = path::resolve(actual, rhs_path).ok_or(())?;
    Ok(compare(&lhs, op, &rhs))
}

fn compare(lhs: &Value, op: CrossFieldOp, rhs: &Value) -> bool {
    if let (Some(a), Some(b)) = (aegis_match::as_f64(lhs), aegis_match::as_f64(rhs)) {
        return apply_ordering(a.partial_cmp(&b), op);
    }
    if let (Some(a), Some(b)) = (aegis_match::parse_date(lhs), aegis_match::parse_date(rhs)) {
        return apply_ordering(a.partial_cmp(&b), op);
    }
    let a = lexical(lhs);
    let b = lexical(rhs);
    apply_ordering(a.partial_cmp(&b), op)
}

fn lexical(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_ordering(ordering: Option<std::cmp::Ordering>, op: CrossFieldOp) -> bool {
    use std::cmp::Ordering::*;
    match (ordering, op) {
        (Some(Less), CrossFieldOp::Lt | CrossFieldOp::Le | CrossFieldOp::Ne) => true,
        (Some(Greater), CrossFieldOp::Gt | CrossFieldOp::Ge | CrossFieldOp::Ne) => true,
        (Some(Equal), CrossFieldOp::Le | CrossFieldOp::Ge | CrossFieldOp::Eq) => true,
        _ => false,
    }
}

pub fn describe(lhs_path: &str, op: CrossFieldOp, rhs_path: &str) -> String {
    format!("{lhs_path} {} {rhs_path}", op.as_str())
}
