//! Splits a pattern expression into its name and raw argument tail.
//!
//! The `name:arg1:arg2` grammar is ambiguous in general (arguments such as
//! dates or paths may themselves contain colons), so only the *name* is
//! tokenized here. Each pattern family is responsible for parsing its own
//! argument tail however it needs to (see `numeric::split_args`,
//! `date::split_args`).

/// Split `[not:]?name[:rest]` into `(negated, name, rest)`.
pub fn split_negation(expr: &str) -> (bool, &str) {
    match expr.strip_prefix("not:") {
        Some(rest) => (true, rest),
        None => (false, expr),
    }
}

/// Split `name[:rest]` into `(name, Option<rest>)` on the first colon.
pub fn split_name(expr: &str) -> (&str, Option<&str>) {
    match expr.split_once(':') {
        Some((name, rest)) => (name, Some(rest)),
        None => (expr, None),
    }
}

/// Split a raw argument tail on the first colon only, leaving any further
/// colons inside the second half untouched. Used by two-argument patterns
/// (`approximately:V:TOL`, `arrayContains:F:V`) whose second argument may
/// itself contain colons.
pub fn split_once_colon(raw: &str) -> Option<(&str, &str)> {
    raw.split_once(':')
}
