//! The `match:` pattern DSL (spec §4.3): a small tagged-string language for
//! asserting properties of a JSON value without writing out its exact
//! shape.

mod date;
mod engine;
mod error;
mod general;
mod names;
mod numeric;
mod tokenize;

pub use date::parse_date;
pub use engine::{evaluate, evaluate_match_string, is_pattern_string, MATCH_PREFIX};
pub use error::PatternError;
pub use names::{suggest, KNOWN_PATTERNS};
pub use numeric::as_f64;
