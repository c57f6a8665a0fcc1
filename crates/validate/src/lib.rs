//! The recursive structural validator (spec §4.4): compares an `expected`
//! JSON value, which may embed `aegis-match` pattern directives at any
//! depth, against an `actual` response.

mod cross_field;
mod expected;
mod path;
mod validator;

pub use expected::{parse, Directive, ExpectedNode};
pub use validator::validate;
