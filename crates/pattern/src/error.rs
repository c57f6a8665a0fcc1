//! Pattern engine error taxonomy (spec §7: `pattern_unknown`, `pattern_failed`).

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("unknown pattern '{name}'{}", suggestion_suffix(suggestion))]
    UnknownPattern {
        name: String,
        suggestion: Option<String>,
    },

    #[error("pattern '{pattern}' expects {expected}, got '{raw_args}'")]
    ArityMismatch {
        pattern: &'static str,
        expected: &'static str,
        raw_args: String,
    },

    #[error("pattern '{pattern}' has an invalid argument: {message}")]
    InvalidArgument { pattern: &'static str, message: String },

    #[error("invalid regex in pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: &'static str,
        #[source]
        source: regex::Error,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(", did you mean '{name}'?"),
        None => String::new(),
    }
}
