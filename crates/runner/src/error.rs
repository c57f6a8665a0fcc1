//! Runner-level error taxonomy (spec §7): suite loading and per-run
//! failures that are fatal for the whole run or for a single suite.

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("no suite files matched {pattern}")]
    NoSuitesMatched { pattern: String },

    #[error("failed to read suite file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse suite file {path}: {message}")]
    ParseFailed { path: String, message: String },

    #[error("suite file {path} is malformed: {message}")]
    MalformedSuite { path: String, message: String },

    #[error("duplicate key '{key}' in {path}")]
    DuplicateKey { path: String, key: String },

    #[error("config_invalid: {0}")]
    Config(#[from] aegis_domain::ConfigError),

    #[error("failed to read config file {path}: {source}")]
    ConfigReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    ConfigParseFailed { path: String, message: String },

    #[error("session error: {0}")]
    Session(#[from] aegis_session::SessionError),
}
