//! Transport error taxonomy (spec §7).

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("spawn_failed: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("startup_timeout: server did not match readyPattern within the configured startupTimeout")]
    StartupTimeout,

    #[error("stdin_closed: the MCP server process has exited or stdin is no longer writable")]
    StdinClosed,

    #[error("parse_error: malformed stdout line: {raw_line}")]
    ParseError { raw_line: String },

    #[error("read_timeout: no message arrived within the configured timeout")]
    ReadTimeout,

    #[error("read_in_progress: another nextMessage call is already pending on this transport")]
    ReadInProgress,

    #[error("cancelled: the transport was stopped while a read was pending")]
    Cancelled,

    /// The child process exited (stdout/stderr reached EOF) while neither a
    /// timeout nor an explicit `stop()` was in play. Not part of the
    /// user-visible taxonomy in §7 — callers fold it into `stdin_closed`
    /// (for writes) or surface it as the underlying cause of a test
    /// failure (for reads).
    #[error("the MCP server process exited unexpectedly")]
    ProcessExited,

    #[error("config_invalid: {0}")]
    Config(#[from] aegis_domain::ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
