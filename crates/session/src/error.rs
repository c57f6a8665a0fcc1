//! Session-level error taxonomy (spec §7): handshake and correlation
//! failures layered on top of `aegis_transport::TransportError`.

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] aegis_transport::TransportError),

    #[error("handshake_failed: server rejected initialize: {0}")]
    HandshakeRejected(String),

    #[error("handshake_failed: initialize response carried no result")]
    HandshakeEmptyResult,

    #[error("protocol_mismatch: server returned protocolVersion {actual}, expected {expected}")]
    ProtocolMismatch { expected: String, actual: String },

    #[error("invalid_state: {operation} is not valid while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("response id {actual} did not match request id {expected}")]
    IdMismatch { expected: String, actual: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// True for the transport failures spec §7 calls out as fatal to the
    /// whole session (`parse_error`, `read_timeout`, `stdin_closed`): the
    /// transport has already stopped itself and must be torn down rather
    /// than reused for the suite's remaining cases.
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(
            self,
            SessionError::Transport(
                aegis_transport::TransportError::ParseError { .. }
                    | aegis_transport::TransportError::ReadTimeout
                    | aegis_transport::TransportError::StdinClosed
            )
        )
    }
}
