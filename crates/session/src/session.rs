//! MCP session: drives the `initialize` handshake over a raw [`Transport`]
//! and correlates subsequent requests with their responses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use aegis_domain::{
    initialize_params, ClientInfo, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, McpToolDef, ServerConfig,
    ToolCallResult, ToolsListResult, MCP_PROTOCOL_VERSION,
};
use aegis_transport::Transport;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::SessionError;
use crate::state::SessionState;

/// Grace period after `notifications/initialized` before the session is
/// considered fully settled (spec §3: some servers finish async setup work
/// immediately after the handshake completes).
const POST_INITIALIZE_GRACE: Duration = Duration::from_millis(100);

/// Default time to wait for a response to any single request once the
/// session is `Ready`, absent a per-call override.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A live connection to one MCP server: process, handshake, and the
/// request/response correlation built on top of the raw transport.
pub struct Session {
    transport: Transport,
    state: Mutex<SessionState>,
    next_id: AtomicU64,
    client_info: ClientInfo,
}

impl Session {
    /// Spawn the server process, wait for readiness, and run the
    /// `initialize` / `notifications/initialized` handshake.
    pub async fn start(config: &ServerConfig) -> Result<Self, SessionError> {
        Self::start_as(config, "aegis", env!("CARGO_PKG_VERSION")).await
    }

    /// As [`Session::start`], but advertising a custom client name/version
    /// in the `initialize` handshake.
    pub async fn start_as(
        config: &ServerConfig,
        client_name: impl Into<String>,
        client_version: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let session = Self {
            transport: Transport::start(config).await?,
            state: Mutex::new(SessionState::Starting),
            next_id: AtomicU64::new(1),
            client_info: ClientInfo {
                name: client_name.into(),
                version: client_version.into(),
            },
        };
        *session.state.lock() = SessionState::WaitingReady;

        session.handshake().await?;
        Ok(session)
    }

    async fn handshake(&self) -> Result<(), SessionError> {
        *self.state.lock() = SessionState::Handshaking;

        let params = initialize_params(self.client_info.name.clone(), self.client_info.version.clone());
        let params_value = serde_json::to_value(&params)?;

        let response = self
            .request_raw("initialize", Some(params_value), DEFAULT_REQUEST_TIMEOUT)
            .await?;

        let result = match response.into_result() {
            Ok(result) => result,
            Err(err) => return Err(SessionError::HandshakeRejected(err.to_string())),
        };
        if result.is_null() {
            return Err(SessionError::HandshakeEmptyResult);
        }
        if let Some(actual) = result.get("protocolVersion").and_then(Value::as_str) {
            if actual != MCP_PROTOCOL_VERSION {
                tracing::warn!(
                    expected = MCP_PROTOCOL_VERSION,
                    actual,
                    "server advertised a different protocol version"
                );
            }
        }

        self.notify("notifications/initialized", None).await?;
        tokio::time::sleep(POST_INITIALIZE_GRACE).await;

        *self.state.lock() = SessionState::Ready;
        tracing::info!("MCP session ready");
        Ok(())
    }

    fn next_request_id(&self) -> Value {
        Value::from(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn require_ready(&self, operation: &'static str) -> Result<(), SessionError> {
        let state = *self.state.lock();
        if state == SessionState::Ready {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: state.label(),
            })
        }
    }

    /// Send a raw JSON-RPC request and return its correlated response,
    /// bypassing the `Ready`-state guard (used by the handshake itself).
    async fn request_raw(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<JsonRpcResponse, SessionError> {
        let id = self.next_request_id();
        let request = JsonRpcRequest::new(id.clone(), method, params);
        self.transport.write(&serde_json::to_value(&request)?).await?;

        let raw = self.transport.next_message(timeout).await?;
        let response: JsonRpcResponse = serde_json::from_value(raw)
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;

        if response.id != id {
            return Err(SessionError::IdMismatch {
                expected: id.to_string(),
                actual: response.id.to_string(),
            });
        }
        Ok(response)
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), SessionError> {
        let mut notification = JsonRpcNotification::new(method);
        notification.params = params;
        self.transport.write(&serde_json::to_value(&notification)?).await?;
        Ok(())
    }

    /// Send an arbitrary JSON-RPC request and return its raw response.
    /// Requires the session to be `Ready`.
    pub async fn send_message(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<JsonRpcResponse, SessionError> {
        self.require_ready("send_message")?;
        self.request_raw(method, params, timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .await
    }

    /// `tools/list`.
    pub async fn list_tools(&self) -> Result<Vec<McpToolDef>, SessionError> {
        let response = self.send_message("tools/list", None, None).await?;
        let result = response
            .into_result()
            .map_err(|err| SessionError::HandshakeRejected(err.to_string()))?;
        let parsed: ToolsListResult =
            serde_json::from_value(result).map_err(|e| SessionError::MalformedResponse(e.to_string()))?;
        Ok(parsed.tools)
    }

    /// `tools/call` with the given name and arguments.
    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: Value,
        timeout: Option<Duration>,
    ) -> Result<ToolCallResult, SessionError> {
        let params = serde_json::json!({ "name": tool_name, "arguments": arguments });
        let response = self.send_message("tools/call", Some(params), timeout).await?;
        let result = response
            .into_result()
            .map_err(|err| SessionError::HandshakeRejected(err.to_string()))?;
        serde_json::from_value(result).map_err(|e| SessionError::MalformedResponse(e.to_string()))
    }

    /// Current accumulated stderr text from the underlying process.
    pub fn stderr(&self) -> String {
        self.transport.stderr()
    }

    /// Clear the accumulated stderr buffer (called between test cases).
    pub fn clear_stderr(&self) {
        self.transport.clear_stderr();
    }

    /// The session's current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// True while the underlying process has not exited.
    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    /// Tear the session down: stop the transport and mark `Stopped`.
    pub async fn stop(&self) {
        *self.state.lock() = SessionState::Stopping;
        self.transport.stop().await;
        *self.state.lock() = SessionState::Stopped;
    }
}
