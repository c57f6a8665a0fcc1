//! Programmatic facade over [`aegis_session::Session`] (spec §6): the
//! shape a Rust caller (or the `aegis` CLI's `query` mode) reaches for
//! instead of talking to `aegis-session` directly.

use std::time::Duration;

use aegis_domain::{JsonRpcResponse, McpToolDef, ServerConfig, ToolCallResult};
use aegis_session::{Session, SessionError};
use serde_json::Value;

/// A connected MCP client: spawn, handshake, call, disconnect.
pub struct Client {
    session: Session,
}

impl Client {
    /// Spawn the configured server and run the `initialize` handshake.
    pub async fn connect(config: &ServerConfig) -> Result<Self, SessionError> {
        let session = Session::start(config).await?;
        Ok(Self { session })
    }

    /// `tools/list`.
    pub async fn list_tools(&self) -> Result<Vec<McpToolDef>, SessionError> {
        self.session.list_tools().await
    }

    /// `tools/call` with the given name and arguments.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
        timeout: Option<Duration>,
    ) -> Result<ToolCallResult, SessionError> {
        self.session.call_tool(name, arguments, timeout).await
    }

    /// Send an arbitrary JSON-RPC request and return the raw response.
    pub async fn send_message(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<JsonRpcResponse, SessionError> {
        self.session.send_message(method, params, timeout).await
    }

    /// Accumulated stderr text from the underlying process.
    pub fn stderr(&self) -> String {
        self.session.stderr()
    }

    /// Clear the accumulated stderr buffer.
    pub fn clear_stderr(&self) {
        self.session.clear_stderr();
    }

    /// Clear every buffer the client tracks (currently just stderr — kept
    /// as its own method since the spec's CLI surface names it
    /// separately from `clear_stderr`).
    pub fn clear_all_buffers(&self) {
        self.session.clear_stderr();
    }

    /// Tear the connection down.
    pub async fn disconnect(self) {
        self.session.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_SERVER: &str = r#"
import sys, json

for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    msg = json.loads(line)
    if "id" not in msg:
        continue
    if msg["method"] == "initialize":
        resp = {"jsonrpc": "2.0", "id": msg["id"], "result": {"protocolVersion": "2025-06-18"}}
    elif msg["method"] == "tools/call":
        resp = {"jsonrpc": "2.0", "id": msg["id"], "result": {"content": [{"type": "text", "text": "pong"}], "isError": False}}
    else:
        resp = {"jsonrpc": "2.0", "id": msg["id"], "error": {"code": -32601, "message": "method not found"}}
    sys.stdout.write(json.dumps(resp) + "\n")
    sys.stdout.flush()
"#;

    fn fake_server_config() -> ServerConfig {
        let mut config = ServerConfig::new("fake-server", "python3", vec!["-c".into(), FAKE_SERVER.into()]);
        config.startup_timeout_ms = 2_000;
        config
    }

    #[tokio::test]
    async fn connect_call_disconnect_round_trips() {
        let client = Client::connect(&fake_server_config()).await.expect("connects");
        let result = client
            .call_tool("ping", serde_json::json!({}), None)
            .await
            .expect("tools/call succeeds");
        assert_eq!(result.content[0].text, "pong");
        client.disconnect().await;
    }
}
