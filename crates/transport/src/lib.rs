//! stdio/JSON-RPC transport for spawned MCP server processes.

pub mod error;
mod process;

pub use error::TransportError;
pub use process::Transport;
