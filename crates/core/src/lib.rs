//! `aegis-domain` — shared wire types, suite/result models, and server
//! launch configuration for the aegis MCP conformance harness.
//!
//! This crate has no I/O of its own: it is the vocabulary the other
//! crates (`aegis-transport`, `aegis-session`, `aegis-match`,
//! `aegis-validate`, `aegis-runner`, `aegis-client`) speak to each other
//! and to suite/config files on disk.

pub mod config;
pub mod jsonrpc;
pub mod model;

pub use config::{ConfigError, ServerConfig};
pub use jsonrpc::{
    initialize_params, ClientInfo, InitializeParams, JsonRpcError, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, McpToolDef, RequestId, ToolCallContent, ToolCallResult,
    ToolsListResult, MCP_PROTOCOL_VERSION,
};
pub use model::{
    CaseResult, CaseStatus, DurationSpec, Expect, PerformanceExpectation, RunReport, SuiteResult,
    TestCase, TestSuite, ValidationError, ValidationErrorType, ValidationResult,
};
