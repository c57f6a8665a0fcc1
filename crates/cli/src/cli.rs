use clap::{Parser, Subcommand};

/// aegis — a black-box MCP server conformance harness.
#[derive(Debug, Parser)]
#[command(name = "aegis", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and execute test suites against a configured MCP server.
    Run {
        /// Suite file globs (default: `**/*.test.mcp.yml`).
        globs: Vec<String>,
        /// Path to the server launch config (default: ./aegis.config.json).
        #[arg(long)]
        config: Option<String>,
        /// Suppress per-case output, print only the final summary.
        #[arg(long)]
        quiet: bool,
        /// Print every case, including passing ones, with full detail.
        #[arg(long)]
        verbose: bool,
        /// Include per-case durations in the summary.
        #[arg(long)]
        timing: bool,
        /// Enable debug-level tracing.
        #[arg(long)]
        debug: bool,
        /// Print the run report as JSON instead of a human summary.
        #[arg(long)]
        json: bool,
    },
    /// Call a single tool once and print the raw response, bypassing suites.
    Query {
        /// Path to the server launch config.
        #[arg(long)]
        config: String,
        /// Tool name to call.
        #[arg(long)]
        tool: String,
        /// JSON arguments for the tool call (default: `{}`).
        #[arg(long)]
        args: Option<String>,
    },
}

pub const DEFAULT_SUITE_GLOB: &str = "**/*.test.mcp.yml";
pub const DEFAULT_CONFIG_PATH: &str = "./aegis.config.json";
