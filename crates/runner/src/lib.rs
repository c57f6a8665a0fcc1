//! Suite loading and run orchestration for the MCP conformance harness.

mod error;
mod loader;
mod orchestrator;

pub use aegis_domain::RunReport;
pub use error::RunnerError;
pub use loader::{discover, load_config, load_suite, CANONICAL_SUITE_EXTENSION};
pub use orchestrator::run_suites;

use std::path::PathBuf;

use aegis_domain::{ServerConfig, TestSuite};

/// Discover, load, and run every suite matching `patterns` against `config`.
///
/// Suites that fail to load (parse error, malformed structure, duplicate
/// key) are logged and skipped — they never abort the run (spec §7).
pub async fn run(patterns: &[String], config: &ServerConfig) -> Result<RunReport, RunnerError> {
    let paths = discover(patterns)?;
    let suites = load_suites(&paths);
    Ok(run_suites(&suites, config).await)
}

fn load_suites(paths: &[PathBuf]) -> Vec<TestSuite> {
    paths
        .iter()
        .filter_map(|path| match load_suite(path) {
            Ok(suite) => Some(suite),
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to load suite, skipping");
                None
            }
        })
        .collect()
}
