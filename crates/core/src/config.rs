//! Server launch configuration (C1).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_startup_timeout_ms() -> u64 {
    5_000
}

/// Validated parameters for launching an MCP server under test.
///
/// Required: `name`, `command`, `args`. Everything else defaults per
/// field. `cwd` defaults to the current working directory, `env` is
/// merged onto the host environment at spawn time with child values
/// winning, and `ready_pattern` (when absent) means the server is
/// considered ready the instant it spawns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    #[serde(default)]
    pub ready_pattern: Option<String>,
}

/// Errors that make a [`ServerConfig`] unusable. All map to the
/// `config_invalid` taxonomy entry (see spec §7) and are fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config_invalid: missing required field `{0}`")]
    MissingField(&'static str),

    #[error("config_invalid: startupTimeout must be > 0, got {0}ms")]
    InvalidStartupTimeout(u64),

    #[error("config_invalid: readyPattern `{pattern}` does not compile as a regex: {source}")]
    InvalidReadyPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            cwd: None,
            env: HashMap::new(),
            startup_timeout_ms: default_startup_timeout_ms(),
            ready_pattern: None,
        }
    }

    /// `startupTimeout` as a [`Duration`].
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// The working directory to spawn the child in, defaulting to the
    /// harness's own current directory when unset.
    pub fn effective_cwd(&self) -> PathBuf {
        self.cwd
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Compile `ready_pattern`, if set.
    pub fn ready_regex(&self) -> Result<Option<regex::Regex>, ConfigError> {
        match &self.ready_pattern {
            Some(pattern) => regex::Regex::new(pattern)
                .map(Some)
                .map_err(|source| ConfigError::InvalidReadyPattern {
                    pattern: pattern.clone(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Validate invariants beyond what serde's field types enforce.
    /// Logs (does not fail on) timeouts outside the recommended
    /// `[1s, 30s]` band, per spec §3.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name"));
        }
        if self.command.trim().is_empty() {
            return Err(ConfigError::MissingField("command"));
        }
        if self.startup_timeout_ms == 0 {
            return Err(ConfigError::InvalidStartupTimeout(self.startup_timeout_ms));
        }
        if self.startup_timeout_ms < 1_000 || self.startup_timeout_ms > 30_000 {
            tracing::warn!(
                name = %self.name,
                startup_timeout_ms = self.startup_timeout_ms,
                "startupTimeout is outside the recommended 1s-30s range"
            );
        }
        self.ready_regex()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{ "name": "fs", "command": "npx", "args": ["-y", "server-fs"] }"#,
        )
        .unwrap();
        assert_eq!(cfg.startup_timeout_ms, 5_000);
        assert!(cfg.ready_pattern.is_none());
        assert!(cfg.env.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let cfg = ServerConfig {
            startup_timeout_ms: 0,
            ..ServerConfig::new("x", "echo", vec![])
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidStartupTimeout(0))
        ));
    }

    #[test]
    fn rejects_bad_ready_pattern() {
        let cfg = ServerConfig {
            ready_pattern: Some("(unclosed".into()),
            ..ServerConfig::new("x", "echo", vec![])
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidReadyPattern { .. })
        ));
    }

    #[test]
    fn requires_non_empty_name_and_command() {
        let cfg = ServerConfig::new("", "echo", vec![]);
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingField("name"))));

        let cfg = ServerConfig::new("x", "", vec![]);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingField("command"))
        ));
    }

    #[test]
    fn env_overrides_are_preserved_verbatim() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{ "name": "fs", "command": "node", "args": ["server.js"], "env": { "NODE_ENV": "production" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.env.get("NODE_ENV").unwrap(), "production");
    }
}
