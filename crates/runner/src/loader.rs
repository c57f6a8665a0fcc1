//! Suite discovery and parsing (spec §6): glob-based file discovery, YAML
//! or JSON parsing, and structural validation of the loaded suite.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use aegis_domain::{ServerConfig, TestSuite};

use crate::error::RunnerError;

/// The canonical suite file extension; any path passed explicitly is
/// accepted regardless of extension.
pub const CANONICAL_SUITE_EXTENSION: &str = "test.mcp.yml";

/// Expand a set of glob patterns into a deduplicated, sorted list of suite
/// file paths.
pub fn discover(patterns: &[String]) -> Result<Vec<PathBuf>, RunnerError> {
    let mut paths = HashSet::new();

    for pattern in patterns {
        let direct = Path::new(pattern);
        if direct.is_file() {
            paths.insert(direct.to_path_buf());
            continue;
        }

        let matched = glob::glob(pattern).map_err(|err| RunnerError::ParseFailed {
            path: pattern.clone(),
            message: format!("invalid glob pattern: {err}"),
        })?;

        let mut found_any = false;
        for entry in matched {
            if let Ok(path) = entry {
                found_any = true;
                paths.insert(path);
            }
        }
        if !found_any {
            return Err(RunnerError::NoSuitesMatched {
                pattern: pattern.clone(),
            });
        }
    }

    let mut sorted: Vec<PathBuf> = paths.into_iter().collect();
    sorted.sort();
    Ok(sorted)
}

/// Load and structurally validate one suite file.
pub fn load_suite(path: &Path) -> Result<TestSuite, RunnerError> {
    let path_display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| RunnerError::ReadFailed {
        path: path_display.clone(),
        source,
    })?;

    if let Some(key) = first_duplicate_key(&raw) {
        return Err(RunnerError::DuplicateKey {
            path: path_display,
            key,
        });
    }

    let mut suite = parse_suite(&raw, path).map_err(|message| RunnerError::ParseFailed {
        path: path_display.clone(),
        message,
    })?;
    suite.file_path = Some(path.to_path_buf());

    validate_structure(&suite).map_err(|message| RunnerError::MalformedSuite {
        path: path_display,
        message,
    })?;

    Ok(suite)
}

fn parse_suite(raw: &str, path: &Path) -> Result<TestSuite, String> {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    }
}

fn validate_structure(suite: &TestSuite) -> Result<(), String> {
    if suite.description.trim().is_empty() {
        return Err("suite is missing a description".into());
    }
    for (index, case) in suite.tests.iter().enumerate() {
        if case.it.trim().is_empty() {
            return Err(format!("test #{index} is missing 'it'"));
        }
        if !case.request.is_well_formed() {
            return Err(format!(
                "test '{}' request must have jsonrpc == \"2.0\" and a non-empty method",
                case.it
            ));
        }
        if let Some(perf) = &case.expect.performance {
            if !perf.is_well_formed() {
                return Err(format!(
                    "test '{}' specifies performance expectations but neither maxResponseTime nor minResponseTime",
                    case.it
                ));
            }
        }
    }
    Ok(())
}

/// Best-effort duplicate-sibling-key detector over raw suite text.
///
/// By the time suite text reaches [`serde_yaml`]/[`serde_json`] a duplicate
/// key has already been silently collapsed (last write wins), so detection
/// has to happen against the source text. This walks YAML block-mapping
/// indentation (and bare `{ ... }` flow mappings) and flags the first key
/// repeated at the same nesting level.
fn first_duplicate_key(raw: &str) -> Option<String> {
    let mut stack: Vec<(usize, HashSet<String>)> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("- ") || trimmed == "-" {
            continue;
        }
        let Some((candidate, _)) = trimmed.split_once(':') else {
            continue;
        };
        let key = candidate.trim().trim_matches('"').trim_matches('\'');
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            continue;
        }

        let indent = line.len() - trimmed.len();
        while stack.last().is_some_and(|(level, _)| indent < *level) {
            stack.pop();
        }
        if stack.last().is_none_or(|(level, _)| indent > *level) {
            stack.push((indent, HashSet::new()));
        }

        let (_, seen) = stack.last_mut().expect("just pushed or already present");
        if !seen.insert(key.to_string()) {
            return Some(key.to_string());
        }
    }
    None
}

/// Load a `ServerConfig` from a JSON configuration file (spec §6).
pub fn load_config(path: &Path) -> Result<ServerConfig, RunnerError> {
    let path_display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| RunnerError::ConfigReadFailed {
        path: path_display.clone(),
        source,
    })?;
    let config: ServerConfig = serde_json::from_str(&raw).map_err(|e| RunnerError::ConfigParseFailed {
        path: path_display,
        message: e.to_string(),
    })?;
    config.validate().map_err(RunnerError::Config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_duplicate_sibling_keys_in_a_block_mapping() {
        let raw = "description: demo\ntests:\n  - it: one\n    expect:\n      stderr: toBeEmpty\n      stderr: boom\n";
        assert_eq!(first_duplicate_key(raw).as_deref(), Some("stderr"));
    }

    #[test]
    fn no_false_positive_for_distinct_nested_keys() {
        let raw = "description: demo\ntests:\n  - it: one\n    request:\n      method: a\n  - it: two\n    request:\n      method: b\n";
        assert_eq!(first_duplicate_key(raw), None);
    }

    #[test]
    fn discover_accepts_an_explicit_path_without_glob_expansion() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.test.mcp.yml");
        std::fs::write(&file, "description: x\ntests: []\n").unwrap();

        let found = discover(&[file.to_string_lossy().to_string()]).unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn discover_fails_when_nothing_matches() {
        let result = discover(&["/nonexistent/path/**/*.test.mcp.yml".to_string()]);
        assert!(result.is_err());
    }
}
