//! Suite/result data model (§3): the shapes the runner reads suite files
//! into and writes reports out of.

use std::path::PathBuf;
use std::time::Duration;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::jsonrpc::JsonRpcRequest;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Suite / test case
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A loaded suite file: a description plus an ordered list of test cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub description: String,
    pub tests: Vec<TestCase>,
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

/// One `it: ... / request: ... / expect: ...` entry in a suite file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub it: String,
    pub request: JsonRpcRequest,
    #[serde(default)]
    pub expect: Expect,
}

/// The three independently-optional expectation kinds a test case may carry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Expect {
    /// An expected JSON value, possibly embedding pattern directives at
    /// any depth. Interpreted by `aegis-validate`.
    #[serde(default)]
    pub response: Option<Value>,

    /// `toBeEmpty`, a literal string, or `match:<pattern>` — evaluated
    /// against trimmed/raw stderr by the runner.
    #[serde(default)]
    pub stderr: Option<String>,

    #[serde(default)]
    pub performance: Option<PerformanceExpectation>,
}

/// `{ maxResponseTime?, minResponseTime? }`, each a duration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceExpectation {
    #[serde(default)]
    pub max_response_time: Option<DurationSpec>,
    #[serde(default)]
    pub min_response_time: Option<DurationSpec>,
}

impl PerformanceExpectation {
    /// §4.5 rule 7: at least one bound must be present if `performance` is
    /// specified at all.
    pub fn is_well_formed(&self) -> bool {
        self.max_response_time.is_some() || self.min_response_time.is_some()
    }
}

/// A duration accepted as a bare number of milliseconds or a string like
/// `"100ms"` / `"1s"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DurationSpec(pub Duration);

impl DurationSpec {
    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// Parse the `<number>ms` / `<number>s` / bare-number-of-ms grammar.
    pub fn parse(raw: &str) -> Result<Duration, String> {
        let trimmed = raw.trim();
        if let Some(num) = trimmed.strip_suffix("ms") {
            let n: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid duration `{raw}`"))?;
            return Ok(Duration::from_secs_f64(n / 1000.0));
        }
        if let Some(num) = trimmed.strip_suffix('s') {
            let n: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid duration `{raw}`"))?;
            return Ok(Duration::from_secs_f64(n));
        }
        let n: f64 = trimmed
            .parse()
            .map_err(|_| format!("invalid duration `{raw}`"))?;
        Ok(Duration::from_secs_f64(n / 1000.0))
    }
}

impl<'de> Deserialize<'de> for DurationSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let duration = match &value {
            Value::Number(n) => {
                let ms = n
                    .as_f64()
                    .ok_or_else(|| DeError::custom("duration must be a number or string"))?;
                Duration::from_secs_f64(ms / 1000.0)
            }
            Value::String(s) => DurationSpec::parse(s).map_err(DeError::custom)?,
            other => return Err(DeError::custom(format!("invalid duration value: {other}"))),
        };
        Ok(DurationSpec(duration))
    }
}

impl Serialize for DurationSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0.as_secs_f64() * 1000.0)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorType {
    MissingField,
    ExtraField,
    TypeMismatch,
    PatternFailed,
    ValueMismatch,
    LengthMismatch,
}

/// One path-annotated mismatch produced by the structural validator or the
/// pattern engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorType,
    /// Dotted, `[i]`-indexed path into the actual response.
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorType, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
            expected: None,
            actual: None,
            suggestion: None,
        }
    }

    pub fn with_expected(mut self, expected: Value) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_actual(mut self, actual: Value) -> Self {
        self.actual = Some(actual);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// The outcome of a single `validate(expected, actual)` call. `passed` is
/// always exactly `errors.is_empty()` — enforced by the constructors below,
/// never by hand.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ValidationResult {
    pub passed: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            passed: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        let passed = errors.is_empty();
        Self { passed, errors }
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.passed = false;
    }

    pub fn merge(&mut self, mut other: ValidationResult) {
        self.errors.append(&mut other.errors);
        self.passed = self.errors.is_empty();
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-case / per-suite / per-run results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
}

/// The one result record a `TestCase` produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub description: String,
    pub status: CaseStatus,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl CaseResult {
    pub fn is_passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Per-suite rollup the runner accumulates while iterating tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub description: String,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    pub results: Vec<CaseResult>,
    pub duration_ms: u64,
}

impl SuiteResult {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(CaseResult::is_passed)
    }
}

/// The structured summary emitted after a whole run (§4.5) — the only
/// required output; a human-readable renderer is an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunReport {
    pub suites: Vec<SuiteResult>,
    pub total_duration_ms: u64,
    pub passed: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Roll per-suite case counts up into `passed`/`failed`.
    pub fn recompute_counts(&mut self) {
        let mut passed = 0;
        let mut failed = 0;
        for suite in &self.suites {
            for case in &suite.results {
                if case.is_passed() {
                    passed += 1;
                } else {
                    failed += 1;
                }
            }
        }
        self.passed = passed;
        self.failed = failed;
    }
}
