//! Run orchestration (spec §4.5): drives one `Session` per suite,
//! sequentially executes its test cases, and validates each response,
//! stderr, and performance expectation.

use std::time::Instant;

use aegis_domain::{
    CaseResult, CaseStatus, Expect, PerformanceExpectation, ServerConfig, SuiteResult, TestCase, TestSuite,
};
use aegis_session::Session;
use serde_json::Value;

/// Run every discovered suite in sequence and roll the results into a report.
///
/// A suite whose session never reaches `Ready` (startup timeout, handshake
/// rejection) is recorded as one failed case and does not stop the run —
/// subsequent suites still get a fresh session (spec §7). Likewise, a fatal
/// transport error mid-suite (`parse_error`, `read_timeout`, `stdin_closed`)
/// tears that suite's session down and fails its remaining cases without
/// touching the session again; the next suite still gets a fresh spawn.
pub async fn run_suites(suites: &[TestSuite], config: &ServerConfig) -> aegis_domain::RunReport {
    let mut report = aegis_domain::RunReport::default();
    let run_start = Instant::now();

    for suite in suites {
        report.suites.push(run_suite(suite, config).await);
    }

    report.total_duration_ms = run_start.elapsed().as_millis() as u64;
    report.recompute_counts();
    report
}

async fn run_suite(suite: &TestSuite, config: &ServerConfig) -> SuiteResult {
    let suite_start = Instant::now();

    let session = match Session::start(config).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(suite = %suite.description, error = %err, "suite handshake failed, skipping its tests");
            return SuiteResult {
                description: suite.description.clone(),
                file_path: suite.file_path.clone(),
                results: vec![CaseResult {
                    description: suite.description.clone(),
                    status: CaseStatus::Failed,
                    duration_ms: 0,
                    error_message: Some(err.to_string()),
                    expected: None,
                    actual: None,
                    validation: None,
                }],
                duration_ms: suite_start.elapsed().as_millis() as u64,
            };
        }
    };

    let mut results = Vec::with_capacity(suite.tests.len());
    let mut torn_down: Option<String> = None;

    for case in &suite.tests {
        if let Some(reason) = &torn_down {
            results.push(skipped_case(case, reason));
            continue;
        }

        let (result, fatal) = run_case(&session, case).await;
        results.push(result);

        if let Some(reason) = fatal {
            tracing::error!(
                suite = %suite.description,
                error = %reason,
                "fatal transport error mid-suite, tearing down session; remaining cases will fail"
            );
            session.stop().await;
            torn_down = Some(reason);
        }
    }

    if torn_down.is_none() {
        session.stop().await;
    }

    SuiteResult {
        description: suite.description.clone(),
        file_path: suite.file_path.clone(),
        results,
        duration_ms: suite_start.elapsed().as_millis() as u64,
    }
}

/// A synthetic failed result for a case that never ran because an earlier
/// case in the same suite hit a fatal transport error and tore the session
/// down.
fn skipped_case(case: &TestCase, reason: &str) -> CaseResult {
    CaseResult {
        description: case.it.clone(),
        status: CaseStatus::Failed,
        duration_ms: 0,
        error_message: Some(format!(
            "skipped: session was torn down after a prior fatal transport error ({reason})"
        )),
        expected: case.expect.response.clone(),
        actual: None,
        validation: None,
    }
}

/// Run one case. The second element of the return value is `Some(reason)`
/// when the request failed with a session-fatal transport error (spec §7:
/// `parse_error`, `read_timeout`, `stdin_closed`) and `None` otherwise,
/// including for ordinary validation/stderr/performance failures.
async fn run_case(session: &Session, case: &TestCase) -> (CaseResult, Option<String>) {
    session.clear_stderr();
    let start = Instant::now();

    let outcome = session
        .send_message(&case.request.method, case.request.params.clone(), None)
        .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let mut failures = Vec::new();
    let mut actual = None;
    let mut validation = None;
    let mut fatal = None;

    match outcome {
        Ok(response) => {
            let response_value = serde_json::to_value(&response).unwrap_or(Value::Null);
            actual = Some(response_value.clone());

            if let Some(expected) = &case.expect.response {
                let result = aegis_validate::validate(expected, &response_value, "response");
                if !result.passed {
                    failures.push(format!("response validation failed ({} error(s))", result.errors.len()));
                }
                validation = Some(result);
            }
        }
        Err(err) => {
            if err.is_fatal_for_session() {
                fatal = Some(err.to_string());
            }
            failures.push(format!("request failed: {err}"));
        }
    }

    check_stderr(session, &case.expect, &mut failures);
    check_performance(&case.expect.performance, duration_ms, &mut failures);

    let status = if failures.is_empty() {
        CaseStatus::Passed
    } else {
        CaseStatus::Failed
    };

    let result = CaseResult {
        description: case.it.clone(),
        status,
        duration_ms,
        error_message: if failures.is_empty() { None } else { Some(failures.join("; ")) },
        expected: case.expect.response.clone(),
        actual,
        validation,
    };

    (result, fatal)
}

fn check_stderr(session: &Session, expect: &Expect, failures: &mut Vec<String>) {
    let Some(expected_stderr) = &expect.stderr else {
        return;
    };
    let actual_stderr = session.stderr();

    if expected_stderr == "toBeEmpty" {
        if !actual_stderr.trim().is_empty() {
            failures.push(format!("expected empty stderr, got: {}", actual_stderr.trim()));
        }
        return;
    }

    if aegis_match::is_pattern_string(expected_stderr) {
        match aegis_match::evaluate_match_string(expected_stderr, &Value::String(actual_stderr.clone())) {
            Ok(true) => {}
            Ok(false) => failures.push(format!("stderr did not match '{expected_stderr}'")),
            Err(err) => failures.push(format!("stderr pattern error: {err}")),
        }
        return;
    }

    if actual_stderr.trim() != expected_stderr.trim() {
        failures.push(format!(
            "stderr mismatch: expected '{}', got '{}'",
            expected_stderr.trim(),
            actual_stderr.trim()
        ));
    }
}

fn check_performance(performance: &Option<PerformanceExpectation>, duration_ms: u64, failures: &mut Vec<String>) {
    let Some(perf) = performance else {
        return;
    };
    if let Some(max) = perf.max_response_time {
        let max_ms = max.as_duration().as_millis() as u64;
        if duration_ms > max_ms {
            failures.push(format!("response took {duration_ms}ms, exceeding max of {max_ms}ms"));
        }
    }
    if let Some(min) = perf.min_response_time {
        let min_ms = min.as_duration().as_millis() as u64;
        if duration_ms < min_ms {
            failures.push(format!("response took {duration_ms}ms, under the min of {min_ms}ms"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_domain::DurationSpec;
    use std::time::Duration;

    #[test]
    fn performance_check_flags_an_overrun() {
        let perf = Some(PerformanceExpectation {
            max_response_time: Some(DurationSpec(Duration::from_millis(50))),
            min_response_time: None,
        });
        let mut failures = Vec::new();
        check_performance(&perf, 120, &mut failures);
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn performance_check_flags_an_underrun() {
        let perf = Some(PerformanceExpectation {
            max_response_time: None,
            min_response_time: Some(DurationSpec(Duration::from_millis(50))),
        });
        let mut failures = Vec::new();
        check_performance(&perf, 5, &mut failures);
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn performance_check_passes_within_bounds() {
        let perf = Some(PerformanceExpectation {
            max_response_time: Some(DurationSpec(Duration::from_millis(200))),
            min_response_time: Some(DurationSpec(Duration::from_millis(10))),
        });
        let mut failures = Vec::new();
        check_performance(&perf, 50, &mut failures);
        assert!(failures.is_empty());
    }
}
