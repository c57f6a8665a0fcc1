use aegis_domain::{CaseStatus, Expect, JsonRpcRequest, PerformanceExpectation, ServerConfig, TestCase, TestSuite};
use aegis_runner::run_suites;
use serde_json::json;

/// Answers `tools/list` and `tools/call`, and prints one diagnostic line to
/// stderr whenever it handles `tools/call`.
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
    elif msg["method"] == "tools/list":
        resp = {"jsonrpc": "2.0", "id": msg["id"], "result": {"tools": [{"name": "ping"}]}}
    elif msg["method"] == "tools/call":
        sys.stderr.write("handled tools/call\n")
        sys.stderr.flush()
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

fn suite_with(tests: Vec<TestCase>) -> TestSuite {
    TestSuite {
        description: "end to end".into(),
        tests,
        file_path: None,
    }
}

#[tokio::test]
async fn a_passing_case_validates_response_and_records_duration() {
    let case = TestCase {
        it: "lists tools".into(),
        request: JsonRpcRequest::new(json!(1), "tools/list", None),
        expect: Expect {
            response: Some(json!({ "tools": [{ "name": "ping" }] })),
            stderr: Some("toBeEmpty".into()),
            performance: None,
        },
    };
    let report = run_suites(&[suite_with(vec![case])], &fake_server_config()).await;

    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 0);
    let result = &report.suites[0].results[0];
    assert_eq!(result.status, CaseStatus::Passed);
}

#[tokio::test]
async fn a_mismatched_response_is_recorded_as_failed_with_validation_errors() {
    let case = TestCase {
        it: "wrong tool name".into(),
        request: JsonRpcRequest::new(json!(1), "tools/list", None),
        expect: Expect {
            response: Some(json!({ "tools": [{ "name": "nonexistent" }] })),
            stderr: None,
            performance: None,
        },
    };
    let report = run_suites(&[suite_with(vec![case])], &fake_server_config()).await;

    assert_eq!(report.failed, 1);
    let result = &report.suites[0].results[0];
    assert_eq!(result.status, CaseStatus::Failed);
    assert!(result.validation.as_ref().unwrap().errors.len() > 0);
}

#[tokio::test]
async fn stderr_expectation_checks_what_the_tool_call_actually_wrote() {
    let case = TestCase {
        it: "calls a tool and checks stderr".into(),
        request: JsonRpcRequest::new(
            json!(1),
            "tools/call",
            Some(json!({ "name": "ping", "arguments": {} })),
        ),
        expect: Expect {
            response: None,
            stderr: Some("match:contains:handled".into()),
            performance: None,
        },
    };
    let report = run_suites(&[suite_with(vec![case])], &fake_server_config()).await;
    assert_eq!(report.passed, 1);
}

#[tokio::test]
async fn performance_violation_fails_the_case() {
    let case = TestCase {
        it: "impossible performance bound".into(),
        request: JsonRpcRequest::new(json!(1), "tools/list", None),
        expect: Expect {
            response: None,
            stderr: None,
            performance: Some(PerformanceExpectation {
                max_response_time: Some(aegis_domain::DurationSpec(std::time::Duration::from_millis(0))),
                min_response_time: None,
            }),
        },
    };
    let report = run_suites(&[suite_with(vec![case])], &fake_server_config()).await;
    assert_eq!(report.failed, 1);
}

/// Answers the first `tools/list` normally, then writes one unparseable
/// line to stdout instead of a response for every request after that.
const FLAKY_SERVER: &str = r#"
import sys, json

first = True
for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    msg = json.loads(line)
    if "id" not in msg:
        continue
    if first:
        first = False
        resp = {"jsonrpc": "2.0", "id": msg["id"], "result": {"protocolVersion": "2025-06-18"}}
        sys.stdout.write(json.dumps(resp) + "\n")
        sys.stdout.flush()
    else:
        sys.stdout.write("not json at all\n")
        sys.stdout.flush()
"#;

#[tokio::test]
async fn a_parse_error_tears_down_the_session_and_fails_the_remaining_cases() {
    let mut config = ServerConfig::new("flaky-server", "python3", vec!["-c".into(), FLAKY_SERVER.into()]);
    config.startup_timeout_ms = 2_000;

    let cases = vec![
        TestCase {
            it: "first case hits the malformed line".into(),
            request: JsonRpcRequest::new(json!(1), "tools/list", None),
            expect: Expect::default(),
        },
        TestCase {
            it: "second case never gets a chance to run".into(),
            request: JsonRpcRequest::new(json!(2), "tools/list", None),
            expect: Expect::default(),
        },
    ];
    let report = run_suites(&[suite_with(cases)], &config).await;

    let results = &report.suites[0].results;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, CaseStatus::Failed);
    assert!(results[0].error_message.as_ref().unwrap().contains("request failed"));
    assert_eq!(results[1].status, CaseStatus::Failed);
    assert!(results[1].error_message.as_ref().unwrap().contains("skipped"));
}

#[tokio::test]
async fn a_suite_whose_server_fails_to_start_is_recorded_as_one_failed_case() {
    let mut bad_config = fake_server_config();
    bad_config.command = "this-binary-does-not-exist".into();
    bad_config.startup_timeout_ms = 500;

    let case = TestCase {
        it: "never runs".into(),
        request: JsonRpcRequest::new(json!(1), "tools/list", None),
        expect: Expect::default(),
    };
    let report = run_suites(&[suite_with(vec![case])], &bad_config).await;

    assert_eq!(report.suites[0].results.len(), 1);
    assert_eq!(report.suites[0].results[0].status, CaseStatus::Failed);
}
