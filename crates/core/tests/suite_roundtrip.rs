use aegis_domain::{CaseStatus, JsonRpcRequest, TestSuite};

#[test]
fn suite_json_round_trips_through_the_model() {
    let raw = r#"{
        "description": "tools/list smoke test",
        "tests": [
            {
                "it": "returns the read_file tool",
                "request": { "jsonrpc": "2.0", "id": "t1", "method": "tools/list", "params": {} },
                "expect": {
                    "response": { "result": { "tools": "match:arrayLength:1" } },
                    "stderr": "toBeEmpty"
                }
            }
        ]
    }"#;

    let suite: TestSuite = serde_json::from_str(raw).unwrap();
    assert_eq!(suite.tests.len(), 1);
    let case = &suite.tests[0];
    assert!(case.request.is_well_formed());
    assert_eq!(case.expect.stderr.as_deref(), Some("toBeEmpty"));
    assert!(case.expect.performance.is_none());
}

#[test]
fn request_must_carry_jsonrpc_2_and_a_method() {
    let req: JsonRpcRequest =
        serde_json::from_str(r#"{ "jsonrpc": "2.0", "id": 1, "method": "ping" }"#).unwrap();
    assert!(req.is_well_formed());
}

#[test]
fn case_status_serializes_snake_case() {
    let json = serde_json::to_string(&CaseStatus::Passed).unwrap();
    assert_eq!(json, "\"passed\"");
}
