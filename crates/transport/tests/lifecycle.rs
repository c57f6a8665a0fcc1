use std::time::Duration;

use aegis_domain::ServerConfig;
use aegis_transport::{Transport, TransportError};
use serde_json::json;

fn echo_config(script: &str) -> ServerConfig {
    let mut config = ServerConfig::new("echo-server", "python3", vec!["-c".into(), script.into()]);
    config.startup_timeout_ms = 2_000;
    config
}

#[tokio::test]
async fn writes_and_reads_a_single_ndjson_message() {
    let config = echo_config(
        "import sys\n\
         for line in sys.stdin:\n\
             sys.stdout.write(line)\n\
             sys.stdout.flush()\n",
    );
    let transport = Transport::start(&config).await.expect("spawn echo server");

    let request = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
    transport.write(&request).await.expect("write request");

    let response = transport
        .next_message(Duration::from_secs(2))
        .await
        .expect("read echoed message");
    assert_eq!(response, request);

    transport.stop().await;
}

#[tokio::test]
async fn readiness_waits_for_the_stderr_pattern() {
    let mut config = echo_config(
        "import sys, time\n\
         time.sleep(0.05)\n\
         sys.stderr.write('server ready\\n')\n\
         sys.stderr.flush()\n\
         for line in sys.stdin:\n\
             sys.stdout.write(line)\n\
             sys.stdout.flush()\n",
    );
    config.ready_pattern = Some("ready".to_string());

    let transport = Transport::start(&config).await.expect("should become ready");
    assert!(transport.is_running());
    transport.stop().await;
}

#[tokio::test]
async fn startup_times_out_when_the_ready_pattern_never_matches() {
    let mut config = echo_config(
        "import sys, time\n\
         time.sleep(5)\n",
    );
    config.startup_timeout_ms = 100;
    config.ready_pattern = Some("never-printed".to_string());

    let result = Transport::start(&config).await;
    assert!(matches!(result, Err(TransportError::StartupTimeout)));
}

#[tokio::test]
async fn next_message_times_out_when_nothing_arrives() {
    let config = echo_config("import time\ntime.sleep(5)\n");
    let transport = Transport::start(&config).await.expect("spawn sleeping server");

    let result = transport.next_message(Duration::from_millis(100)).await;
    assert!(matches!(result, Err(TransportError::ReadTimeout)));

    transport.stop().await;
}

#[tokio::test]
async fn stderr_accumulates_and_can_be_cleared() {
    let config = echo_config(
        "import sys\n\
         sys.stderr.write('boot line\\n')\n\
         sys.stderr.flush()\n\
         for line in sys.stdin:\n\
             pass\n",
    );
    let transport = Transport::start(&config).await.expect("spawn server");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(transport.stderr().contains("boot line"));

    transport.clear_stderr();
    assert!(transport.stderr().is_empty());

    transport.stop().await;
}

#[tokio::test]
async fn write_fails_once_the_process_has_exited() {
    let config = echo_config("import sys\nsys.exit(0)\n");
    let transport = Transport::start(&config).await.expect("spawn short-lived server");

    tokio::time::sleep(Duration::from_millis(200)).await;

    let result = transport.write(&json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})).await;
    assert!(matches!(result, Err(TransportError::StdinClosed)));
}
