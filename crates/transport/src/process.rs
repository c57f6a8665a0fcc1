//! Stdio transport (C2): spawns the configured child process, frames its
//! stdout as newline-delimited JSON, accumulates stderr, and detects
//! readiness via an optional regex scanned against the full stderr buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aegis_domain::ServerConfig;
use parking_lot::Mutex as SyncMutex;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};

use crate::error::TransportError;

type StdoutItem = Result<Value, TransportError>;

/// A single spawned MCP server process, framed as newline-delimited JSON.
///
/// Owns the child process and its stdout/stderr buffers for its entire
/// lifetime; created by `Transport::start`, destroyed by `Transport::stop`.
pub struct Transport {
    stdin: AsyncMutex<ChildStdin>,
    stdout_rx: AsyncMutex<mpsc::Receiver<StdoutItem>>,
    child: Arc<AsyncMutex<Child>>,
    stderr_buf: Arc<SyncMutex<String>>,
    alive: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl Transport {
    /// Spawn the child, wire up its stdio, and wait for readiness.
    ///
    /// Resolves as soon as the child is spawned if `readyPattern` is unset;
    /// otherwise waits (up to `startupTimeout`) for the pattern to match the
    /// accumulated stderr buffer.
    pub async fn start(config: &ServerConfig) -> Result<Self, TransportError> {
        let ready_regex = config.ready_regex()?;

        let mut command = tokio::process::Command::new(&config.command);
        command
            .args(&config.args)
            .current_dir(config.effective_cwd())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        for (key, value) in &config.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(TransportError::SpawnFailed)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::SpawnFailed(broken_pipe("failed to capture child stdin")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::SpawnFailed(broken_pipe("failed to capture child stdout")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TransportError::SpawnFailed(broken_pipe("failed to capture child stderr")))?;

        let alive = Arc::new(AtomicBool::new(true));
        let cancelled = Arc::new(AtomicBool::new(false));
        let stderr_buf = Arc::new(SyncMutex::new(String::new()));
        let ready_latched = Arc::new(AtomicBool::new(ready_regex.is_none()));
        let ready_notify = Arc::new(Notify::new());

        let (tx, rx) = mpsc::channel::<StdoutItem>(64);

        // (a) stdout reader task: NDJSON framing.
        spawn_stdout_reader(BufReader::new(stdout), tx, Arc::clone(&alive));

        // (b) stderr reader task: accumulate + scan for readiness.
        spawn_stderr_reader(
            BufReader::new(stderr),
            Arc::clone(&stderr_buf),
            ready_regex,
            Arc::clone(&ready_latched),
            Arc::clone(&ready_notify),
        );

        let child = Arc::new(AsyncMutex::new(child));

        // (c) process-exit watcher.
        spawn_exit_watcher(Arc::clone(&child), Arc::clone(&alive));

        if !ready_latched.load(Ordering::SeqCst) {
            let timeout = config.startup_timeout();
            let already_ready = ready_latched.clone();
            let wait = async {
                loop {
                    if already_ready.load(Ordering::SeqCst) {
                        return;
                    }
                    ready_notify.notified().await;
                }
            };
            if tokio::time::timeout(timeout, wait).await.is_err() {
                let mut guard = child.lock().await;
                let _ = guard.start_kill();
                return Err(TransportError::StartupTimeout);
            }
        }

        Ok(Self {
            stdin: AsyncMutex::new(stdin),
            stdout_rx: AsyncMutex::new(rx),
            child,
            stderr_buf,
            alive,
            cancelled,
        })
    }

    /// Serialize `message` to compact JSON, append `\n`, and write it in one
    /// shot. Fails with `stdin_closed` once the process has exited.
    pub async fn write(&self, message: &Value) -> Result<(), TransportError> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(TransportError::StdinClosed);
        }
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(&line)
            .await
            .map_err(|_| TransportError::StdinClosed)?;
        stdin.flush().await.map_err(|_| TransportError::StdinClosed)?;
        Ok(())
    }

    /// Return the next complete JSON object parsed from stdout, or fail once
    /// `timeout` elapses. At most one `next_message` call is served at a
    /// time; concurrent callers queue FIFO on the internal receiver lock.
    pub async fn next_message(&self, timeout: Duration) -> Result<Value, TransportError> {
        let mut rx = self.stdout_rx.lock().await;
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                if self.cancelled.load(Ordering::SeqCst) {
                    Err(TransportError::Cancelled)
                } else {
                    Err(TransportError::ProcessExited)
                }
            }
            Err(_) => Err(TransportError::ReadTimeout),
        }
    }

    /// The current accumulated stderr text.
    pub fn stderr(&self) -> String {
        self.stderr_buf.lock().clone()
    }

    /// Reset the stderr buffer to empty. Called before each test case so no
    /// state leaks between cases.
    pub fn clear_stderr(&self) {
        self.stderr_buf.lock().clear();
    }

    /// True iff the child has been started and not yet observed to exit.
    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Polite termination: close stdin, wait up to 2s, then force-kill.
    /// Cancels all in-flight reads with `cancelled`.
    pub async fn stop(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.cancelled.store(true, Ordering::SeqCst);
        {
            let mut stdin = self.stdin.lock().await;
            let _ = stdin.shutdown().await;
        }

        let mut child = self.child.lock().await;
        match tokio::time::timeout(Duration::from_secs(2), child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(?status, "MCP server exited");
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, "error waiting for MCP server process");
            }
            Err(_) => {
                tracing::warn!("MCP server did not exit within 2s, killing");
                if let Err(error) = child.start_kill() {
                    tracing::warn!(%error, "failed to kill MCP server process");
                } else {
                    let _ = child.wait().await;
                }
            }
        }
    }
}

fn broken_pipe(message: &'static str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, message)
}

fn spawn_stdout_reader<R>(mut reader: BufReader<R>, tx: mpsc::Sender<StdoutItem>, alive: Arc<AtomicBool>)
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    alive.store(false, Ordering::SeqCst);
                    break;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(trimmed) {
                        Ok(value) => {
                            if tx.send(Ok(value)).await.is_err() {
                                break;
                            }
                        }
                        Err(_) => {
                            alive.store(false, Ordering::SeqCst);
                            let _ = tx
                                .send(Err(TransportError::ParseError {
                                    raw_line: trimmed.to_string(),
                                }))
                                .await;
                            // Per spec §9 open question: a malformed line
                            // fails the in-flight read and the reader stops;
                            // the Session tears the whole transport down.
                            break;
                        }
                    }
                }
                Err(_) => {
                    alive.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    });
}

fn spawn_stderr_reader<R>(
    mut reader: BufReader<R>,
    stderr_buf: Arc<SyncMutex<String>>,
    ready_regex: Option<regex::Regex>,
    ready_latched: Arc<AtomicBool>,
    ready_notify: Arc<Notify>,
) where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let matched_now = {
                        let mut buf = stderr_buf.lock();
                        buf.push_str(&line);
                        if !line.ends_with('\n') {
                            buf.push('\n');
                        }
                        ready_regex
                            .as_ref()
                            .map(|re| re.is_match(&buf))
                            .unwrap_or(false)
                    };
                    if matched_now && !ready_latched.swap(true, Ordering::SeqCst) {
                        ready_notify.notify_waiters();
                    }
                }
                Err(_) => break,
            }
        }
    });
}

fn spawn_exit_watcher(child: Arc<AsyncMutex<Child>>, alive: Arc<AtomicBool>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut guard = child.lock().await;
            match guard.try_wait() {
                Ok(Some(_status)) => {
                    alive.store(false, Ordering::SeqCst);
                    break;
                }
                Ok(None) => continue,
                Err(_) => break,
            }
        }
    });
}
