//! The line transport capability: how the session reaches an engine process.
//!
//! The session depends only on the [`EngineTransport`] trait. The production
//! implementation spawns the engine as a child process with piped stdio and
//! buffers its output on a background reader task; the session's pump drains
//! that buffer at a fixed interval.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, Mutex};

use crate::EngineError;

/// Out-of-band transport notifications. These are logged by the session and
/// never fail a pending request on their own.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The engine process exited or closed its output.
    Exited,
    /// Reading from the engine failed.
    ReadError(String),
}

/// Abstract line transport to an engine process.
#[async_trait]
pub trait EngineTransport: Send + Sync {
    /// Start the engine at `path`. Replaces any previously running engine.
    async fn spawn(&self, path: &Path) -> Result<(), EngineError>;

    /// Write a single command line; the terminator is appended if missing.
    async fn write_line(&self, line: &str) -> Result<(), EngineError>;

    /// Drain whatever output has arrived since the last call. May be empty,
    /// and may end mid-line.
    async fn read_available(&self) -> String;

    /// Stop the engine process.
    async fn stop(&self) -> Result<(), EngineError>;

    fn is_running(&self) -> bool;

    /// The out-of-band notification channel. Yields `Some` once; the session
    /// takes it during initialization.
    async fn take_events(&self) -> Option<mpsc::Receiver<TransportEvent>>;
}

/// Child-process transport over piped stdin/stdout.
pub struct ProcessTransport {
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    buffer: Arc<Mutex<String>>,
    running: Arc<AtomicBool>,
    events: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
}

impl ProcessTransport {
    pub fn new() -> Self {
        Self {
            child: Mutex::new(None),
            stdin: Mutex::new(None),
            buffer: Arc::new(Mutex::new(String::new())),
            running: Arc::new(AtomicBool::new(false)),
            events: Mutex::new(None),
        }
    }
}

impl Default for ProcessTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineTransport for ProcessTransport {
    #[tracing::instrument(level = "info", skip(self))]
    async fn spawn(&self, path: &Path) -> Result<(), EngineError> {
        if self.is_running() {
            self.stop().await?;
        }

        tracing::info!("Spawning engine process");
        let mut child = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::SpawnFailed)?;

        let stdin = child.stdin.take().ok_or(EngineError::TransportUnavailable)?;
        let mut stdout = child.stdout.take().ok_or(EngineError::TransportUnavailable)?;

        let (event_tx, event_rx) = mpsc::channel(8);
        self.running.store(true, Ordering::SeqCst);

        let buffer = Arc::clone(&self.buffer);
        let running = Arc::clone(&self.running);
        tokio::spawn(async move {
            let mut chunk = [0u8; 4096];
            loop {
                match stdout.read(&mut chunk).await {
                    Ok(0) => {
                        tracing::warn!("Engine stdout closed");
                        running.store(false, Ordering::SeqCst);
                        let _ = event_tx.send(TransportEvent::Exited).await;
                        break;
                    }
                    Ok(n) => {
                        let text = String::from_utf8_lossy(&chunk[..n]);
                        buffer.lock().await.push_str(&text);
                    }
                    Err(err) => {
                        tracing::error!(%err, "Error reading engine stdout");
                        running.store(false, Ordering::SeqCst);
                        let _ = event_tx
                            .send(TransportEvent::ReadError(err.to_string()))
                            .await;
                        break;
                    }
                }
            }
            tracing::debug!("Engine output reader exiting");
        });

        *self.child.lock().await = Some(child);
        *self.stdin.lock().await = Some(stdin);
        *self.events.lock().await = Some(event_rx);
        Ok(())
    }

    async fn write_line(&self, line: &str) -> Result<(), EngineError> {
        if !self.is_running() {
            return Err(EngineError::TransportUnavailable);
        }
        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or(EngineError::TransportUnavailable)?;

        let mut command = line.to_string();
        if !command.ends_with('\n') {
            command.push('\n');
        }
        stdin
            .write_all(command.as_bytes())
            .await
            .map_err(EngineError::TransportWrite)?;
        stdin.flush().await.map_err(EngineError::TransportWrite)?;
        Ok(())
    }

    async fn read_available(&self) -> String {
        std::mem::take(&mut *self.buffer.lock().await)
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.running.store(false, Ordering::SeqCst);
        *self.stdin.lock().await = None;
        if let Some(mut child) = self.child.lock().await.take() {
            // Give a cooperative exit a moment before killing the process.
            if tokio::time::timeout(Duration::from_secs(1), child.wait())
                .await
                .is_err()
            {
                let _ = child.kill().await;
            }
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn take_events(&self) -> Option<mpsc::Receiver<TransportEvent>> {
        self.events.lock().await.take()
    }
}
