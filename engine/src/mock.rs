//! Scripted in-memory transport for session tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::transport::{EngineTransport, TransportEvent};
use crate::EngineError;

/// Mock transport: canned replies keyed by command prefix, a call log of
/// every written line, and manual output injection for unsolicited lines.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

struct MockInner {
    /// (command prefix, canned output) pairs, consumed in order on match.
    script: Mutex<Vec<(String, String)>>,
    written: Mutex<Vec<String>>,
    buffer: Mutex<String>,
    running: Mutex<bool>,
    events: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
    event_tx: mpsc::Sender<TransportEvent>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel(8);
        Self {
            inner: Arc::new(MockInner {
                script: Mutex::new(Vec::new()),
                written: Mutex::new(Vec::new()),
                buffer: Mutex::new(String::new()),
                running: Mutex::new(false),
                events: Mutex::new(Some(event_rx)),
                event_tx,
            }),
        }
    }

    /// Queue a canned reply: the first written line starting with `prefix`
    /// pushes `output` into the read buffer and consumes the entry.
    pub fn with_reply(self, prefix: &str, output: &str) -> Self {
        self.inner
            .script
            .lock()
            .unwrap()
            .push((prefix.to_string(), output.to_string()));
        self
    }

    /// Inject engine output without a triggering command.
    pub fn push_output(&self, text: &str) {
        self.inner.buffer.lock().unwrap().push_str(text);
    }

    /// Every line written so far, trailing terminators stripped.
    pub fn written(&self) -> Vec<String> {
        self.inner.written.lock().unwrap().clone()
    }

    pub async fn emit(&self, event: TransportEvent) {
        let _ = self.inner.event_tx.send(event).await;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineTransport for MockTransport {
    async fn spawn(&self, _path: &Path) -> Result<(), EngineError> {
        *self.inner.running.lock().unwrap() = true;
        Ok(())
    }

    async fn write_line(&self, line: &str) -> Result<(), EngineError> {
        if !self.is_running() {
            return Err(EngineError::TransportUnavailable);
        }
        let line = line.trim_end_matches('\n').to_string();
        self.inner.written.lock().unwrap().push(line.clone());

        let mut script = self.inner.script.lock().unwrap();
        if let Some(idx) = script.iter().position(|(prefix, _)| line.starts_with(prefix)) {
            let (_, output) = script.remove(idx);
            self.inner.buffer.lock().unwrap().push_str(&output);
        }
        Ok(())
    }

    async fn read_available(&self) -> String {
        std::mem::take(&mut *self.inner.buffer.lock().unwrap())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        *self.inner.running.lock().unwrap() = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        *self.inner.running.lock().unwrap()
    }

    async fn take_events(&self) -> Option<mpsc::Receiver<TransportEvent>> {
        self.inner.events.lock().unwrap().take()
    }
}
