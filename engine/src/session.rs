//! The protocol session: engine lifecycle state, command issue, and the
//! dispatch of output lines to pending requests.
//!
//! The protocol has no message ids, so correlation is by broadcast: every
//! complete line is offered to every registered handler and each handler
//! self-filters by line shape. A handler that recognizes its terminal line
//! resolves its request and is unregistered. A fixed-interval pump task is
//! the only reader of the transport and the only caller of dispatch, which
//! keeps the carry buffer and the registry single-writer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use janggi::{format_fen, format_move, parse_move, AnalysisSnapshot, MoveToken, Position, Variant};

use crate::analysis::fold_thinking;
use crate::lines::LineReader;
use crate::transport::{EngineTransport, TransportEvent};
use crate::xboard::{commands, parse_output_line, OutputLine};
use crate::EngineError;

/// Engine lifecycle state. Owned by the session; transitions happen only in
/// its own methods and pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Handshaking,
    Ready,
    Thinking,
    ShuttingDown,
    Stopped,
}

/// Named pending-request slots. At most one handler per slot; registering
/// over an occupied slot supersedes the previous handler without cancelling
/// it (its caller observes [`EngineError::RequestAbandoned`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Feature,
    Move,
    Analysis,
    Hint,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Move => "move",
            Self::Analysis => "analysis",
            Self::Hint => "hint",
        }
    }
}

/// Returns true when the handler resolved its request and should be removed.
type Handler = Box<dyn FnMut(&str) -> bool + Send>;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often the pump polls the transport for new output.
    pub poll_interval: Duration,
    /// Bound on the wait for the negotiation-complete feature line.
    pub handshake_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

struct Registry {
    handlers: Mutex<HashMap<Slot, Handler>>,
    state: Mutex<SessionState>,
}

/// A live connection to one engine process.
pub struct EngineSession<T: EngineTransport + 'static> {
    transport: Arc<T>,
    registry: Arc<Registry>,
    config: SessionConfig,
    variant: Variant,
    pump: Option<JoinHandle<()>>,
    event_logger: Option<JoinHandle<()>>,
}

impl<T: EngineTransport + 'static> EngineSession<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            registry: Arc::new(Registry {
                handlers: Mutex::new(HashMap::new()),
                state: Mutex::new(SessionState::Uninitialized),
            }),
            config,
            variant: Variant::Standard,
            pump: None,
            event_logger: None,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.registry.state.lock().unwrap()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn set_state(&self, state: SessionState) {
        *self.registry.state.lock().unwrap() = state;
    }

    /// Spawn the engine, perform protocol negotiation, and select the
    /// variant. The session is `Ready` on return.
    #[tracing::instrument(level = "info", skip(self, path), fields(path = %path.display()))]
    pub async fn initialize(&mut self, path: &Path, variant: Variant) -> Result<(), EngineError> {
        self.set_state(SessionState::Handshaking);
        self.transport.spawn(path).await?;
        self.start_event_logger().await;
        self.start_pump();

        self.send_command(commands::XBOARD).await?;

        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        self.register(Slot::Feature, move |line| {
            if parse_output_line(line) == OutputLine::FeatureDone(true) {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(());
                }
                true
            } else {
                false
            }
        });
        self.send_command(commands::PROTOVER).await?;

        match tokio::time::timeout(self.config.handshake_timeout, rx).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => return Err(EngineError::RequestAbandoned),
            Err(_) => {
                // Deregister so a late feature line cannot fire a stale resolver.
                self.cancel(Slot::Feature);
                return Err(EngineError::HandshakeTimeout);
            }
        }
        tracing::debug!("Protocol negotiation complete");

        self.send_command(commands::NEW).await?;
        if !variant.is_default() {
            self.send_command(&commands::variant(variant.spec().protocol_name))
                .await?;
        }
        self.variant = variant;
        self.set_state(SessionState::Ready);
        tracing::info!(variant = variant.spec().protocol_name, "Engine session ready");
        Ok(())
    }

    /// Start a new game and select `variant`. If a send fails the active
    /// variant remains whatever was last successfully set; there is no
    /// rollback.
    pub async fn set_variant(&mut self, variant: Variant) -> Result<(), EngineError> {
        self.send_command(commands::NEW).await?;
        if !variant.is_default() {
            self.send_command(&commands::variant(variant.spec().protocol_name))
                .await?;
        }
        self.variant = variant;
        Ok(())
    }

    /// Enter setup mode and transmit `position`.
    pub async fn set_position(&self, position: &Position) -> Result<(), EngineError> {
        self.send_command(commands::FORCE).await?;
        self.send_command(&commands::setboard(&format_fen(position)))
            .await
    }

    /// Ask the engine for its best move from `position` under a fixed time
    /// budget. Resolves when the terminal move line arrives; no timeout is
    /// imposed here, callers race one externally and [`cancel`](Self::cancel)
    /// the slot if they give up.
    pub async fn request_best_move(
        &self,
        position: &Position,
        time_budget_ms: u64,
    ) -> Result<MoveToken, EngineError> {
        self.ensure_ready()?;
        self.set_position(position).await?;
        self.send_command(&commands::time_budget(time_budget_ms))
            .await?;
        let rx = self.register_move_handler();
        self.set_state(SessionState::Thinking);
        self.send_command(commands::GO).await?;
        rx.await.map_err(|_| EngineError::RequestAbandoned)
    }

    /// Run a fixed-depth search over `position` and return the final
    /// analysis snapshot.
    pub async fn request_analysis(
        &self,
        position: &Position,
        depth: u32,
    ) -> Result<AnalysisSnapshot, EngineError> {
        let rx = self.start_analysis(position, depth, None).await?;
        rx.await.map_err(|_| EngineError::RequestAbandoned)
    }

    /// Like [`request_analysis`](Self::request_analysis) but also yields each
    /// intermediate snapshot as it is folded. The stream ends after the
    /// terminal snapshot.
    pub async fn request_analysis_stream(
        &self,
        position: &Position,
        depth: u32,
    ) -> Result<ReceiverStream<AnalysisSnapshot>, EngineError> {
        let (tx, rx) = mpsc::channel(32);
        // The final snapshot reaches the caller through the stream; the
        // oneshot resolver is dropped unobserved.
        let _ = self.start_analysis(position, depth, Some(tx)).await?;
        Ok(ReceiverStream::new(rx))
    }

    /// Tell the engine the opponent played `mv`; resolves with the engine's
    /// reply move.
    pub async fn opponent_move(&self, mv: &MoveToken) -> Result<MoveToken, EngineError> {
        self.ensure_ready()?;
        let token = format_move(mv, self.variant);
        let rx = self.register_move_handler();
        self.set_state(SessionState::Thinking);
        self.send_command(&commands::usermove(&token)).await?;
        rx.await.map_err(|_| EngineError::RequestAbandoned)
    }

    /// Ask for a hint in the current game.
    pub async fn hint(&self) -> Result<MoveToken, EngineError> {
        self.ensure_ready()?;
        let variant = self.variant;
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        self.register(Slot::Hint, move |line| {
            let OutputLine::Hint(token) = parse_output_line(line) else {
                return false;
            };
            match parse_move(&token, variant) {
                Ok(mv) => {
                    if let Some(tx) = tx.take() {
                        let _ = tx.send(mv);
                    }
                    true
                }
                Err(err) => {
                    tracing::warn!(%token, %err, "Ignoring unparseable hint line");
                    false
                }
            }
        });
        self.send_command(commands::HINT).await?;
        rx.await.map_err(|_| EngineError::RequestAbandoned)
    }

    /// Interrupt the current search; the engine answers with its move so far.
    pub async fn move_now(&self) -> Result<(), EngineError> {
        self.send_command(commands::MOVE_NOW).await
    }

    /// Enable or disable pondering on the opponent's time.
    pub async fn ponder(&self, enabled: bool) -> Result<(), EngineError> {
        self.send_command(if enabled {
            commands::HARD
        } else {
            commands::EASY
        })
        .await
    }

    /// Write one command line to the engine.
    pub async fn send_command(&self, line: &str) -> Result<(), EngineError> {
        tracing::trace!("xboard >> {line}");
        self.transport.write_line(line).await
    }

    /// Drop the pending handler for `slot`, if any. The superseded caller
    /// observes [`EngineError::RequestAbandoned`].
    pub fn cancel(&self, slot: Slot) {
        if self.registry.handlers.lock().unwrap().remove(&slot).is_some() {
            tracing::debug!(slot = slot.as_str(), "Pending request cancelled");
        }
    }

    /// Whether a request is pending under `slot`.
    pub fn has_pending(&self, slot: Slot) -> bool {
        self.registry.handlers.lock().unwrap().contains_key(&slot)
    }

    /// Tear the session down: stop the pump, send a best-effort quit, stop
    /// the transport, and release all pending registrations. Requests still
    /// unresolved at this point are never answered; their callers observe
    /// [`EngineError::RequestAbandoned`] when the resolvers are dropped.
    pub async fn quit(mut self) -> Result<(), EngineError> {
        self.set_state(SessionState::ShuttingDown);
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        if self.transport.is_running() {
            if let Err(err) = self.transport.write_line(commands::QUIT).await {
                tracing::warn!(%err, "Failed to send quit command");
            }
        }
        let _ = self.transport.stop().await;
        self.registry.handlers.lock().unwrap().clear();
        if let Some(logger) = self.event_logger.take() {
            logger.abort();
        }
        self.set_state(SessionState::Stopped);
        tracing::info!("Engine session stopped");
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        match self.state() {
            SessionState::Ready | SessionState::Thinking => Ok(()),
            other => Err(EngineError::NotReady(other)),
        }
    }

    fn register<F>(&self, slot: Slot, handler: F)
    where
        F: FnMut(&str) -> bool + Send + 'static,
    {
        let mut handlers = self.registry.handlers.lock().unwrap();
        if handlers.insert(slot, Box::new(handler)).is_some() {
            tracing::debug!(slot = slot.as_str(), "Superseding pending request");
        }
    }

    fn register_move_handler(&self) -> oneshot::Receiver<MoveToken> {
        let variant = self.variant;
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        self.register(Slot::Move, move |line| {
            let OutputLine::Move(token) = parse_output_line(line) else {
                return false;
            };
            match parse_move(&token, variant) {
                Ok(mv) => {
                    if let Some(tx) = tx.take() {
                        let _ = tx.send(mv);
                    }
                    true
                }
                Err(err) => {
                    tracing::warn!(%token, %err, "Ignoring unparseable move line");
                    false
                }
            }
        });
        rx
    }

    async fn start_analysis(
        &self,
        position: &Position,
        depth: u32,
        updates: Option<mpsc::Sender<AnalysisSnapshot>>,
    ) -> Result<oneshot::Receiver<AnalysisSnapshot>, EngineError> {
        self.ensure_ready()?;
        let variant = self.variant;
        self.set_position(position).await?;
        self.send_command(&commands::depth(depth)).await?;
        self.send_command(commands::POST).await?;

        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let mut snapshot = AnalysisSnapshot::default();
        self.register(Slot::Analysis, move |line| match parse_output_line(line) {
            OutputLine::Thinking(thinking) => {
                fold_thinking(&mut snapshot, &thinking, variant);
                if let Some(updates) = &updates {
                    // Dispatch must not block; a lagging stream consumer
                    // loses intermediate snapshots, never the final one.
                    let _ = updates.try_send(snapshot.clone());
                }
                false
            }
            OutputLine::Move(_) => {
                let done = std::mem::take(&mut snapshot);
                if let Some(updates) = &updates {
                    let _ = updates.try_send(done.clone());
                }
                if let Some(tx) = tx.take() {
                    let _ = tx.send(done);
                }
                true
            }
            _ => false,
        });

        self.set_state(SessionState::Thinking);
        self.send_command(commands::GO).await?;
        Ok(rx)
    }

    fn start_pump(&mut self) {
        let transport = Arc::clone(&self.transport);
        let registry = Arc::clone(&self.registry);
        let interval = self.config.poll_interval;
        self.pump = Some(tokio::spawn(async move {
            let mut reader = LineReader::new();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let chunk = transport.read_available().await;
                if !chunk.is_empty() {
                    for line in reader.feed(&chunk) {
                        tracing::trace!("xboard << {line}");
                        dispatch_line(&registry, &line);
                    }
                }
                if !transport.is_running() {
                    // Deliver anything that arrived between the last poll
                    // and the transport going down.
                    let chunk = transport.read_available().await;
                    for line in reader.feed(&chunk) {
                        tracing::trace!("xboard << {line}");
                        dispatch_line(&registry, &line);
                    }
                    let mut state = registry.state.lock().unwrap();
                    if *state != SessionState::ShuttingDown {
                        *state = SessionState::Stopped;
                    }
                    tracing::debug!("Transport stopped; read pump exiting");
                    break;
                }
            }
        }));
    }

    async fn start_event_logger(&mut self) {
        // Transport faults are logged and never fail a pending request;
        // callers own their timeouts.
        if let Some(mut events) = self.transport.take_events().await {
            self.event_logger = Some(tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        TransportEvent::Exited => tracing::warn!("Engine process exited"),
                        TransportEvent::ReadError(err) => {
                            tracing::error!(%err, "Engine read error")
                        }
                    }
                }
            }));
        }
    }
}

impl<T: EngineTransport + 'static> Drop for EngineSession<T> {
    fn drop(&mut self) {
        if let Some(pump) = &self.pump {
            pump.abort();
        }
        if let Some(logger) = &self.event_logger {
            logger.abort();
        }
    }
}

/// Offer `line` to every registered handler and unregister the ones that
/// resolved. A resolved move or analysis request ends the thinking phase.
fn dispatch_line(registry: &Registry, line: &str) {
    let mut handlers = registry.handlers.lock().unwrap();
    let mut resolved = Vec::new();
    for (slot, handler) in handlers.iter_mut() {
        if handler(line) {
            resolved.push(*slot);
        }
    }
    for slot in &resolved {
        handlers.remove(slot);
        tracing::debug!(slot = slot.as_str(), "Pending request resolved");
    }
    drop(handlers);

    if resolved
        .iter()
        .any(|slot| matches!(slot, Slot::Move | Slot::Analysis))
    {
        let mut state = registry.state.lock().unwrap();
        if *state == SessionState::Thinking {
            *state = SessionState::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use janggi::{parse_fen, AnalysisScore};
    use tokio_stream::StreamExt;

    const FEATURES: &str = "feature ping=1 setboard=1 usermove=1 myname=\"fake\" done=1\n";

    fn fast_config() -> SessionConfig {
        SessionConfig {
            poll_interval: Duration::from_millis(2),
            handshake_timeout: Duration::from_secs(2),
        }
    }

    fn start_position() -> Position {
        parse_fen(Variant::Janggi.spec().start_fen, Variant::Janggi).unwrap()
    }

    async fn ready_session(mock: MockTransport) -> EngineSession<MockTransport> {
        let mut session = EngineSession::new(mock, fast_config());
        session
            .initialize(Path::new("/fake/engine"), Variant::Janggi)
            .await
            .unwrap();
        session
    }

    /// Wait for `predicate` instead of a fixed sleep; the pump ticks every 2 ms.
    async fn wait_until(mut predicate: impl FnMut() -> bool) {
        for _ in 0..500 {
            if predicate() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_initialize_negotiates_and_selects_variant() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let session = ready_session(mock.clone()).await;

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.variant(), Variant::Janggi);
        assert_eq!(
            mock.written(),
            vec!["xboard", "protover 2", "new", "variant janggi"]
        );
    }

    #[tokio::test]
    async fn test_initialize_default_variant_sends_no_variant_command() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let mut session = EngineSession::new(mock.clone(), fast_config());
        session
            .initialize(Path::new("/fake/engine"), Variant::Standard)
            .await
            .unwrap();
        assert_eq!(mock.written(), vec!["xboard", "protover 2", "new"]);
    }

    #[tokio::test]
    async fn test_handshake_timeout() {
        let mock = MockTransport::new(); // never answers protover
        let mut session = EngineSession::new(
            mock,
            SessionConfig {
                poll_interval: Duration::from_millis(2),
                handshake_timeout: Duration::from_millis(100),
            },
        );
        let err = session
            .initialize(Path::new("/fake/engine"), Variant::Janggi)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::HandshakeTimeout));
        // the stale feature handler was deregistered
        assert!(!session.has_pending(Slot::Feature));
    }

    #[tokio::test]
    async fn test_request_best_move() {
        let mock = MockTransport::new()
            .with_reply("protover", FEATURES)
            .with_reply("go", "# searching\nmove a1a2\n");
        let session = ready_session(mock.clone()).await;

        let mv = session
            .request_best_move(&start_position(), 1500)
            .await
            .unwrap();
        assert_eq!(format_move(&mv, Variant::Janggi), "a1a2");
        assert_eq!(session.state(), SessionState::Ready);

        let written = mock.written();
        assert!(written.contains(&"force".to_string()));
        assert!(written.iter().any(|line| line.starts_with("setboard ")));
        assert!(written.contains(&"st 2".to_string()));
        assert_eq!(written.last().unwrap(), "go");
    }

    #[tokio::test]
    async fn test_opponent_move_resolves_with_reply() {
        let mock = MockTransport::new()
            .with_reply("protover", FEATURES)
            .with_reply("usermove a1a2", "move a10a9\n");
        let session = ready_session(mock).await;

        let ours = parse_move("a1a2", Variant::Janggi).unwrap();
        let reply = session.opponent_move(&ours).await.unwrap();
        assert_eq!(format_move(&reply, Variant::Janggi), "a10a9");
    }

    #[tokio::test]
    async fn test_request_analysis_folds_thinking_lines() {
        let mock = MockTransport::new()
            .with_reply("protover", FEATURES)
            .with_reply(
                "go",
                "4 20 10 2048 a1a2\n12 145 1234 567890 e2e4 e7e5\nmove e2e4\n",
            );
        let session = ready_session(mock.clone()).await;

        let snapshot = session
            .request_analysis(&start_position(), 12)
            .await
            .unwrap();
        assert_eq!(snapshot.depth, 12);
        assert_eq!(snapshot.score, Some(AnalysisScore::Centipawns(145)));
        assert_eq!(snapshot.time_ms, 12340);
        assert_eq!(snapshot.nodes, 567890);
        assert_eq!(snapshot.pv, vec!["e2e4", "e7e5"]);
        assert!(snapshot.nps > 0);
        assert_eq!(session.state(), SessionState::Ready);

        let written = mock.written();
        assert!(written.contains(&"sd 12".to_string()));
        assert!(written.contains(&"post".to_string()));
    }

    #[tokio::test]
    async fn test_analysis_stream_yields_interim_snapshots() {
        let mock = MockTransport::new()
            .with_reply("protover", FEATURES)
            .with_reply("go", "4 20 10 2048 a1a2\n12 145 1234 567890 e2e4\nmove e2e4\n");
        let session = ready_session(mock).await;

        let stream = session
            .request_analysis_stream(&start_position(), 12)
            .await
            .unwrap();
        let snapshots: Vec<_> = stream.collect().await;
        // two interim folds plus the terminal snapshot
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0].depth, 4);
        assert_eq!(snapshots.last().unwrap().depth, 12);
    }

    #[tokio::test]
    async fn test_hint() {
        let mock = MockTransport::new()
            .with_reply("protover", FEATURES)
            .with_reply("hint", "Hint: e7e6\n");
        let session = ready_session(mock).await;

        let mv = session.hint().await.unwrap();
        assert_eq!(format_move(&mv, Variant::Janggi), "e7e6");
    }

    #[tokio::test]
    async fn test_dispatch_fanout_resolves_only_matching_slot() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let session = Arc::new(ready_session(mock.clone()).await);

        let hint_task = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.hint().await })
        };
        let move_task = {
            let session = Arc::clone(&session);
            let position = start_position();
            tokio::spawn(async move { session.request_best_move(&position, 500).await })
        };

        {
            let session = Arc::clone(&session);
            wait_until(move || {
                session.has_pending(Slot::Hint) && session.has_pending(Slot::Move)
            })
            .await;
        }

        // A hint line resolves the hint slot only; the move slot stays pending.
        mock.push_output("Hint: a1a2\n");
        let hinted = hint_task.await.unwrap().unwrap();
        assert_eq!(format_move(&hinted, Variant::Janggi), "a1a2");
        assert!(session.has_pending(Slot::Move));

        mock.push_output("move i1i2\n");
        let best = move_task.await.unwrap().unwrap();
        assert_eq!(format_move(&best, Variant::Janggi), "i1i2");
        assert!(!session.has_pending(Slot::Move));
    }

    #[tokio::test]
    async fn test_reregistering_slot_supersedes_previous_request() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let session = Arc::new(ready_session(mock.clone()).await);

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.hint().await })
        };
        {
            let session = Arc::clone(&session);
            wait_until(move || session.has_pending(Slot::Hint)).await;
        }

        let second = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.hint().await })
        };

        // the superseded resolver is dropped, so the first caller is released
        let err = first.await.unwrap().unwrap_err();
        assert!(matches!(err, EngineError::RequestAbandoned));

        mock.push_output("Hint: e7e6\n");
        let mv = second.await.unwrap().unwrap();
        assert_eq!(format_move(&mv, Variant::Janggi), "e7e6");
    }

    #[tokio::test]
    async fn test_cancel_releases_pending_request() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let session = ready_session(mock).await;

        let position = start_position();
        let (result, ()) = tokio::join!(session.request_best_move(&position, 500), async {
            wait_until(|| session.has_pending(Slot::Move)).await;
            session.cancel(Slot::Move);
        });
        assert!(matches!(result, Err(EngineError::RequestAbandoned)));
    }

    #[tokio::test]
    async fn test_transport_fault_does_not_fail_pending_request() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let session = Arc::new(ready_session(mock.clone()).await);

        let hint_task = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.hint().await })
        };
        {
            let session = Arc::clone(&session);
            wait_until(move || session.has_pending(Slot::Hint)).await;
        }

        mock.emit(TransportEvent::ReadError("pipe broke".to_string()))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        // the fault is logged out of band; the registration stays live
        assert!(session.has_pending(Slot::Hint));

        mock.push_output("Hint: a1a2\n");
        assert!(hint_task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_engine_death_stops_session() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let session = ready_session(mock.clone()).await;

        mock.stop().await.unwrap();
        wait_until(|| session.state() == SessionState::Stopped).await;
    }

    #[tokio::test]
    async fn test_quit_sends_quit_and_stops_transport() {
        let mock = MockTransport::new().with_reply("protover", FEATURES);
        let session = ready_session(mock.clone()).await;

        session.quit().await.unwrap();
        assert!(!mock.is_running());
        assert_eq!(mock.written().last().unwrap(), "quit");
    }

    #[tokio::test]
    async fn test_requests_require_initialization() {
        let session = EngineSession::new(MockTransport::new(), fast_config());
        let err = session
            .request_best_move(&start_position(), 500)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NotReady(SessionState::Uninitialized)
        ));
        let err = session.send_command("go").await.unwrap_err();
        assert!(matches!(err, EngineError::TransportUnavailable));
    }
}
