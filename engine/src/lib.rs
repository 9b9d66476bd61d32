//! XBoard protocol client for external variant-game engines.
//!
//! The engine process is reached through the [`transport::EngineTransport`]
//! capability; the [`session::EngineSession`] owns the protocol state
//! machine, correlates asynchronous output lines to pending requests, and
//! folds thinking output into analysis snapshots.

pub mod analysis;
pub mod lines;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod session;
pub mod transport;
pub mod xboard;

pub use lines::LineReader;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use session::{EngineSession, SessionConfig, SessionState, Slot};
pub use transport::{EngineTransport, ProcessTransport, TransportEvent};

/// Errors surfaced by the transport and the protocol session.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No engine transport is attached")]
    TransportUnavailable,
    #[error("Failed to write to the engine: {0}")]
    TransportWrite(#[source] std::io::Error),
    #[error("Failed to spawn the engine process: {0}")]
    SpawnFailed(#[source] std::io::Error),
    #[error("Engine did not finish protocol negotiation in time")]
    HandshakeTimeout,
    #[error("Request was released without a response")]
    RequestAbandoned,
    #[error("Session is {0:?}, expected it to be ready")]
    NotReady(SessionState),
}
