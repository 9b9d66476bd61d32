//! Runtime configuration for the janggitty CLI.
//!
//! Every value has a compile-time default and can be overridden via a
//! dedicated environment variable.

use std::path::PathBuf;
use std::time::Duration;

/// Default engine binary, resolved through `PATH`.
const DEFAULT_ENGINE_PATH: &str = "fairy-stockfish";

/// Default poll interval for the session's read pump (in milliseconds).
const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default bound on protocol negotiation (in seconds).
const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;

/// Get the engine binary path.
///
/// Priority:
/// 1. `JANGGITTY_ENGINE_PATH` env variable if set
/// 2. `fairy-stockfish` (resolved through `PATH`) as fallback
pub fn get_engine_path() -> PathBuf {
    if let Ok(path) = std::env::var("JANGGITTY_ENGINE_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_ENGINE_PATH)
}

/// Get the read-pump poll interval.
///
/// Priority:
/// 1. `JANGGITTY_POLL_INTERVAL_MS` env variable if set (falls back to the
///    default if the value cannot be parsed as a `u64`)
/// 2. `10` milliseconds as fallback
pub fn get_poll_interval() -> Duration {
    let ms = match std::env::var("JANGGITTY_POLL_INTERVAL_MS") {
        Ok(value) => value.parse().unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        Err(_) => DEFAULT_POLL_INTERVAL_MS,
    };
    Duration::from_millis(ms)
}

/// Get the bound on the protocol handshake.
///
/// Priority:
/// 1. `JANGGITTY_HANDSHAKE_TIMEOUT_SECS` env variable if set (falls back to
///    the default if the value cannot be parsed as a `u64`)
/// 2. `10` seconds as fallback
pub fn get_handshake_timeout() -> Duration {
    let secs = match std::env::var("JANGGITTY_HANDSHAKE_TIMEOUT_SECS") {
        Ok(value) => value.parse().unwrap_or(DEFAULT_HANDSHAKE_TIMEOUT_SECS),
        Err(_) => DEFAULT_HANDSHAKE_TIMEOUT_SECS,
    };
    Duration::from_secs(secs)
}
