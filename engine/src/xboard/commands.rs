//! Single-line XBoard commands. Each is exactly one text line; the transport
//! appends the terminator.

pub const XBOARD: &str = "xboard";
pub const PROTOVER: &str = "protover 2";
pub const NEW: &str = "new";
pub const FORCE: &str = "force";
pub const POST: &str = "post";
pub const HARD: &str = "hard";
pub const EASY: &str = "easy";
pub const GO: &str = "go";
pub const MOVE_NOW: &str = "?";
pub const HINT: &str = "hint";
pub const QUIT: &str = "quit";

pub fn variant(name: &str) -> String {
    format!("variant {name}")
}

pub fn setboard(fen: &str) -> String {
    format!("setboard {fen}")
}

/// Fixed time budget per move. The protocol command takes whole seconds;
/// a millisecond budget is rounded up with a floor of one second.
pub fn time_budget(ms: u64) -> String {
    let secs = ms.div_ceil(1000).max(1);
    format!("st {secs}")
}

pub fn depth(plies: u32) -> String {
    format!("sd {plies}")
}

pub fn usermove(token: &str) -> String {
    format!("usermove {token}")
}
