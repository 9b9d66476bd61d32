//! Splits the transport's raw output chunks into complete lines.
//!
//! The transport hands over whatever bytes the engine produced since the
//! last poll; chunk boundaries fall anywhere, so a partial trailing line is
//! carried over until the terminator arrives. No length limit is imposed on
//! the carry buffer; the engine protocol is cooperative.

/// Stateful chunk-to-line splitter. Owned by the session's single read pump;
/// not safe for concurrent use.
#[derive(Debug, Default)]
pub struct LineReader {
    carry: String,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line completed by it, trimmed of
    /// surrounding whitespace. Blank lines are discarded.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.carry.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.carry.find('\n') {
            let raw: String = self.carry.drain(..=pos).collect();
            let line = raw.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }

    /// The trailing partial line waiting for its terminator.
    pub fn pending(&self) -> &str {
        &self.carry
    }
}
