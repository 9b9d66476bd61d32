//! Parses engine output lines into the handful of shapes the client acts on.
//!
//! The protocol carries no message ids; a line is classified purely by its
//! shape, and anything unrecognized is `Other`. Handlers must never treat an
//! unknown line as an error since future engines may emit new ones.

/// A classified engine output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// `feature ... done=<0|1>` — negotiation progress marker.
    FeatureDone(bool),
    /// `move <token>` — the engine committed to a move.
    Move(String),
    /// `Hint: <token>`.
    Hint(String),
    /// Periodic search progress.
    Thinking(ThinkingLine),
    /// Anything else; ignored by every consumer.
    Other,
}

/// One thinking line: `<ply> <score> <time> <nodes> [tail...]`.
/// Time is in centiseconds per the protocol. The tail is carried verbatim;
/// the analysis aggregator decides which tokens are moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingLine {
    pub depth: u32,
    pub raw_score: i32,
    pub time_cs: u64,
    pub nodes: u64,
    pub moves: Vec<String>,
}

/// Classify a single trimmed output line.
pub fn parse_output_line(line: &str) -> OutputLine {
    if let Some(rest) = line.strip_prefix("move ") {
        return OutputLine::Move(rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix("Hint: ") {
        return OutputLine::Hint(rest.trim().to_string());
    }
    if line.starts_with("feature ") {
        // done may appear anywhere among the announced features
        for token in line.split_whitespace().skip(1) {
            match token {
                "done=1" => return OutputLine::FeatureDone(true),
                "done=0" => return OutputLine::FeatureDone(false),
                _ => {}
            }
        }
        return OutputLine::Other;
    }
    if let Some(thinking) = parse_thinking_line(line) {
        return OutputLine::Thinking(thinking);
    }
    OutputLine::Other
}

fn parse_thinking_line(line: &str) -> Option<ThinkingLine> {
    let mut tokens = line.split_whitespace();
    // Leading ply must be a plain non-negative integer; that alone rules out
    // every prose line the engine prints.
    let depth: u32 = tokens.next()?.parse().ok()?;
    let raw_score: i32 = tokens.next()?.parse().ok()?;
    let time_cs: u64 = tokens.next()?.parse().ok()?;
    let nodes: u64 = tokens.next()?.parse().ok()?;
    let moves = tokens.map(str::to_string).collect();
    Some(ThinkingLine {
        depth,
        raw_score,
        time_cs,
        nodes,
        moves,
    })
}
