//! Engine analysis types shared between the protocol client and callers.

use serde::{Deserialize, Serialize};

/// Raw scores with a magnitude above this are mate encodings, not material.
pub const MATE_THRESHOLD: i32 = 9000;

/// A mate in N plies is reported as `MATE_SCORE - N` (sign for the winner).
pub const MATE_SCORE: i32 = 10000;

/// Engine evaluation score.
///
/// Centipawns: positive = the engine's side is better.
/// Mate: positive N = mate in N full moves, negative N = mated in N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisScore {
    Centipawns(i32),
    Mate(i32),
}

impl AnalysisScore {
    /// Decode a raw protocol score into centipawns or a mate distance.
    pub fn from_engine(raw: i32) -> Self {
        if raw.abs() > MATE_THRESHOLD {
            let plies = MATE_SCORE - raw.abs();
            let moves = (plies + 1) / 2;
            Self::Mate(if raw > 0 { moves } else { -moves })
        } else {
            Self::Centipawns(raw)
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", f64::from(*cp) / 100.0),
            Self::Mate(m) => {
                if *m >= 0 {
                    format!("+M{m}")
                } else {
                    format!("-M{}", m.abs())
                }
            }
        }
    }
}

impl std::fmt::Display for AnalysisScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A snapshot of search progress, folded from successive thinking lines.
/// Frozen once the terminal move line resolves the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub depth: u32,
    pub score: Option<AnalysisScore>,
    pub time_ms: u64,
    pub nodes: u64,
    /// Derived from nodes and elapsed time; zero while no time has elapsed.
    pub nps: u64,
    /// Principal line as coordinate move strings.
    pub pv: Vec<String>,
}
