//! Folds successive thinking lines into a running analysis snapshot.

use janggi::{parse_move, AnalysisScore, AnalysisSnapshot, Variant};

use crate::xboard::ThinkingLine;

/// Update `snapshot` in place from one thinking line.
///
/// The protocol intermixes numeric and move fields positionally, so the tail
/// tokens are filtered against the move-token shape; anything that does not
/// parse as a move for the variant is silently excluded rather than treated
/// as an error.
pub fn fold_thinking(snapshot: &mut AnalysisSnapshot, line: &ThinkingLine, variant: Variant) {
    snapshot.depth = line.depth;
    snapshot.score = Some(AnalysisScore::from_engine(line.raw_score));
    snapshot.time_ms = line.time_cs * 10;
    snapshot.nodes = line.nodes;
    snapshot.nps = if snapshot.time_ms == 0 {
        0
    } else {
        snapshot.nodes * 1000 / snapshot.time_ms
    };
    snapshot.pv = line
        .moves
        .iter()
        .filter(|token| parse_move(token, variant).is_ok())
        .cloned()
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xboard::{parse_output_line, OutputLine};

    fn thinking(line: &str) -> ThinkingLine {
        match parse_output_line(line) {
            OutputLine::Thinking(t) => t,
            other => panic!("expected thinking line, got {other:?}"),
        }
    }

    #[test]
    fn test_fold_basic() {
        let mut snapshot = AnalysisSnapshot::default();
        fold_thinking(
            &mut snapshot,
            &thinking("12 145 1234 567890 e2e4 e7e5"),
            Variant::Janggi,
        );
        assert_eq!(snapshot.depth, 12);
        assert_eq!(snapshot.score, Some(AnalysisScore::Centipawns(145)));
        assert_eq!(snapshot.time_ms, 12340);
        assert_eq!(snapshot.nodes, 567890);
        assert_eq!(snapshot.pv, vec!["e2e4", "e7e5"]);
        assert!(snapshot.nps > 0);
    }

    #[test]
    fn test_fold_replaces_principal_line() {
        let mut snapshot = AnalysisSnapshot::default();
        fold_thinking(
            &mut snapshot,
            &thinking("4 10 5 100 a1a2 a10a9"),
            Variant::Janggi,
        );
        fold_thinking(&mut snapshot, &thinking("5 24 9 250 i1i2"), Variant::Janggi);
        assert_eq!(snapshot.depth, 5);
        assert_eq!(snapshot.pv, vec!["i1i2"]);
    }

    #[test]
    fn test_fold_excludes_non_move_tail_tokens() {
        let mut snapshot = AnalysisSnapshot::default();
        fold_thinking(
            &mut snapshot,
            &thinking("8 0 100 9000 e2e4 (e7e5) e7e6 <HT>"),
            Variant::Janggi,
        );
        assert_eq!(snapshot.pv, vec!["e2e4", "e7e6"]);
    }

    #[test]
    fn test_fold_zero_elapsed_time() {
        let mut snapshot = AnalysisSnapshot::default();
        fold_thinking(&mut snapshot, &thinking("1 0 0 512"), Variant::Janggi);
        assert_eq!(snapshot.time_ms, 0);
        assert_eq!(snapshot.nps, 0);
    }

    #[test]
    fn test_fold_mate_score() {
        let mut snapshot = AnalysisSnapshot::default();
        fold_thinking(
            &mut snapshot,
            &thinking("20 9998 500 123456 e2e4"),
            Variant::Janggi,
        );
        assert_eq!(snapshot.score, Some(AnalysisScore::Mate(1)));
    }
}
