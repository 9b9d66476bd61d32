//! Serialized position codec.
//!
//! The format is FEN-shaped: a `/`-separated board field (top row first,
//! decimal numbers for runs of empty cells, letters from the variant
//! alphabet with case encoding the side), a side-to-move field, and a
//! trailing fullmove counter. Castling/en-passant/halfmove fields are
//! accepted on input for compatibility and emitted as placeholders.

use crate::types::{MoveToken, Piece, Side, Square};
use crate::variant::Variant;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FenError {
    #[error("Invalid position format: {0}")]
    InvalidFormat(String),
    #[error("Row {row} describes {found} cells, expected {expected}")]
    BadRowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Board has {found} rows, expected {expected}")]
    BadRowCount { found: usize, expected: usize },
    #[error("Unknown piece letter: {0}")]
    UnknownPiece(char),
    #[error("Invalid side to move: {0}")]
    BadSideToMove(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("Move coordinates outside the board")]
    OutOfBounds,
    #[error("No piece at the move's source square")]
    NoPieceAtSource,
    #[error("Piece at the source square belongs to the side not to move")]
    UnexpectedTurn,
    #[error("Destination square holds a piece of the moving side")]
    CaptureOwnPiece,
}

/// A full board position. Codec calls build a fresh value; nothing is cached
/// or shared between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub variant: Variant,
    /// Row-major grid, top row (highest rank) first.
    cells: Vec<Option<Piece>>,
    pub side_to_move: Side,
    pub fullmove: u32,
}

impl Position {
    /// An empty board for the variant, White to move.
    pub fn empty(variant: Variant) -> Self {
        let spec = variant.spec();
        Self {
            variant,
            cells: vec![None; spec.files as usize * spec.ranks as usize],
            side_to_move: Side::White,
            fullmove: 1,
        }
    }

    fn index(&self, sq: Square) -> usize {
        let spec = self.variant.spec();
        sq.row(spec.ranks) * spec.files as usize + sq.file as usize
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[self.index(sq)]
    }

    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        let idx = self.index(sq);
        self.cells[idx] = piece;
    }

    /// Apply a move structurally: clear the source, overwrite the destination
    /// (capturing whatever was there), toggle the side to move, and bump the
    /// fullmove counter when the turn returns to White. Game-rule legality is
    /// the engine's concern and is not checked here.
    pub fn apply_move(&self, mv: &MoveToken) -> Result<Position, MoveError> {
        let spec = self.variant.spec();
        if !spec.in_bounds(mv.from.file, mv.from.rank) || !spec.in_bounds(mv.to.file, mv.to.rank) {
            return Err(MoveError::OutOfBounds);
        }
        let mut moved = self.piece_at(mv.from).ok_or(MoveError::NoPieceAtSource)?;
        if let Some(kind) = mv.promotion {
            moved.kind = kind;
        }

        let mut next = self.clone();
        next.set_piece(mv.from, None);
        next.set_piece(mv.to, Some(moved));
        next.side_to_move = self.side_to_move.opposite();
        if next.side_to_move == Side::White {
            next.fullmove += 1;
        }
        Ok(next)
    }

    /// Advisory turn/capture checks. Deliberately not part of [`apply_move`]:
    /// callers replaying engine output skip them, UIs validating a drag may
    /// want them.
    pub fn check_move(&self, mv: &MoveToken) -> Result<(), MoveError> {
        let spec = self.variant.spec();
        if !spec.in_bounds(mv.from.file, mv.from.rank) || !spec.in_bounds(mv.to.file, mv.to.rank) {
            return Err(MoveError::OutOfBounds);
        }
        let moved = self.piece_at(mv.from).ok_or(MoveError::NoPieceAtSource)?;
        if moved.side != self.side_to_move {
            return Err(MoveError::UnexpectedTurn);
        }
        if let Some(target) = self.piece_at(mv.to) {
            if target.side == moved.side {
                return Err(MoveError::CaptureOwnPiece);
            }
        }
        Ok(())
    }
}

/// Parse a serialized position for the given variant.
///
/// Row widths and the row count are validated strictly; a malformed board
/// field is an error, never silently padded or truncated.
pub fn parse_fen(fen: &str, variant: Variant) -> Result<Position, FenError> {
    let spec = variant.spec();
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(FenError::InvalidFormat(fen.to_string()));
    }

    let rows: Vec<&str> = fields[0].split('/').collect();
    if rows.len() != spec.ranks as usize {
        return Err(FenError::BadRowCount {
            found: rows.len(),
            expected: spec.ranks as usize,
        });
    }

    let mut position = Position::empty(variant);
    for (row_idx, row) in rows.iter().enumerate() {
        let mut col = 0usize;
        let mut chars = row.chars().peekable();
        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                // Runs are full decimal numbers so a 10-wide row can encode
                // a complete empty row as "10".
                let mut run = String::from(c);
                while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    run.push(*d);
                    chars.next();
                }
                let run: usize = run
                    .parse()
                    .map_err(|_| FenError::InvalidFormat(fen.to_string()))?;
                col += run;
            } else {
                let piece = spec
                    .piece_from_char(c)
                    .ok_or(FenError::UnknownPiece(c))?;
                if col >= spec.files as usize {
                    return Err(FenError::BadRowWidth {
                        row: row_idx,
                        found: col + 1,
                        expected: spec.files as usize,
                    });
                }
                position.cells[row_idx * spec.files as usize + col] = Some(piece);
                col += 1;
            }
        }
        if col != spec.files as usize {
            return Err(FenError::BadRowWidth {
                row: row_idx,
                found: col,
                expected: spec.files as usize,
            });
        }
    }

    let side_field = fields[1];
    position.side_to_move = match side_field {
        "w" => Side::White,
        "b" => Side::Black,
        other => return Err(FenError::BadSideToMove(other.to_string())),
    };

    if let Some(fullmove) = fields.get(5) {
        position.fullmove = fullmove
            .parse()
            .map_err(|_| FenError::InvalidFormat(fen.to_string()))?;
    }

    Ok(position)
}

/// Serialize a position. Inverse of [`parse_fen`] for canonical input.
pub fn format_fen(position: &Position) -> String {
    let spec = position.variant.spec();
    let mut board = String::new();
    for row in 0..spec.ranks as usize {
        if row > 0 {
            board.push('/');
        }
        let mut empty_run = 0usize;
        for col in 0..spec.files as usize {
            match position.cells[row * spec.files as usize + col] {
                Some(piece) => {
                    if empty_run > 0 {
                        board.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    // Alphabet coverage is a Position invariant; skipping an
                    // unrepresentable piece would corrupt the row width.
                    if let Some(c) = spec.piece_char(piece) {
                        board.push(c);
                    }
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            board.push_str(&empty_run.to_string());
        }
    }

    format!(
        "{} {} - - 0 {}",
        board,
        position.side_to_move.to_char(),
        position.fullmove
    )
}
