//! Coordinate move notation (`a1b2`, `a10b9`, `e7e8q`).
//!
//! Ranks can be two digits on 10-rank boards, so the from/to halves cannot be
//! split at a fixed offset. The parser scans digits after the first file
//! letter; the first non-digit is the second file letter.

use crate::types::{MoveToken, Square};
use crate::variant::Variant;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("Malformed move token: {0}")]
    MalformedToken(String),
    #[error("Move coordinates outside the board: {0}")]
    OutOfBounds(String),
}

/// Parse a single coordinate move token for the given variant.
pub fn parse_move(token: &str, variant: Variant) -> Result<MoveToken, NotationError> {
    let spec = variant.spec();
    let malformed = || NotationError::MalformedToken(token.to_string());

    let chars: Vec<char> = token.chars().collect();
    // Shortest legal token is <file><rank><file><rank> with one-digit ranks.
    if chars.len() < 4 {
        return Err(malformed());
    }

    let from_file_char = chars[0];
    let mut i = 1;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    // i now sits on the second file letter; need at least one rank digit
    // before it and at least one character after it.
    if i == 1 || i + 1 >= chars.len() {
        return Err(malformed());
    }
    let from_rank: u8 = chars[1..i]
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| malformed())?;

    let to_file_char = chars[i];
    let mut j = i + 1;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    if j == i + 1 {
        return Err(malformed());
    }
    let to_rank: u8 = chars[i + 1..j]
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| malformed())?;

    let promotion = match chars.len() - j {
        0 => None,
        1 => Some(spec.kind_from_letter(chars[j]).ok_or_else(malformed)?),
        _ => return Err(malformed()),
    };

    let out_of_bounds = || NotationError::OutOfBounds(token.to_string());
    let from_file = spec.file_index(from_file_char).ok_or_else(out_of_bounds)?;
    let to_file = spec.file_index(to_file_char).ok_or_else(out_of_bounds)?;
    if !spec.in_bounds(from_file, from_rank) || !spec.in_bounds(to_file, to_rank) {
        return Err(out_of_bounds());
    }

    Ok(MoveToken {
        from: Square::new(from_file, from_rank),
        to: Square::new(to_file, to_rank),
        promotion,
    })
}

/// Format a move token back into coordinate notation.
pub fn format_move(mv: &MoveToken, variant: Variant) -> String {
    let spec = variant.spec();
    let mut s = String::new();
    if let Some(c) = spec.file_char(mv.from.file) {
        s.push(c);
    }
    s.push_str(&mv.from.rank.to_string());
    if let Some(c) = spec.file_char(mv.to.file) {
        s.push(c);
    }
    s.push_str(&mv.to.rank.to_string());
    if let Some(kind) = mv.promotion {
        if let Some(c) = spec.promotion_letter(kind) {
            s.push(c);
        }
    }
    s
}
