//! Static per-variant configuration: board dimensions, the piece alphabet
//! used by the serialized position format, the name the engine protocol
//! expects, and the neural-network weight file shipped for the variant.

use crate::types::{Piece, PieceKind, Side};

/// Closed set of supported variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Standard,
    Janggi,
    Xiangqi,
}

/// Immutable lookup data for one variant.
pub struct VariantSpec {
    pub variant: Variant,
    /// Number of columns.
    pub files: u8,
    /// Number of rows.
    pub ranks: u8,
    /// Name sent in the protocol's variant-select command.
    pub protocol_name: &'static str,
    /// Weight file the engine needs for this variant, if any.
    pub nnue_file: Option<&'static str>,
    /// Serialized starting position.
    pub start_fen: &'static str,
    /// Lowercase letter per piece kind. Uppercase encodes White.
    alphabet: &'static [(char, PieceKind)],
}

const STANDARD_ALPHABET: &[(char, PieceKind)] = &[
    ('p', PieceKind::Pawn),
    ('n', PieceKind::Knight),
    ('b', PieceKind::Bishop),
    ('r', PieceKind::Rook),
    ('q', PieceKind::Queen),
    ('k', PieceKind::King),
];

// Janggi and xiangqi share letters: k = general, a = advisor/guard,
// b = elephant, n = horse, r = chariot, c = cannon, p = soldier.
const PALACE_ALPHABET: &[(char, PieceKind)] = &[
    ('k', PieceKind::King),
    ('a', PieceKind::Advisor),
    ('b', PieceKind::Bishop),
    ('n', PieceKind::Knight),
    ('r', PieceKind::Rook),
    ('c', PieceKind::Cannon),
    ('p', PieceKind::Pawn),
];

static STANDARD: VariantSpec = VariantSpec {
    variant: Variant::Standard,
    files: 8,
    ranks: 8,
    protocol_name: "normal",
    nnue_file: None,
    start_fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1",
    alphabet: STANDARD_ALPHABET,
};

static JANGGI: VariantSpec = VariantSpec {
    variant: Variant::Janggi,
    files: 9,
    ranks: 10,
    protocol_name: "janggi",
    nnue_file: Some("janggi-85d6b6a8f226.nnue"),
    start_fen: "rnba1abnr/4k4/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/4K4/RNBA1ABNR w - - 0 1",
    alphabet: PALACE_ALPHABET,
};

static XIANGQI: VariantSpec = VariantSpec {
    variant: Variant::Xiangqi,
    files: 9,
    ranks: 10,
    protocol_name: "xiangqi",
    nnue_file: Some("xiangqi-83f16c17fe26.nnue"),
    start_fen: "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1",
    alphabet: PALACE_ALPHABET,
};

impl Variant {
    pub fn spec(self) -> &'static VariantSpec {
        match self {
            Self::Standard => &STANDARD,
            Self::Janggi => &JANGGI,
            Self::Xiangqi => &XIANGQI,
        }
    }

    /// The protocol default; no variant-select command is sent for it.
    pub fn is_default(self) -> bool {
        self == Self::Standard
    }
}

impl VariantSpec {
    /// Decode a serialized piece letter. Case encodes the side.
    pub fn piece_from_char(&self, c: char) -> Option<Piece> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let folded = c.to_ascii_lowercase();
        self.alphabet
            .iter()
            .find(|(letter, _)| *letter == folded)
            .map(|(_, kind)| Piece::new(side, *kind))
    }

    /// Encode a piece as its serialized letter, or `None` if the variant's
    /// alphabet has no letter for the kind.
    pub fn piece_char(&self, piece: Piece) -> Option<char> {
        self.alphabet
            .iter()
            .find(|(_, kind)| *kind == piece.kind)
            .map(|(letter, _)| match piece.side {
                Side::White => letter.to_ascii_uppercase(),
                Side::Black => *letter,
            })
    }

    /// Promotion letters are always lowercase in move notation.
    pub fn kind_from_letter(&self, c: char) -> Option<PieceKind> {
        self.alphabet
            .iter()
            .find(|(letter, _)| *letter == c)
            .map(|(_, kind)| *kind)
    }

    pub fn promotion_letter(&self, kind: PieceKind) -> Option<char> {
        self.alphabet
            .iter()
            .find(|(_, k)| *k == kind)
            .map(|(letter, _)| *letter)
    }

    /// 0-based file index for a file letter, bounded by the board width.
    pub fn file_index(&self, c: char) -> Option<u8> {
        if !c.is_ascii_lowercase() {
            return None;
        }
        let idx = (c as u8).wrapping_sub(b'a');
        (idx < self.files).then_some(idx)
    }

    pub fn file_char(&self, file: u8) -> Option<char> {
        (file < self.files).then(|| (b'a' + file) as char)
    }

    pub fn in_bounds(&self, file: u8, rank: u8) -> bool {
        file < self.files && rank >= 1 && rank <= self.ranks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_letters_round_trip() {
        let spec = Variant::Janggi.spec();
        for &(letter, kind) in PALACE_ALPHABET {
            let black = spec.piece_from_char(letter).unwrap();
            assert_eq!(black.side, Side::Black);
            assert_eq!(black.kind, kind);
            assert_eq!(spec.piece_char(black), Some(letter));

            let upper = letter.to_ascii_uppercase();
            let white = spec.piece_from_char(upper).unwrap();
            assert_eq!(white.side, Side::White);
            assert_eq!(spec.piece_char(white), Some(upper));
        }
    }

    #[test]
    fn test_standard_has_no_cannon() {
        let spec = Variant::Standard.spec();
        assert!(spec.piece_from_char('c').is_none());
        assert!(spec
            .piece_char(Piece::new(Side::White, PieceKind::Cannon))
            .is_none());
    }

    #[test]
    fn test_file_bounds() {
        let spec = Variant::Janggi.spec();
        assert_eq!(spec.file_index('a'), Some(0));
        assert_eq!(spec.file_index('i'), Some(8));
        assert_eq!(spec.file_index('j'), None);
        assert_eq!(Variant::Standard.spec().file_index('i'), None);
    }

    #[test]
    fn test_start_positions_parse() {
        use crate::fen::parse_fen;
        for variant in [Variant::Standard, Variant::Janggi, Variant::Xiangqi] {
            let spec = variant.spec();
            let pos = parse_fen(spec.start_fen, variant).unwrap();
            assert_eq!(pos.side_to_move, Side::White);
            assert_eq!(pos.fullmove, 1);
        }
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(Variant::Janggi.spec().files, 9);
        assert_eq!(Variant::Janggi.spec().ranks, 10);
        assert_eq!(Variant::Standard.spec().ranks, 8);
        assert!(Variant::Standard.is_default());
        assert!(!Variant::Janggi.is_default());
        assert!(Variant::Standard.spec().nnue_file.is_none());
        assert!(Variant::Janggi.spec().nnue_file.is_some());
    }
}
