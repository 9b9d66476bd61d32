//! Variant board model: position codec, coordinate move notation, and the
//! static per-variant configuration tables. Pure and synchronous; the live
//! engine protocol lives in the `engine` crate.

pub mod analysis;
pub mod fen;
pub mod notation;
pub mod types;
pub mod variant;

pub use analysis::{AnalysisScore, AnalysisSnapshot};
pub use fen::{format_fen, parse_fen, FenError, MoveError, Position};
pub use notation::{format_move, parse_move, NotationError};
pub use types::{MoveToken, Piece, PieceKind, Side, Square};
pub use variant::{Variant, VariantSpec};
