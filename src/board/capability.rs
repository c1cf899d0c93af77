//! Board capabilities consumed by the position-state core.
//!
//! `PositionState` never owns piece placement. It reads pieces through
//! [`PieceLookup`] (hash initialization, FEN rendering) and hands placement
//! parsing to [`BoardCapability`]. A board reverses a ply from the same
//! [`Move`] value it applied, so the move record must carry the captured
//! piece for `revert_move` to be exact.

use crate::chess_errors::ChessResult;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;

/// Read-only piece query.
pub trait PieceLookup {
    /// Piece on `square`, [`EMPTY`] when vacant.
    fn piece_at(&self, square: Square) -> Piece;
}

/// Mutable piece placement driven by the position-state core.
pub trait BoardCapability: PieceLookup {
    /// Replace the placement with the FEN placement field.
    fn set_placement(&mut self, placement: &str) -> ChessResult<()>;

    /// Move pieces for `mv`, including the castling rook, the en-passant
    /// victim and the promoted figure.
    fn apply_move(&mut self, mv: Move);

    /// Exact inverse of [`BoardCapability::apply_move`] for the same `mv`.
    fn revert_move(&mut self, mv: Move);
}

impl PieceLookup for [Piece; 64] {
    #[inline]
    fn piece_at(&self, square: Square) -> Piece {
        self.get(square as usize).copied().unwrap_or(EMPTY)
    }
}
