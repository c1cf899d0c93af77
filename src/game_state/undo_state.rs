use crate::game_state::chess_types::*;

/// Minimal snapshot needed to reverse one ply of [`PositionState`].
///
/// Piece placement is not part of it; the board capability reverses itself
/// from the `Move` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoInfo {
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u32,
}
