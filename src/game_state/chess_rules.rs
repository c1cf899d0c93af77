//! Canonical chess-rule constants.
//!
//! Static literals for the starting position, the rook corner squares that
//! carry castling rights, and the rook relocation performed by each castle.

use crate::game_state::chess_types::*;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const A1: Square = 0;
pub const H1: Square = 7;
pub const A8: Square = 56;
pub const H8: Square = 63;

/// Corner square paired with the right it guards.
pub const CASTLING_CORNERS: [(Square, CastlingRights); 4] = [
    (A1, CASTLE_WHITE_QUEENSIDE),
    (H1, CASTLE_WHITE_KINGSIDE),
    (A8, CASTLE_BLACK_QUEENSIDE),
    (H8, CASTLE_BLACK_KINGSIDE),
];

/// One castle: king origin/destination and rook origin/destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRookMove {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

pub const CASTLING_ROOK_MOVES: [CastlingRookMove; 4] = [
    // e1g1
    CastlingRookMove {
        king_from: 4,
        king_to: 6,
        rook_from: 7,
        rook_to: 5,
    },
    // e1c1
    CastlingRookMove {
        king_from: 4,
        king_to: 2,
        rook_from: 0,
        rook_to: 3,
    },
    // e8g8
    CastlingRookMove {
        king_from: 60,
        king_to: 62,
        rook_from: 63,
        rook_to: 61,
    },
    // e8c8
    CastlingRookMove {
        king_from: 60,
        king_to: 58,
        rook_from: 56,
        rook_to: 59,
    },
];

/// Rook relocation for a king move, if the move is one of the four castles.
pub fn castling_rook_move(king_from: Square, king_to: Square) -> Option<CastlingRookMove> {
    CASTLING_ROOK_MOVES
        .iter()
        .copied()
        .find(|c| c.king_from == king_from && c.king_to == king_to)
}
