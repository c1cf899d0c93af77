//! Zobrist hashing support for fast position identity and repetition tracking.
//!
//! Keys live in an owned [`ZobristKeys`] value built once and shared through
//! an `Arc`, so there is no lazily-initialized global. The default seed is
//! fixed, which keeps hashes deterministic across runs for tests and
//! debugging.
//!
//! [`ZobristKeys::update`] is the incremental step. It is an involution: the
//! same move applied twice from the same rights/en-passant state returns the
//! original hash, which is how `unplay` restores the key without
//! recomputation.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::board::capability::PieceLookup;
use crate::game_state::chess_rules::{castling_rook_move, CASTLING_CORNERS};
use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;

const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
pub struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    castling: [u64; 16],
    en_passant_file: [u64; 8],
    side_to_move: u64,
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl ZobristKeys {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut piece_square = [[[0u64; 64]; 6]; 2];
        for color in &mut piece_square {
            for piece in color {
                for sq in piece {
                    *sq = rng.random();
                }
            }
        }

        let mut castling = [0u64; 16];
        for key in &mut castling {
            *key = rng.random();
        }

        let mut en_passant_file = [0u64; 8];
        for key in &mut en_passant_file {
            *key = rng.random();
        }

        let side_to_move = rng.random();

        log::debug!("zobrist keys generated from seed {seed:#x}");

        Self {
            piece_square,
            castling,
            en_passant_file,
            side_to_move,
        }
    }

    /// Key for a piece on a square; zero for an empty piece.
    #[inline]
    pub fn piece_square_key(&self, piece: Piece, square: Square) -> u64 {
        match piece_figure(piece).table_index() {
            Some(figure) => {
                self.piece_square[piece_color(piece).index()][figure][square as usize & 63]
            }
            None => 0,
        }
    }

    #[inline]
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling[(rights & 0x0F) as usize]
    }

    #[inline]
    pub fn en_passant_file_key(&self, square: Square) -> u64 {
        self.en_passant_file[square_file(square) as usize]
    }

    #[inline]
    pub fn side_to_move_key(&self) -> u64 {
        self.side_to_move
    }

    /// Full hash of board, rights, en-passant file and side to move.
    pub fn compute(
        &self,
        board: &(impl PieceLookup + ?Sized),
        rights: CastlingRights,
        en_passant: Option<Square>,
        side_to_move: Color,
    ) -> u64 {
        let mut key = 0u64;

        for square in 0..64u8 {
            let piece = board.piece_at(square);
            if !is_empty_piece(piece) {
                key ^= self.piece_square_key(piece, square);
            }
        }

        key ^= self.castling_key(rights);

        if let Some(ep_square) = en_passant {
            key ^= self.en_passant_file_key(ep_square);
        }

        if side_to_move == Color::Black {
            key ^= self.side_to_move;
        }

        key
    }

    /// Incremental hash step for `mv`.
    ///
    /// `rights` and `en_passant` must be the values in force before `mv` is
    /// played; the post-move values are derived from the move itself.
    pub fn update(
        &self,
        hash: u64,
        rights: CastlingRights,
        en_passant: Option<Square>,
        mv: Move,
    ) -> u64 {
        let (from, to) = (mv.from(), mv.to());
        let piece = mv.piece();
        let mut key = hash;

        key ^= self.piece_square_key(piece, from);
        key ^= self.piece_square_key(piece, to);

        if mv.is_capture() {
            key ^= self.piece_square_key(mv.captured(), to);
        }

        if let Ok(victim) = mv.en_passant_square() {
            let pawn = make_piece(mv.color().opposite(), Figure::Pawn);
            key ^= self.piece_square_key(pawn, victim);
        }

        if mv.is_promotion() {
            key ^= self.piece_square_key(piece, to);
            key ^= self.piece_square_key(mv.promotion(), to);
        }

        if mv.is_castle() {
            if let Some(rook_move) = castling_rook_move(from, to) {
                let rook = make_piece(mv.color(), Figure::Rook);
                key ^= self.piece_square_key(rook, rook_move.rook_from);
                key ^= self.piece_square_key(rook, rook_move.rook_to);
            }
        }

        let new_rights = castling_rights_after(rights, mv);
        if new_rights != rights {
            key ^= self.castling_key(rights);
            key ^= self.castling_key(new_rights);
        }

        let new_en_passant = en_passant_after(mv);
        if new_en_passant != en_passant {
            if let Some(old) = en_passant {
                key ^= self.en_passant_file_key(old);
            }
            if let Some(new) = new_en_passant {
                key ^= self.en_passant_file_key(new);
            }
        }

        key ^ self.side_to_move
    }
}

/// Rights left after `mv`: a king move clears both rights of its side, and
/// touching a rook corner (from or to) clears that corner's right.
pub fn castling_rights_after(rights: CastlingRights, mv: Move) -> CastlingRights {
    let mut new_rights = rights;

    if mv.figure() == Figure::King {
        new_rights &= match mv.color() {
            Color::White => !(CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE),
            Color::Black => !(CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE),
        };
    }

    for (corner, right) in CASTLING_CORNERS {
        if mv.from() == corner || mv.to() == corner {
            new_rights &= !right;
        }
    }

    new_rights
}

/// En-passant target after `mv`: set only by a double pawn advance.
#[inline]
pub fn en_passant_after(mv: Move) -> Option<Square> {
    mv.en_passant_target().ok()
}
