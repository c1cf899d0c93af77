//! 64-square mailbox board.
//!
//! The simplest complete [`BoardCapability`]: one packed piece per square.
//! It backs `MailboxPosition` and the tests that check the board-level undo
//! contract.

use crate::board::capability::{BoardCapability, PieceLookup};
use crate::chess_errors::ChessResult;
use crate::game_state::chess_rules::castling_rook_move;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;
use crate::utils::fen_generator::generate_placement;
use crate::utils::fen_parser::parse_placement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    squares: [Piece; 64],
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mailbox {
    pub fn empty() -> Self {
        Self {
            squares: [EMPTY; 64],
        }
    }

    pub fn from_placement(placement: &str) -> ChessResult<Self> {
        Ok(Self {
            squares: parse_placement(placement)?,
        })
    }

    #[inline]
    pub fn squares(&self) -> &[Piece; 64] {
        &self.squares
    }

    /// Put `piece` on `square`; off-board squares are ignored.
    #[inline]
    pub fn set_piece(&mut self, square: Square, piece: Piece) {
        if let Some(slot) = self.squares.get_mut(square as usize) {
            *slot = piece;
        }
    }

    pub fn placement(&self) -> String {
        generate_placement(self)
    }

    fn relocate(&mut self, from: Square, to: Square) {
        self.squares[to as usize] = self.squares[from as usize];
        self.squares[from as usize] = EMPTY;
    }
}

impl PieceLookup for Mailbox {
    #[inline]
    fn piece_at(&self, square: Square) -> Piece {
        self.squares.piece_at(square)
    }
}

impl BoardCapability for Mailbox {
    fn set_placement(&mut self, placement: &str) -> ChessResult<()> {
        self.squares = parse_placement(placement)?;
        Ok(())
    }

    fn apply_move(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());

        self.squares[from as usize] = EMPTY;

        if let Ok(victim) = mv.en_passant_square() {
            self.squares[victim as usize] = EMPTY;
        }

        self.squares[to as usize] = if mv.is_promotion() {
            mv.promotion()
        } else {
            mv.piece()
        };

        if mv.is_castle() {
            if let Some(rook) = castling_rook_move(from, to) {
                self.relocate(rook.rook_from, rook.rook_to);
            }
        }
    }

    fn revert_move(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());

        if mv.is_castle() {
            if let Some(rook) = castling_rook_move(from, to) {
                self.relocate(rook.rook_to, rook.rook_from);
            }
        }

        self.squares[to as usize] = mv.captured();
        self.squares[from as usize] = mv.piece();

        if let Ok(victim) = mv.en_passant_square() {
            self.squares[victim as usize] = make_piece(mv.color().opposite(), Figure::Pawn);
        }
    }
}
