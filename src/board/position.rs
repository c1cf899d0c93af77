//! Position interface and its mailbox-backed implementation.
//!
//! [`Position`] is what a host engine talks to: a piece query, reversible
//! `play`/`unplay` and FEN output. [`MailboxPosition`] wires a
//! [`PositionState`] to a [`Mailbox`] so that state and placement move in
//! lock step, with the board reversing itself from the move returned by
//! `PositionState::unplay`.

use std::sync::Arc;

use crate::board::capability::{BoardCapability, PieceLookup};
use crate::board::mailbox::Mailbox;
use crate::chess_errors::ChessResult;
use crate::game_state::chess_types::*;
use crate::hashing::zobrist::ZobristKeys;
use crate::moves::chess_move::Move;

/// Host-facing position: the piece query comes from [`PieceLookup`].
pub trait Position: PieceLookup {
    /// Apply `mv`. With `definitive` set, the caller promises never to
    /// `unplay` this or any earlier move.
    fn play(&mut self, mv: Move, definitive: bool);

    /// Take back the last move and return it.
    fn unplay(&mut self) -> ChessResult<Move>;

    fn fen(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct MailboxPosition {
    board: Mailbox,
    state: PositionState,
}

impl MailboxPosition {
    pub fn from_fen(fen: &str, keys: Arc<ZobristKeys>) -> ChessResult<Self> {
        let mut board = Mailbox::empty();
        let state = PositionState::from_fen(fen, keys, &mut board)?;
        Ok(Self { board, state })
    }

    pub fn new_game(keys: Arc<ZobristKeys>) -> ChessResult<Self> {
        let mut board = Mailbox::empty();
        let state = PositionState::new_game(keys, &mut board)?;
        Ok(Self { board, state })
    }

    pub fn reset(&mut self) -> ChessResult<()> {
        self.state.reset(&mut self.board)
    }

    /// Parse UCI text against the current board and play it.
    pub fn play_long_algebraic(&mut self, text: &str, definitive: bool) -> ChessResult<Move> {
        let mv = Move::from_long_algebraic(text, &self.board)?;
        self.play(mv, definitive);
        Ok(mv)
    }

    #[inline]
    pub fn state(&self) -> &PositionState {
        &self.state
    }

    #[inline]
    pub fn board(&self) -> &Mailbox {
        &self.board
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.state.hash()
    }
}

impl PieceLookup for MailboxPosition {
    #[inline]
    fn piece_at(&self, square: Square) -> Piece {
        self.board.piece_at(square)
    }
}

impl Position for MailboxPosition {
    fn play(&mut self, mv: Move, definitive: bool) {
        // State first: the hash step reads the pre-move rights and en passant.
        self.state.play(mv, definitive);
        self.board.apply_move(mv);
    }

    fn unplay(&mut self) -> ChessResult<Move> {
        let mv = self.state.unplay()?;
        self.board.revert_move(mv);
        Ok(mv)
    }

    fn fen(&self) -> String {
        self.state.to_fen(&self.board)
    }
}
