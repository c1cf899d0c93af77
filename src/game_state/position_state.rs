//! Incremental position state.
//!
//! `PositionState` tracks everything about a position except piece
//! placement: side to move, castling rights, en-passant target, the two
//! clocks, the Zobrist key and three history stacks (played moves, undo
//! snapshots, position hashes). Piece placement belongs to a
//! [`BoardCapability`] that the caller moves in step with `play`/`unplay`.
//!
//! A `play` marked definitive promises that `unplay` will never be asked to
//! go back past it. The undo stack is dropped outright, and the position-hash
//! stack is dropped too when the move is irreversible, since no earlier
//! position can repeat after a pawn move or capture.

use std::sync::Arc;

use crate::board::capability::{BoardCapability, PieceLookup};
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::*;
use crate::hashing::zobrist::{castling_rights_after, en_passant_after, ZobristKeys};
use crate::moves::chess_move::Move;
use crate::utils::fen_generator::{
    generate_castling_field, generate_en_passant_field, generate_placement, generate_side_field,
};
use crate::utils::fen_parser::{
    parse_castling_rights, parse_clock, parse_en_passant_square, parse_side_to_move,
    split_fen_fields,
};

const STATE_COLOR_BITS: u32 = 1;
const STATE_RIGHTS_SHIFT: u32 = 1;
const STATE_EP_SHIFT: u32 = 5;
const STATE_HALFMOVE_SHIFT: u32 = 12;
const STATE_FULLMOVE_SHIFT: u32 = 20;
const STATE_EP_MASK: u32 = 0x7F;
const STATE_HALFMOVE_MAX: u32 = 0xFF;
const STATE_FULLMOVE_MAX: u32 = 0xFFF;

/// Half-move clock value at which the fifty-move rule applies.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

#[derive(Debug, Clone)]
pub struct PositionState {
    keys: Arc<ZobristKeys>,

    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant_square: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,

    hash: u64,

    move_history: Vec<Move>,
    undo_history: Vec<UndoInfo>,
    position_history: Vec<u64>,
}

impl PositionState {
    /// Parse `fen`, load its placement into `board` and initialize the hash
    /// from the resulting pieces. All history starts empty.
    pub fn from_fen(
        fen: &str,
        keys: Arc<ZobristKeys>,
        board: &mut impl BoardCapability,
    ) -> ChessResult<Self> {
        let fields = split_fen_fields(fen)?;

        let side_to_move = parse_side_to_move(fields.side_to_move)?;
        let castling_rights = parse_castling_rights(fields.castling)?;
        let en_passant_square = parse_en_passant_square(fields.en_passant)?;
        let halfmove_clock = parse_clock(fields.halfmove, "halfmove clock")?;
        let fullmove_number = parse_clock(fields.fullmove, "fullmove number")?;
        if fullmove_number == 0 {
            return Err(ChessErrors::MalformedFen(
                "fullmove number must be positive".to_owned(),
            ));
        }

        board.set_placement(fields.placement)?;

        let hash = keys.compute(&*board, castling_rights, en_passant_square, side_to_move);
        log::debug!("position loaded from FEN '{fen}' (hash {hash:#018x})");

        Ok(Self {
            keys,
            side_to_move,
            castling_rights,
            en_passant_square,
            halfmove_clock,
            fullmove_number,
            hash,
            move_history: Vec::new(),
            undo_history: Vec::new(),
            position_history: Vec::new(),
        })
    }

    /// Standard starting position.
    pub fn new_game(keys: Arc<ZobristKeys>, board: &mut impl BoardCapability) -> ChessResult<Self> {
        Self::from_fen(STARTING_POSITION_FEN, keys, board)
    }

    /// Return to the starting position, keeping the key table.
    pub fn reset(&mut self, board: &mut impl BoardCapability) -> ChessResult<()> {
        *self = Self::new_game(Arc::clone(&self.keys), board)?;
        Ok(())
    }

    /// Render FEN, reading placement from `board`.
    pub fn to_fen(&self, board: &(impl PieceLookup + ?Sized)) -> String {
        format!(
            "{} {} {} {} {} {}",
            generate_placement(board),
            generate_side_field(self.side_to_move),
            generate_castling_field(self.castling_rights),
            generate_en_passant_field(self.en_passant_square),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Apply the incremental hash step for `mv` against the current rights
    /// and en-passant square. Must run before those are updated for `mv`.
    #[inline]
    pub fn update_hash(&mut self, mv: Move) {
        self.hash = self
            .keys
            .update(self.hash, self.castling_rights, self.en_passant_square, mv);
    }

    /// Record `mv` and update rights, en passant, clocks, side and hash.
    ///
    /// The board is not touched; move it with the same `mv`.
    pub fn play(&mut self, mv: Move, definitive: bool) {
        let hash_before = self.hash;
        self.update_hash(mv);

        if definitive {
            self.undo_history.clear();
            if mv.is_irreversible() {
                self.position_history.clear();
            } else {
                self.position_history.push(hash_before);
            }
        } else {
            self.undo_history.push(UndoInfo {
                castling_rights: self.castling_rights,
                en_passant_square: self.en_passant_square,
                halfmove_clock: self.halfmove_clock,
            });
            self.position_history.push(hash_before);
        }

        let mover = mv.color();
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        if mv.is_irreversible() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        self.castling_rights = castling_rights_after(self.castling_rights, mv);
        self.en_passant_square = en_passant_after(mv);

        if mover != self.side_to_move {
            log::warn!(
                "{mv} moves a {mover:?} piece while {:?} is to move",
                self.side_to_move
            );
        }
        self.side_to_move = self.side_to_move.opposite();

        self.move_history.push(mv);
        log::debug!("played {mv} (definitive={definitive}, hash {:#018x})", self.hash);
    }

    /// Take back the last move and return it so the caller can revert the
    /// board.
    ///
    /// Fails with [`ChessErrors::NoHistory`] when nothing was played and with
    /// [`ChessErrors::HistoryTruncated`] when the last snapshot was discarded
    /// by a definitive play.
    pub fn unplay(&mut self) -> ChessResult<Move> {
        let Some(&mv) = self.move_history.last() else {
            return Err(ChessErrors::NoHistory);
        };
        let undo = self.undo_history.pop().ok_or(ChessErrors::HistoryTruncated)?;
        self.move_history.pop();

        self.castling_rights = undo.castling_rights;
        self.en_passant_square = undo.en_passant_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.side_to_move = self.side_to_move.opposite();
        if mv.color() == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_sub(1).max(1);
        }

        self.update_hash(mv);
        let recorded = self.position_history.pop();
        debug_assert!(
            recorded.map_or(true, |h| h == self.hash),
            "restored hash disagrees with recorded history"
        );

        log::debug!("unplayed {mv} (hash {:#018x})", self.hash);
        Ok(mv)
    }

    /// Pack side, rights, en passant and clocks into one word.
    ///
    /// Layout: bit 0 side, bits 1..=4 rights, bits 5..=11 en-passant square
    /// (64 when none), bits 12..=19 half-move clock, bits 20..=31 full-move
    /// number. Clocks saturate at their field width.
    pub fn pack(&self) -> u32 {
        let color = match self.side_to_move {
            Color::White => 0,
            Color::Black => 1,
        };
        let ep = self.en_passant_square.unwrap_or(NO_SQUARE) as u32;

        color
            | (u32::from(self.castling_rights & CASTLE_ALL) << STATE_RIGHTS_SHIFT)
            | ((ep & STATE_EP_MASK) << STATE_EP_SHIFT)
            | (self.halfmove_clock.min(STATE_HALFMOVE_MAX) << STATE_HALFMOVE_SHIFT)
            | (self.fullmove_number.min(STATE_FULLMOVE_MAX) << STATE_FULLMOVE_SHIFT)
    }

    /// Inverse of [`PositionState::pack`] as a plain tuple of fields.
    pub fn unpack(word: u32) -> PackedState {
        let ep = ((word >> STATE_EP_SHIFT) & STATE_EP_MASK) as Square;
        PackedState {
            side_to_move: if word & STATE_COLOR_BITS != 0 {
                Color::Black
            } else {
                Color::White
            },
            castling_rights: ((word >> STATE_RIGHTS_SHIFT) & 0xF) as CastlingRights,
            en_passant_square: (ep < NO_SQUARE).then_some(ep),
            halfmove_clock: (word >> STATE_HALFMOVE_SHIFT) & STATE_HALFMOVE_MAX,
            fullmove_number: (word >> STATE_FULLMOVE_SHIFT) & STATE_FULLMOVE_MAX,
        }
    }

    /// How many earlier recorded positions share the current hash.
    pub fn repetition_count(&self) -> usize {
        self.position_history
            .iter()
            .filter(|&&h| h == self.hash)
            .count()
    }

    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_HALFMOVES
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn keys(&self) -> &Arc<ZobristKeys> {
        &self.keys
    }

    #[inline]
    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    #[inline]
    pub fn undo_history(&self) -> &[UndoInfo] {
        &self.undo_history
    }

    #[inline]
    pub fn position_history(&self) -> &[u64] {
        &self.position_history
    }

    /// Full recompute of the hash against `board`, for consistency checks.
    pub fn recompute_hash(&self, board: &(impl PieceLookup + ?Sized)) -> u64 {
        self.keys.compute(
            board,
            self.castling_rights,
            self.en_passant_square,
            self.side_to_move,
        )
    }
}

/// Decoded state word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedState {
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}
