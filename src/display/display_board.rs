//! Character-grid board used for UI playback.
//!
//! `DisplayBoard` keeps its own copy of the FEN fields as plain text and
//! applies move text directly to an 8x8 grid of FEN piece letters. It does
//! not share state with `PositionState`; a UI can replay a game here without
//! a board capability or a hash table.
//!
//! Grid rows follow FEN order: row 0 is rank 8, row 7 is rank 1.

use std::fmt;

use crate::board::capability::PieceLookup;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_rules::{castling_rook_move, A1, A8, H1, H8};
use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;
use crate::utils::algebraic::square_to_algebraic;
use crate::utils::fen_generator::{generate_castling_field, generate_placement};
use crate::utils::fen_parser::{
    parse_castling_rights, parse_clock, parse_en_passant_square, parse_placement,
    parse_side_to_move, split_fen_fields,
};

pub const EMPTY_CELL: char = '.';

/// Right letter lost when a corner square is touched.
const CORNER_LETTERS: [(Square, char); 4] = [(A1, 'Q'), (H1, 'K'), (A8, 'q'), (H8, 'k')];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBoard {
    cells: [[char; 8]; 8],
    active_color: char,
    castling_rights: String,
    en_passant_target: String,
    half_move_clock: u32,
    full_move_clock: u32,
    marks: [[bool; 8]; 8],
}

/// Grid coordinates of `square`; `None` off the board.
#[inline]
fn cell_of(square: Square) -> Option<(usize, usize)> {
    (square < NO_SQUARE)
        .then(|| (7 - square_rank(square) as usize, square_file(square) as usize))
}

impl DisplayBoard {
    /// Build from FEN. Missing trailing fields take their defaults; the
    /// placement and every present field are validated.
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let fields = split_fen_fields(fen)?;

        let pieces = parse_placement(fields.placement)?;
        let mut cells = [[EMPTY_CELL; 8]; 8];
        for (square, piece) in pieces.iter().enumerate() {
            if let Some((row, col)) = cell_of(square as Square) {
                cells[row][col] = piece_to_fen_char(*piece).unwrap_or(EMPTY_CELL);
            }
        }

        let active_color = match parse_side_to_move(fields.side_to_move)? {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let castling_rights = generate_castling_field(parse_castling_rights(fields.castling)?);
        parse_en_passant_square(fields.en_passant)?;
        let full_move_clock = parse_clock(fields.fullmove, "full-move number")?;
        if full_move_clock == 0 {
            return Err(ChessErrors::MalformedFen(
                "full-move number must be positive".to_owned(),
            ));
        }

        Ok(Self {
            cells,
            active_color,
            castling_rights,
            en_passant_target: fields.en_passant.to_string(),
            half_move_clock: parse_clock(fields.halfmove, "half-move clock")?,
            full_move_clock,
            marks: [[false; 8]; 8],
        })
    }

    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            generate_placement(self),
            self.active_color,
            self.castling_rights,
            self.en_passant_target,
            self.half_move_clock,
            self.full_move_clock
        )
    }

    /// Apply UCI move text such as `e2e4` or `e7e8q`.
    ///
    /// Castling is recognized from the king's two-file step, en passant from
    /// a diagonal pawn move onto an empty cell.
    pub fn play(&mut self, move_text: &str) -> ChessResult<()> {
        let mv = Move::from_long_algebraic(move_text, &*self)?;
        let (from, to) = (mv.from(), mv.to());

        let piece = self.cell(from);
        let white = piece.is_ascii_uppercase();
        let mover_side = if white { 'w' } else { 'b' };
        if mover_side != self.active_color {
            log::warn!(
                "{move_text} moves a {} piece while {} is to move",
                if white { "white" } else { "black" },
                if self.active_color == 'w' { "white" } else { "black" },
            );
        }

        let is_pawn = piece.eq_ignore_ascii_case(&'p');
        let is_king = piece.eq_ignore_ascii_case(&'k');
        let mut is_capture = self.cell(to) != EMPTY_CELL;

        if is_pawn && square_file(from) != square_file(to) && !is_capture {
            let victim = make_square(square_file(to), square_rank(from));
            self.set_cell(victim, EMPTY_CELL);
            is_capture = true;
        }

        let landing = match piece_to_fen_char(mv.promotion()) {
            Some(promoted) => promoted,
            None => piece,
        };
        self.set_cell(from, EMPTY_CELL);
        self.set_cell(to, landing);

        if is_king {
            if let Some(rook) = castling_rook_move(from, to) {
                self.relocate(rook.rook_from, rook.rook_to);
            }
        }

        self.update_castling_rights(from, to, is_king, white);

        self.en_passant_target = match mv.en_passant_target() {
            Ok(target) if is_pawn => square_to_algebraic(target)?,
            _ => "-".to_string(),
        };

        if mv.is_promotion() || is_pawn || is_capture {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock += 1;
        }
        if !white {
            self.full_move_clock += 1;
        }
        self.active_color = if self.active_color == 'w' { 'b' } else { 'w' };

        Ok(())
    }

    /// Move whatever is on `from` to `to` without touching any other field.
    pub fn relocate(&mut self, from: Square, to: Square) {
        let piece = self.cell(from);
        self.set_cell(from, EMPTY_CELL);
        self.set_cell(to, piece);
    }

    /// Build a board from `fen` and play each whitespace-separated move.
    pub fn replay(fen: &str, moves: &str) -> ChessResult<Self> {
        let mut board = Self::from_fen(fen)?;
        for text in moves.split_whitespace() {
            board.play(text)?;
        }
        Ok(board)
    }

    /// Off-board squares are ignored.
    pub fn mark_square(&mut self, square: Square) {
        if let Some((row, col)) = cell_of(square) {
            self.marks[row][col] = true;
        }
    }

    pub fn clear_marks(&mut self) {
        self.marks = [[false; 8]; 8];
    }

    pub fn is_marked(&self, square: Square) -> bool {
        cell_of(square).is_some_and(|(row, col)| self.marks[row][col])
    }

    /// Plain-text grid with rank and file labels. Marked cells are wrapped
    /// in brackets.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("   a  b  c  d  e  f  g  h\n");

        for (row, cells) in self.cells.iter().enumerate() {
            let rank = char::from(b'8' - row as u8);
            out.push(rank);
            out.push(' ');
            for (col, &cell) in cells.iter().enumerate() {
                if self.marks[row][col] {
                    out.push('[');
                    out.push(cell);
                    out.push(']');
                } else {
                    out.push(' ');
                    out.push(cell);
                    out.push(' ');
                }
            }
            out.push(' ');
            out.push(rank);
            out.push('\n');
        }

        out.push_str("   a  b  c  d  e  f  g  h");
        out
    }

    #[inline]
    /// Piece letter on `square`, [`EMPTY_CELL`] when vacant or off the board.
    pub fn cell(&self, square: Square) -> char {
        cell_of(square).map_or(EMPTY_CELL, |(row, col)| self.cells[row][col])
    }

    #[inline]
    pub fn cells(&self) -> &[[char; 8]; 8] {
        &self.cells
    }

    #[inline]
    pub fn active_color(&self) -> char {
        self.active_color
    }

    #[inline]
    pub fn castling_rights(&self) -> &str {
        &self.castling_rights
    }

    #[inline]
    pub fn en_passant_target(&self) -> &str {
        &self.en_passant_target
    }

    #[inline]
    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    #[inline]
    pub fn full_move_clock(&self) -> u32 {
        self.full_move_clock
    }

    #[inline]
    fn set_cell(&mut self, square: Square, piece: char) {
        if let Some((row, col)) = cell_of(square) {
            self.cells[row][col] = piece;
        }
    }

    fn update_castling_rights(&mut self, from: Square, to: Square, is_king: bool, white: bool) {
        let mut lost: Vec<char> = Vec::new();
        if is_king {
            lost.extend(if white { ['K', 'Q'] } else { ['k', 'q'] });
        }
        for (corner, letter) in CORNER_LETTERS {
            if from == corner || to == corner {
                lost.push(letter);
            }
        }
        if lost.is_empty() {
            return;
        }

        let kept: String = self
            .castling_rights
            .chars()
            .filter(|c| *c != '-' && !lost.contains(c))
            .collect();
        self.castling_rights = if kept.is_empty() {
            "-".to_string()
        } else {
            kept
        };
    }
}

impl PieceLookup for DisplayBoard {
    fn piece_at(&self, square: Square) -> Piece {
        piece_from_fen_char(self.cell(square)).unwrap_or(EMPTY)
    }
}

impl fmt::Display for DisplayBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
