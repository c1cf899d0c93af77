//! Packed move record.
//!
//! A move fits in 24 bits of a `u32`:
//!
//! | bits    | field            | width |
//! |---------|------------------|-------|
//! | 18..=23 | origin square    | 6     |
//! | 12..=17 | destination      | 6     |
//! | 8..=11  | moving piece     | 4     |
//! | 4..=7   | captured piece   | 4     |
//! | 0..=3   | promotion piece  | 4     |
//!
//! Special-move classification (castle, en passant, double advance) is
//! derived from the fields rather than stored as flags.

use std::fmt;

use crate::board::capability::PieceLookup;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_types::*;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

const FROM_SHIFT: u32 = 18;
const TO_SHIFT: u32 = 12;
const PIECE_SHIFT: u32 = 8;
const CAPTURED_SHIFT: u32 = 4;
const PROMOTION_SHIFT: u32 = 0;

const SQUARE_MASK: u32 = 0x3F;
const PIECE_MASK: u32 = 0xF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    #[inline]
    pub const fn new(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
        promotion: Piece,
    ) -> Self {
        Move(
            ((from as u32 & SQUARE_MASK) << FROM_SHIFT)
                | ((to as u32 & SQUARE_MASK) << TO_SHIFT)
                | ((piece as u32 & PIECE_MASK) << PIECE_SHIFT)
                | ((captured as u32 & PIECE_MASK) << CAPTURED_SHIFT)
                | ((promotion as u32 & PIECE_MASK) << PROMOTION_SHIFT),
        )
    }

    /// Non-capturing, non-promoting move.
    #[inline]
    pub const fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Self::new(from, to, piece, EMPTY, EMPTY)
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Move(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from(self) -> Square {
        ((self.0 >> FROM_SHIFT) & SQUARE_MASK) as Square
    }

    #[inline]
    pub const fn to(self) -> Square {
        ((self.0 >> TO_SHIFT) & SQUARE_MASK) as Square
    }

    #[inline]
    pub const fn piece(self) -> Piece {
        ((self.0 >> PIECE_SHIFT) & PIECE_MASK) as Piece
    }

    #[inline]
    pub const fn captured(self) -> Piece {
        ((self.0 >> CAPTURED_SHIFT) & PIECE_MASK) as Piece
    }

    #[inline]
    pub const fn promotion(self) -> Piece {
        ((self.0 >> PROMOTION_SHIFT) & PIECE_MASK) as Piece
    }

    #[inline]
    pub const fn color(self) -> Color {
        piece_color(self.piece())
    }

    #[inline]
    pub const fn figure(self) -> Figure {
        piece_figure(self.piece())
    }

    /// Regular capture. En passant is reported separately.
    #[inline]
    pub const fn is_capture(self) -> bool {
        !is_empty_piece(self.captured())
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        !is_empty_piece(self.promotion())
    }

    /// Pawn changing file without a recorded capture.
    #[inline]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.figure(), Figure::Pawn)
            && square_file(self.from()) != square_file(self.to())
            && !self.is_capture()
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self.figure(), Figure::King)
            && square_file(self.from()).abs_diff(square_file(self.to())) == 2
    }

    #[inline]
    pub const fn is_double_advance(self) -> bool {
        matches!(self.figure(), Figure::Pawn)
            && square_rank(self.from()).abs_diff(square_rank(self.to())) == 2
    }

    /// Pawn move or any capture; resets the half-move clock.
    #[inline]
    pub const fn is_irreversible(self) -> bool {
        matches!(self.figure(), Figure::Pawn) || self.is_capture()
    }

    /// Square of the pawn removed by an en-passant capture: the origin rank
    /// at the destination file.
    pub fn en_passant_square(self) -> ChessResult<Square> {
        if !self.is_en_passant() {
            return Err(ChessErrors::InvalidOperation(format!(
                "{self} is not an en passant move"
            )));
        }
        Ok(make_square(square_file(self.to()), square_rank(self.from())))
    }

    /// Square skipped by a double pawn advance, i.e. the new en-passant target.
    pub fn en_passant_target(self) -> ChessResult<Square> {
        if !self.is_double_advance() {
            return Err(ChessErrors::InvalidOperation(format!(
                "{self} is not a double pawn advance"
            )));
        }
        Ok((self.from() + self.to()) / 2)
    }

    /// UCI text, e.g. `e2e4` or `e7e8q`.
    ///
    /// Promotion figures outside {knight, bishop, rook, queen} are written
    /// as `q`.
    pub fn to_long_algebraic(self) -> String {
        let mut out = String::with_capacity(5);
        push_square(&mut out, self.from());
        push_square(&mut out, self.to());

        if self.is_promotion() {
            out.push(match piece_figure(self.promotion()) {
                Figure::Knight => 'n',
                Figure::Bishop => 'b',
                Figure::Rook => 'r',
                _ => 'q',
            });
        }

        out
    }

    /// Build a move from UCI text, reading the moving and captured pieces
    /// off `board`.
    ///
    /// A diagonal pawn move onto an empty square is left with an empty
    /// capture field so it classifies as en passant.
    pub fn from_long_algebraic(text: &str, board: &impl PieceLookup) -> ChessResult<Self> {
        if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
            return Err(ChessErrors::InvalidMoveFormat(format!(
                "move must have 4 or 5 characters: {text}"
            )));
        }

        let from = algebraic_to_square(&text[0..2])?;
        let to = algebraic_to_square(&text[2..4])?;

        let piece = board.piece_at(from);
        if is_empty_piece(piece) {
            return Err(ChessErrors::InvalidOperation(format!(
                "no piece on origin square of {text}"
            )));
        }

        let captured = board.piece_at(to);

        let promotion = match text.as_bytes().get(4) {
            None => EMPTY,
            Some(&letter) => {
                let figure = promotion_figure_from_char(letter as char).ok_or_else(|| {
                    ChessErrors::InvalidMoveFormat(format!(
                        "promotion must be one of q, r, b, n: {text}"
                    ))
                })?;
                make_piece(piece_color(piece), figure)
            }
        };

        Ok(Move::new(from, to, piece, captured, promotion))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_long_algebraic())
    }
}

/// Promotion letter of UCI move text.
pub fn promotion_figure_from_char(ch: char) -> Option<Figure> {
    match ch {
        'q' => Some(Figure::Queen),
        'r' => Some(Figure::Rook),
        'b' => Some(Figure::Bishop),
        'n' => Some(Figure::Knight),
        _ => None,
    }
}

fn push_square(out: &mut String, square: Square) {
    // Fields are masked to six bits, so the conversion cannot fail.
    if let Ok(text) = square_to_algebraic(square) {
        out.push_str(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::mailbox::Mailbox;

    const WP: Piece = make_piece(Color::White, Figure::Pawn);
    const BP: Piece = make_piece(Color::Black, Figure::Pawn);
    const WK: Piece = make_piece(Color::White, Figure::King);
    const WQ: Piece = make_piece(Color::White, Figure::Queen);
    const BN: Piece = make_piece(Color::Black, Figure::Knight);

    #[test]
    fn fields_round_trip_within_width() {
        for from in [0u8, 1, 27, 63] {
            for to in [0u8, 9, 44, 63] {
                for piece in [0u8, 1, 6, 9, 14, 15] {
                    let mv = Move::new(from, to, piece, 15 - piece, piece ^ 0b0101);
                    assert_eq!(mv.from(), from);
                    assert_eq!(mv.to(), to);
                    assert_eq!(mv.piece(), piece);
                    assert_eq!(mv.captured(), 15 - piece);
                    assert_eq!(mv.promotion(), piece ^ 0b0101);
                    assert_eq!(Move::from_raw(mv.raw()), mv);
                }
            }
        }
    }

    #[test]
    fn record_uses_documented_bit_layout() {
        let mv = Move::new(12, 28, WP, EMPTY, EMPTY);
        assert_eq!(mv.raw(), (12 << 18) | (28 << 12) | (1 << 8));
    }

    #[test]
    fn classifies_special_moves() {
        let double = Move::quiet(12, 28, WP);
        assert!(double.is_double_advance());
        assert!(!double.is_en_passant());
        assert_eq!(double.en_passant_target().expect("double advance"), 20);

        // e5xd6 en passant: d5 pawn disappears.
        let ep = Move::quiet(36, 43, WP);
        assert!(ep.is_en_passant());
        assert!(!ep.is_capture());
        assert_eq!(ep.en_passant_square().expect("en passant"), 35);

        let capture = Move::new(36, 43, WP, BN, EMPTY);
        assert!(capture.is_capture());
        assert!(!capture.is_en_passant());

        let castle = Move::quiet(4, 6, WK);
        assert!(castle.is_castle());
        assert!(!Move::quiet(4, 5, WK).is_castle());

        let queen_diagonal = Move::quiet(3, 12, WQ);
        assert!(!queen_diagonal.is_en_passant());
    }

    #[test]
    fn en_passant_queries_reject_other_moves() {
        let quiet = Move::quiet(12, 20, WP);
        assert!(matches!(
            quiet.en_passant_square(),
            Err(ChessErrors::InvalidOperation(_))
        ));
        assert!(matches!(
            quiet.en_passant_target(),
            Err(ChessErrors::InvalidOperation(_))
        ));
    }

    #[test]
    fn renders_uci_text() {
        assert_eq!(Move::quiet(12, 28, WP).to_long_algebraic(), "e2e4");
        let promo = Move::new(51, 59, WP, EMPTY, make_piece(Color::White, Figure::Rook));
        assert_eq!(promo.to_string(), "d7d8r");
        let knight = Move::new(11, 2, BP, EMPTY, make_piece(Color::Black, Figure::Knight));
        assert_eq!(knight.to_string(), "d2c1n");
    }

    #[test]
    fn unknown_promotion_figure_renders_as_queen() {
        let king_promo = Move::new(51, 59, WP, EMPTY, WK);
        assert_eq!(king_promo.to_long_algebraic(), "d7d8q");
    }

    #[test]
    fn parses_text_against_a_board() {
        let board = Mailbox::from_placement("4k3/8/8/3pP3/8/8/8/4K3").expect("placement");
        let ep = Move::from_long_algebraic("e5d6", &board).expect("move should parse");
        assert!(ep.is_en_passant());
        assert_eq!(ep.piece(), WP);

        let king = Move::from_long_algebraic("e1e2", &board).expect("move should parse");
        assert_eq!(king.figure(), Figure::King);
        assert!(!king.is_capture());
    }

    #[test]
    fn rejects_bad_move_text() {
        let board = Mailbox::from_placement("4k3/P7/8/8/8/8/8/4K3").expect("placement");
        assert!(matches!(
            Move::from_long_algebraic("a7a8x", &board),
            Err(ChessErrors::InvalidMoveFormat(_))
        ));
        assert!(matches!(
            Move::from_long_algebraic("a7a", &board),
            Err(ChessErrors::InvalidMoveFormat(_))
        ));
        assert!(matches!(
            Move::from_long_algebraic("c3c4", &board),
            Err(ChessErrors::InvalidOperation(_))
        ));
        let promo = Move::from_long_algebraic("a7a8q", &board).expect("promotion should parse");
        assert_eq!(promo.promotion(), WQ);
    }
}
