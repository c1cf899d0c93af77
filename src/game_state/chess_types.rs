//! Primitive chess value types shared by every subsystem.
//!
//! Pieces are packed as `color | figure` in a `u8`, squares are rank-major
//! indices and castling rights are a 4-bit mask, matching the layout used by
//! the move record and the state word.

pub use crate::game_state::position_state::PositionState;
pub use crate::game_state::undo_state::UndoInfo;

/// Board square index (`0..=63`, `0 == a1`, `63 == h8`).
pub type Square = u8;

/// Sentinel square meaning "none" inside packed integers.
pub const NO_SQUARE: Square = 64;

/// Packed piece: color bit (`0` or `8`) OR figure code (`0..=6`).
pub type Piece = u8;

/// Compact castling rights bitmask.
pub type CastlingRights = u8;

pub const CASTLE_WHITE_KINGSIDE: CastlingRights = 1 << 0;
pub const CASTLE_WHITE_QUEENSIDE: CastlingRights = 1 << 1;
pub const CASTLE_BLACK_KINGSIDE: CastlingRights = 1 << 2;
pub const CASTLE_BLACK_QUEENSIDE: CastlingRights = 1 << 3;
pub const CASTLE_ALL: CastlingRights = 0b1111;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    const BLACK_BIT: u8 = 8;

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Bit contributed to a packed [`Piece`].
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => Self::BLACK_BIT,
        }
    }
}

/// Figure code, color is carried separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Figure {
    Empty,
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Figure {
    pub const ALL: [Figure; 6] = [
        Figure::Pawn,
        Figure::Knight,
        Figure::Bishop,
        Figure::Rook,
        Figure::Queen,
        Figure::King,
    ];

    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Figure::Empty => 0,
            Figure::Pawn => 1,
            Figure::Knight => 2,
            Figure::Bishop => 3,
            Figure::Rook => 4,
            Figure::Queen => 5,
            Figure::King => 6,
        }
    }

    /// Decode the low three bits; codes 0 and 7 both read as empty.
    #[inline]
    pub const fn from_code(code: u8) -> Figure {
        match code & 0x7 {
            1 => Figure::Pawn,
            2 => Figure::Knight,
            3 => Figure::Bishop,
            4 => Figure::Rook,
            5 => Figure::Queen,
            6 => Figure::King,
            _ => Figure::Empty,
        }
    }

    /// Index into per-figure tables (`Pawn == 0`). `None` for empty.
    #[inline]
    pub const fn table_index(self) -> Option<usize> {
        match self {
            Figure::Empty => None,
            other => Some(other.code() as usize - 1),
        }
    }
}

/// The "no piece" value.
pub const EMPTY: Piece = 0;

#[inline]
pub const fn make_piece(color: Color, figure: Figure) -> Piece {
    color.bits() | figure.code()
}

#[inline]
pub const fn piece_color(piece: Piece) -> Color {
    if piece & Color::BLACK_BIT != 0 {
        Color::Black
    } else {
        Color::White
    }
}

#[inline]
pub const fn piece_figure(piece: Piece) -> Figure {
    Figure::from_code(piece)
}

#[inline]
pub const fn is_empty_piece(piece: Piece) -> bool {
    matches!(piece_figure(piece), Figure::Empty)
}

#[inline]
pub const fn square_rank(square: Square) -> u8 {
    square / 8
}

#[inline]
pub const fn square_file(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn make_square(file: u8, rank: u8) -> Square {
    rank * 8 + file
}

/// FEN letter for a piece, `None` for empty.
pub fn piece_to_fen_char(piece: Piece) -> Option<char> {
    let base = match piece_figure(piece) {
        Figure::Empty => return None,
        Figure::Pawn => 'p',
        Figure::Knight => 'n',
        Figure::Bishop => 'b',
        Figure::Rook => 'r',
        Figure::Queen => 'q',
        Figure::King => 'k',
    };

    Some(match piece_color(piece) {
        Color::White => base.to_ascii_uppercase(),
        Color::Black => base,
    })
}

/// Parse a FEN piece letter (`PNBRQK` white, `pnbrqk` black).
pub fn piece_from_fen_char(ch: char) -> Option<Piece> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else if ch.is_ascii_lowercase() {
        Color::Black
    } else {
        return None;
    };

    let figure = match ch.to_ascii_lowercase() {
        'p' => Figure::Pawn,
        'n' => Figure::Knight,
        'b' => Figure::Bishop,
        'r' => Figure::Rook,
        'q' => Figure::Queen,
        'k' => Figure::King,
        _ => return None,
    };

    Some(make_piece(color, figure))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_packing_keeps_color_and_figure() {
        let black_queen = make_piece(Color::Black, Figure::Queen);
        assert_eq!(black_queen, 13);
        assert_eq!(piece_color(black_queen), Color::Black);
        assert_eq!(piece_figure(black_queen), Figure::Queen);

        let white_pawn = make_piece(Color::White, Figure::Pawn);
        assert_eq!(white_pawn, 1);
        assert_eq!(piece_color(white_pawn), Color::White);
    }

    #[test]
    fn empty_figure_with_any_color_is_empty() {
        assert!(is_empty_piece(EMPTY));
        assert!(is_empty_piece(make_piece(Color::Black, Figure::Empty)));
        assert!(!is_empty_piece(make_piece(Color::White, Figure::King)));
    }

    #[test]
    fn fen_letters_round_trip() {
        for ch in "pnbrqkPNBRQK".chars() {
            let piece = piece_from_fen_char(ch).expect("letter should parse");
            assert_eq!(piece_to_fen_char(piece), Some(ch));
        }
        assert_eq!(piece_from_fen_char('x'), None);
        assert_eq!(piece_to_fen_char(EMPTY), None);
    }
}
