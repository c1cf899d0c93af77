//! FEN field parsing.
//!
//! Splits a Forsyth-Edwards Notation string into its six fields, filling in
//! defaults for missing trailing fields, and parses each field into the
//! typed values used by `PositionState` and the board capability.

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_types::*;
use crate::utils::algebraic::algebraic_to_square;

/// The six whitespace-separated FEN fields, defaults already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenFields<'a> {
    pub placement: &'a str,
    pub side_to_move: &'a str,
    pub castling: &'a str,
    pub en_passant: &'a str,
    pub halfmove: &'a str,
    pub fullmove: &'a str,
}

const DEFAULT_TRAILING_FIELDS: [&str; 5] = ["w", "KQkq", "-", "0", "1"];

/// Split a FEN string; fields 2..=6 default to `w KQkq - 0 1`.
pub fn split_fen_fields(fen: &str) -> ChessResult<FenFields<'_>> {
    let parts: Vec<&str> = fen.split_whitespace().collect();

    if parts.is_empty() {
        return Err(ChessErrors::MalformedFen("missing board layout".to_owned()));
    }
    if parts.len() > 6 {
        return Err(ChessErrors::MalformedFen(format!(
            "FEN has {} fields, expected at most 6",
            parts.len()
        )));
    }

    Ok(FenFields {
        placement: parts[0],
        side_to_move: field_or_default(&parts, 1),
        castling: field_or_default(&parts, 2),
        en_passant: field_or_default(&parts, 3),
        halfmove: field_or_default(&parts, 4),
        fullmove: field_or_default(&parts, 5),
    })
}

fn field_or_default<'a>(parts: &[&'a str], idx: usize) -> &'a str {
    parts
        .get(idx)
        .copied()
        .unwrap_or(DEFAULT_TRAILING_FIELDS[idx - 1])
}

/// Parse the placement field into a rank-major square array.
pub fn parse_placement(board_part: &str) -> ChessResult<[Piece; 64]> {
    let mut squares = [EMPTY; 64];

    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessErrors::MalformedFen(format!(
            "board layout must contain 8 ranks, found {}",
            ranks.len()
        )));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                let step = empty_count as usize;
                if !(1..=8).contains(&step) || file + step > 8 {
                    return Err(ChessErrors::MalformedFen(format!(
                        "invalid empty-square count '{ch}' in rank {}",
                        board_rank + 1
                    )));
                }
                file += step;
                continue;
            }

            let piece = piece_from_fen_char(ch).ok_or_else(|| {
                ChessErrors::MalformedFen(format!("unknown piece character '{ch}'"))
            })?;

            if file >= 8 {
                return Err(ChessErrors::MalformedFen(format!(
                    "rank {} has more than 8 files",
                    board_rank + 1
                )));
            }

            squares[board_rank * 8 + file] = piece;
            file += 1;
        }

        if file != 8 {
            return Err(ChessErrors::MalformedFen(format!(
                "rank {} does not sum to 8 files",
                board_rank + 1
            )));
        }
    }

    Ok(squares)
}

pub fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(ChessErrors::MalformedFen(format!(
            "invalid side-to-move field: {side_part}"
        ))),
    }
}

pub fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;

    for ch in castling_part.chars() {
        match ch {
            'K' => rights |= CASTLE_WHITE_KINGSIDE,
            'Q' => rights |= CASTLE_WHITE_QUEENSIDE,
            'k' => rights |= CASTLE_BLACK_KINGSIDE,
            'q' => rights |= CASTLE_BLACK_QUEENSIDE,
            _ => {
                return Err(ChessErrors::MalformedFen(format!(
                    "invalid castling rights character: {ch}"
                )))
            }
        }
    }

    Ok(rights)
}

pub fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    algebraic_to_square(en_passant_part).map(Some).map_err(|_| {
        ChessErrors::MalformedFen(format!("invalid en-passant square: {en_passant_part}"))
    })
}

pub fn parse_clock(clock_part: &str, name: &str) -> ChessResult<u32> {
    clock_part
        .parse::<u32>()
        .map_err(|_| ChessErrors::MalformedFen(format!("invalid {name}: {clock_part}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;

    #[test]
    fn splits_full_fen() {
        let fields = split_fen_fields(STARTING_POSITION_FEN).expect("starting FEN should split");
        assert_eq!(fields.placement, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert_eq!(fields.side_to_move, "w");
        assert_eq!(fields.castling, "KQkq");
        assert_eq!(fields.en_passant, "-");
        assert_eq!(fields.halfmove, "0");
        assert_eq!(fields.fullmove, "1");
    }

    #[test]
    fn missing_trailing_fields_take_defaults() {
        let fields = split_fen_fields("8/8/8/8/8/8/8/8 b").expect("short FEN should split");
        assert_eq!(fields.side_to_move, "b");
        assert_eq!(fields.castling, "KQkq");
        assert_eq!(fields.en_passant, "-");
        assert_eq!(fields.halfmove, "0");
        assert_eq!(fields.fullmove, "1");
    }

    #[test]
    fn rejects_empty_and_overlong_fen() {
        assert!(matches!(split_fen_fields("   "), Err(ChessErrors::MalformedFen(_))));
        assert!(matches!(
            split_fen_fields("8/8/8/8/8/8/8/8 w - - 0 1 extra"),
            Err(ChessErrors::MalformedFen(_))
        ));
    }

    #[test]
    fn parses_placement() {
        let squares = parse_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
            .expect("placement should parse");
        assert_eq!(squares[4], make_piece(Color::White, Figure::King));
        assert_eq!(squares[60], make_piece(Color::Black, Figure::King));
        assert_eq!(squares[28], EMPTY);
    }

    #[test]
    fn rejects_malformed_placement() {
        for bad in [
            "8/8/8/8/8/8/8",
            "8/8/8/8/8/8/8/8/8",
            "9/8/8/8/8/8/8/8",
            "7/8/8/8/8/8/8/8",
            "ppppppppp/8/8/8/8/8/8/8",
            "x7/8/8/8/8/8/8/8",
            "44/8/8/8/8/8/8/8/",
            "0p7/8/8/8/8/8/8/8",
        ] {
            assert!(
                matches!(parse_placement(bad), Err(ChessErrors::MalformedFen(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn parses_state_fields() {
        assert_eq!(parse_side_to_move("b").expect("side"), Color::Black);
        assert!(parse_side_to_move("x").is_err());
        assert_eq!(parse_castling_rights("Kq").expect("rights"), 0b1001);
        assert_eq!(parse_castling_rights("-").expect("rights"), 0);
        assert!(parse_castling_rights("KX").is_err());
        assert_eq!(parse_en_passant_square("e3").expect("ep"), Some(20));
        assert_eq!(parse_en_passant_square("-").expect("ep"), None);
        assert!(matches!(
            parse_en_passant_square("z9"),
            Err(ChessErrors::MalformedFen(_))
        ));
        assert_eq!(parse_clock("12", "halfmove clock").expect("clock"), 12);
        assert!(parse_clock("-1", "halfmove clock").is_err());
    }
}
