use crate::board::capability::PieceLookup;
use crate::game_state::chess_types::*;
use crate::utils::algebraic::square_to_algebraic;

/// Render the placement field from any piece lookup.
pub fn generate_placement(board: &(impl PieceLookup + ?Sized)) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            match piece_to_fen_char(board.piece_at(make_square(file, rank))) {
                Some(ch) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(ch);
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

pub fn generate_side_field(color: Color) -> &'static str {
    match color {
        Color::White => "w",
        Color::Black => "b",
    }
}

pub fn generate_castling_field(rights: CastlingRights) -> String {
    let mut out = String::new();

    if (rights & CASTLE_WHITE_KINGSIDE) != 0 {
        out.push('K');
    }
    if (rights & CASTLE_WHITE_QUEENSIDE) != 0 {
        out.push('Q');
    }
    if (rights & CASTLE_BLACK_KINGSIDE) != 0 {
        out.push('k');
    }
    if (rights & CASTLE_BLACK_QUEENSIDE) != 0 {
        out.push('q');
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}

pub fn generate_en_passant_field(square: Option<Square>) -> String {
    let Some(square) = square else {
        return "-".to_owned();
    };

    square_to_algebraic(square).unwrap_or_else(|_| "-".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::mailbox::Mailbox;

    #[test]
    fn renders_placement_with_empty_runs() {
        let placement = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1";
        let board = Mailbox::from_placement(placement).expect("placement should parse");
        assert_eq!(generate_placement(&board), placement);
        assert_eq!(generate_placement(&Mailbox::empty()), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn canonicalizes_empty_fields() {
        assert_eq!(generate_castling_field(0), "-");
        assert_eq!(generate_castling_field(CASTLE_ALL), "KQkq");
        assert_eq!(
            generate_castling_field(CASTLE_WHITE_QUEENSIDE | CASTLE_BLACK_KINGSIDE),
            "Qk"
        );
        assert_eq!(generate_en_passant_field(None), "-");
        assert_eq!(generate_en_passant_field(Some(43)), "d6");
    }
}
