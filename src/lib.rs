//! Crate root module declarations for the Plum position-state core.
//!
//! This file exposes the move codec, Zobrist hashing, reversible position
//! state, board capabilities, the character display board, the external
//! engine channel and FEN utilities so the binary, tests and host engines
//! can import stable module paths.

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod position_state;
    pub mod undo_state;
}

pub mod moves {
    pub mod chess_move;
}

pub mod hashing {
    pub mod zobrist;
}

pub mod board {
    pub mod capability;
    pub mod mailbox;
    pub mod position;
}

pub mod display {
    pub mod display_board;
}

pub mod uci {
    pub mod engine_channel;
    pub mod engine_process;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
}

pub mod chess_errors;
