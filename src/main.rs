use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use plum_position::board::position::{MailboxPosition, Position};
use plum_position::display::display_board::DisplayBoard;
use plum_position::game_state::chess_rules::STARTING_POSITION_FEN;
use plum_position::hashing::zobrist::ZobristKeys;
use plum_position::uci::engine_channel::{ChannelConfig, GoParams, DEFAULT_POLL_INTERVAL};
use plum_position::uci::engine_process::EngineProcess;

#[derive(Parser, Debug)]
#[command(name = "position-replay")]
#[command(about = "Replay UCI moves from a FEN and optionally ask an engine for the next move")]
struct Args {
    /// Starting position (defaults to the standard start)
    #[arg(long)]
    fen: Option<String>,

    /// Space-separated UCI moves to play, e.g. "e2e4 e7e5 g1f3"
    #[arg(long, default_value = "")]
    moves: String,

    /// Path to a UCI engine to query after the replay
    #[arg(long)]
    engine: Option<String>,

    /// Engine think time per move in milliseconds
    #[arg(long)]
    movetime: Option<u64>,

    /// Engine search depth
    #[arg(long)]
    depth: Option<u32>,

    /// Limit engine strength to this Elo
    #[arg(long)]
    elo: Option<u32>,

    /// Reply timeout in milliseconds (0 waits forever)
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Debug logging when RUST_LOG is unset
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format_timestamp_millis()
    .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let fen = args.fen.as_deref().unwrap_or(STARTING_POSITION_FEN);
    let keys = Arc::new(ZobristKeys::new());

    let mut position = MailboxPosition::from_fen(fen, keys)
        .with_context(|| format!("cannot load position {fen:?}"))?;
    let mut display = DisplayBoard::from_fen(fen)?;

    let mut last_to = None;
    for text in args.moves.split_whitespace() {
        let mv = position
            .play_long_algebraic(text, false)
            .with_context(|| format!("cannot play {text}"))?;
        display.play(text)?;
        last_to = Some(mv.to());
        log::debug!("played {mv}, hash {:#018x}", position.hash());
    }

    if position.fen() != display.to_fen() {
        bail!(
            "position and display board disagree:\n  {}\n  {}",
            position.fen(),
            display.to_fen()
        );
    }

    if let Some(square) = last_to {
        display.mark_square(square);
    }

    println!("{display}");
    println!("fen:  {}", position.fen());
    println!("hash: {:#018x}", position.hash());
    if position.state().is_fifty_move_draw() {
        println!("fifty-move rule reached");
    }
    if position.state().repetition_count() >= 2 {
        println!("threefold repetition");
    }

    if let Some(path) = args.engine.as_deref() {
        let config = ChannelConfig {
            timeout: (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        };
        let mut engine = EngineProcess::launch(path, &[] as &[&str], config)
            .with_context(|| format!("cannot start engine {path}"))?;

        let channel = engine.channel();
        channel.set_elo(args.elo)?;
        channel.new_game()?;
        channel.position_fen(&position.fen())?;
        let best = channel.best_move(GoParams {
            movetime_ms: args.movetime,
            depth: args.depth,
        })?;

        match best.ponder {
            Some(ponder) => println!("bestmove: {} (ponder {ponder})", best.mv),
            None => println!("bestmove: {}", best.mv),
        }
        engine.quit()?;
    }

    Ok(())
}
