//! Line-oriented request/response channel to an external UCI engine.
//!
//! Commands go out through any `Write`. Replies arrive as whole lines on an
//! `mpsc` receiver, normally fed by [`spawn_line_reader`] over a child's
//! stdout. Every wait for a reply token is bounded by the optional timeout in
//! [`ChannelConfig`] and can be interrupted through a [`CancelToken`].

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::chess_errors::{ChessErrors, ChessResult};

pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Upper bound on a single wait for a reply token; `None` waits forever.
    pub timeout: Option<Duration>,
    /// How often a blocked wait rechecks the cancel token.
    pub poll_interval: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_REPLY_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Shared flag that aborts any wait in progress on the channel holding it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Search limits for a `go` command. Both `None` sends a bare `go`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    pub movetime_ms: Option<u64>,
    pub depth: Option<u32>,
}

impl GoParams {
    pub fn to_command(&self) -> String {
        let mut command = String::from("go");
        if let Some(ms) = self.movetime_ms {
            command.push_str(&format!(" movetime {ms}"));
        }
        if let Some(depth) = self.depth {
            command.push_str(&format!(" depth {depth}"));
        }
        command
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    pub mv: String,
    pub ponder: Option<String>,
}

/// Parse a `bestmove <move> [ponder <move>]` line.
pub fn parse_best_move(line: &str) -> ChessResult<BestMove> {
    let mut tokens = line.split_whitespace().skip_while(|t| *t != "bestmove");
    tokens.next();

    let mv = tokens
        .next()
        .ok_or_else(|| {
            ChessErrors::ChannelFailure(format!("bestmove line without a move: {line}"))
        })?
        .to_string();

    let ponder = match tokens.next() {
        Some("ponder") => tokens.next().map(str::to_string),
        _ => None,
    };

    Ok(BestMove { mv, ponder })
}

/// Forward every line of `reader` to the returned receiver from a background
/// thread. The receiver disconnects at EOF or on the first read error.
pub fn spawn_line_reader<R>(reader: R) -> Receiver<String>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let reader = BufReader::new(reader);
        for line in reader.lines() {
            match line {
                Ok(l) => {
                    if tx.send(l).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("engine output read failed: {e}");
                    break;
                }
            }
        }
    });
    rx
}

fn write_line(writer: &mut impl Write, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

pub struct UciChannel<W: Write> {
    writer: W,
    lines: Receiver<String>,
    config: ChannelConfig,
    cancel: CancelToken,
}

impl<W: Write> UciChannel<W> {
    pub fn new(writer: W, lines: Receiver<String>, config: ChannelConfig) -> Self {
        Self {
            writer,
            lines,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Clone of the token that cancels waits on this channel.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ChannelConfig) {
        self.config = config;
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Write one command line and flush it.
    pub fn send(&mut self, command: &str) -> ChessResult<()> {
        log::debug!("> {command}");
        write_line(&mut self.writer, command)
            .map_err(|e| ChessErrors::ChannelFailure(format!("failed to send {command:?}: {e}")))
    }

    /// Wait for the first line containing `token` and return it; lines
    /// without the token are skipped.
    pub fn expect(&mut self, token: &str) -> ChessResult<String> {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);

        loop {
            if self.cancel.is_cancelled() {
                return Err(ChessErrors::ChannelCancelled(token.to_string()));
            }

            let wait = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ChessErrors::ChannelTimeout(token.to_string()));
                    }
                    (deadline - now).min(self.config.poll_interval)
                }
                None => self.config.poll_interval,
            };

            match self.lines.recv_timeout(wait) {
                Ok(line) if line.contains(token) => {
                    log::debug!("< {line}");
                    return Ok(line);
                }
                Ok(line) => log::trace!("< {line}"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ChessErrors::ChannelFailure(format!(
                        "engine output closed while waiting for {token}"
                    )));
                }
            }
        }
    }

    /// `uci` / `uciok`.
    pub fn handshake(&mut self) -> ChessResult<()> {
        self.send("uci")?;
        self.expect("uciok").map(|_| ())
    }

    /// `isready` / `readyok`.
    pub fn ready(&mut self) -> ChessResult<()> {
        self.send("isready")?;
        self.expect("readyok").map(|_| ())
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        self.send(&format!("setoption name {name} value {value}"))
    }

    /// Limit the engine to `elo`, or lift the limit with `None`.
    pub fn set_elo(&mut self, elo: Option<u32>) -> ChessResult<()> {
        match elo {
            Some(elo) => {
                self.set_option("UCI_LimitStrength", "true")?;
                self.set_option("UCI_Elo", &elo.to_string())
            }
            None => self.set_option("UCI_LimitStrength", "false"),
        }
    }

    pub fn new_game(&mut self) -> ChessResult<()> {
        self.send("ucinewgame")?;
        self.ready()
    }

    pub fn position_startpos<S: AsRef<str>>(&mut self, moves: &[S]) -> ChessResult<()> {
        if moves.is_empty() {
            return self.send("position startpos");
        }
        let list: Vec<&str> = moves.iter().map(AsRef::as_ref).collect();
        self.send(&format!("position startpos moves {}", list.join(" ")))
    }

    pub fn position_fen(&mut self, fen: &str) -> ChessResult<()> {
        self.send(&format!("position fen {fen}"))
    }

    /// Send `go` and wait for the engine's `bestmove`.
    pub fn best_move(&mut self, params: GoParams) -> ChessResult<BestMove> {
        self.send(&params.to_command())?;
        let line = self.expect("bestmove")?;
        parse_best_move(&line)
    }

    pub fn quit(&mut self) -> ChessResult<()> {
        self.send("quit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc::Sender;

    fn channel_with(
        lines: &[&str],
        timeout: Option<Duration>,
    ) -> (UciChannel<Vec<u8>>, Sender<String>) {
        let (tx, rx) = mpsc::channel();
        for line in lines {
            tx.send((*line).to_string()).expect("receiver alive");
        }
        let config = ChannelConfig {
            timeout,
            poll_interval: Duration::from_millis(5),
        };
        (UciChannel::new(Vec::new(), rx, config), tx)
    }

    fn sent(channel: &UciChannel<Vec<u8>>) -> String {
        String::from_utf8(channel.writer().clone()).expect("utf8")
    }

    #[test]
    fn handshake_skips_identification_lines() {
        let (mut channel, _tx) = channel_with(
            &["id name Test", "option name Hash type spin", "uciok", "readyok"],
            Some(Duration::from_secs(1)),
        );
        channel.handshake().expect("handshake");
        channel.ready().expect("ready");
        assert_eq!(sent(&channel), "uci\nisready\n");
    }

    #[test]
    fn commands_use_protocol_grammar() {
        let (mut channel, _tx) = channel_with(&["readyok"], Some(Duration::from_secs(1)));
        channel.set_elo(Some(1500)).expect("elo");
        channel.set_elo(None).expect("no elo");
        channel.new_game().expect("new game");
        channel.position_startpos(&["e2e4", "e7e5"]).expect("startpos");
        channel.position_startpos::<&str>(&[]).expect("empty startpos");
        channel
            .position_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
            .expect("fen");
        channel.quit().expect("quit");

        assert_eq!(
            sent(&channel),
            "setoption name UCI_LimitStrength value true\n\
             setoption name UCI_Elo value 1500\n\
             setoption name UCI_LimitStrength value false\n\
             ucinewgame\n\
             isready\n\
             position startpos moves e2e4 e7e5\n\
             position startpos\n\
             position fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1\n\
             quit\n"
        );
    }

    #[test]
    fn best_move_reads_ponder() {
        let (mut channel, _tx) = channel_with(
            &["info depth 1 score cp 20", "bestmove e2e4 ponder e7e5"],
            Some(Duration::from_secs(1)),
        );
        let best = channel
            .best_move(GoParams {
                movetime_ms: Some(100),
                depth: Some(8),
            })
            .expect("bestmove");
        assert_eq!(
            best,
            BestMove {
                mv: "e2e4".to_string(),
                ponder: Some("e7e5".to_string()),
            }
        );
        assert_eq!(sent(&channel), "go movetime 100 depth 8\n");
    }

    #[test]
    fn parse_best_move_without_ponder() {
        let best = parse_best_move("bestmove a7a8q").expect("parse");
        assert_eq!(best.mv, "a7a8q");
        assert_eq!(best.ponder, None);
        assert!(matches!(
            parse_best_move("bestmove"),
            Err(ChessErrors::ChannelFailure(_))
        ));
    }

    #[test]
    fn go_params_render() {
        assert_eq!(GoParams::default().to_command(), "go");
        assert_eq!(
            GoParams {
                movetime_ms: None,
                depth: Some(3)
            }
            .to_command(),
            "go depth 3"
        );
    }

    #[test]
    fn silent_engine_times_out() {
        let (mut channel, _tx) = channel_with(&["id name Quiet"], Some(Duration::from_millis(40)));
        assert!(matches!(
            channel.expect("uciok"),
            Err(ChessErrors::ChannelTimeout(_))
        ));
    }

    #[test]
    fn closed_output_is_a_failure() {
        let (mut channel, tx) = channel_with(&["id name Gone"], None);
        drop(tx);
        assert!(matches!(
            channel.expect("uciok"),
            Err(ChessErrors::ChannelFailure(_))
        ));
    }

    #[test]
    fn cancel_interrupts_an_unbounded_wait() {
        let (mut channel, _tx) = channel_with(&[], None);
        let token = channel.cancel_token();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        });

        assert!(matches!(
            channel.expect("readyok"),
            Err(ChessErrors::ChannelCancelled(_))
        ));
        canceller.join().expect("canceller thread");

        channel.cancel_token().reset();
        assert!(!channel.cancel_token().is_cancelled());
    }

    #[test]
    fn line_reader_forwards_until_eof() {
        let rx = spawn_line_reader(Cursor::new(b"id name X\nuciok\n".to_vec()));
        let lines: Vec<String> = rx.iter().collect();
        assert_eq!(lines, vec!["id name X".to_string(), "uciok".to_string()]);
    }
}
