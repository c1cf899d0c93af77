//! Child-process transport for [`UciChannel`].
//!
//! The engine's stdin becomes the channel writer and its stdout is drained by
//! a reader thread. Dropping an [`EngineProcess`] sends `quit`, waits briefly
//! for the child to exit and kills it otherwise, so no zombie is left behind.

use std::ffi::OsStr;
use std::io::BufWriter;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::uci::engine_channel::{spawn_line_reader, ChannelConfig, UciChannel};

pub const ENGINE_QUIT_TIMEOUT: Duration = Duration::from_millis(300);
pub const ENGINE_QUIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct EngineProcess {
    child: Child,
    channel: UciChannel<BufWriter<ChildStdin>>,
    exited: Option<ExitStatus>,
}

impl EngineProcess {
    /// Start `program` with piped stdio. No protocol traffic is sent yet.
    pub fn spawn<S, A>(program: S, args: &[A], config: ChannelConfig) -> ChessResult<Self>
    where
        S: AsRef<OsStr>,
        A: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChessErrors::ChannelFailure("engine stdin not captured".to_owned()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChessErrors::ChannelFailure("engine stdout not captured".to_owned()))?;

        log::debug!("engine started: {} (pid {})", program.to_string_lossy(), child.id());

        Ok(Self {
            child,
            channel: UciChannel::new(BufWriter::new(stdin), spawn_line_reader(stdout), config),
            exited: None,
        })
    }

    /// Spawn, then run the `uci` handshake and an `isready` sync.
    pub fn launch<S, A>(program: S, args: &[A], config: ChannelConfig) -> ChessResult<Self>
    where
        S: AsRef<OsStr>,
        A: AsRef<OsStr>,
    {
        let mut engine = Self::spawn(program, args, config)?;
        engine.channel.handshake()?;
        engine.channel.ready()?;
        Ok(engine)
    }

    pub fn channel(&mut self) -> &mut UciChannel<BufWriter<ChildStdin>> {
        &mut self.channel
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Send `quit` and reap the child, killing it if it does not exit within
    /// [`ENGINE_QUIT_TIMEOUT`].
    pub fn quit(&mut self) -> ChessResult<ExitStatus> {
        if let Some(status) = self.exited {
            return Ok(status);
        }

        if let Err(e) = self.channel.quit() {
            log::debug!("quit not delivered: {e}");
        }

        let deadline = Instant::now() + ENGINE_QUIT_TIMEOUT;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait()? {
                self.exited = Some(status);
                return Ok(status);
            }
            thread::sleep(ENGINE_QUIT_POLL_INTERVAL);
        }

        log::warn!("engine {} ignored quit, killing it", self.child.id());
        self.child.kill()?;
        let status = self.child.wait()?;
        self.exited = Some(status);
        Ok(status)
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        if self.exited.is_none() {
            let _ = self.quit();
        }
    }
}
