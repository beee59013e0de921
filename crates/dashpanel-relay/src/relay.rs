//! Named pipe, reader thread, and line splitting.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ring::{DEFAULT_CAPACITY, LogRing, SharedRing};

const READ_CHUNK: usize = 4096;
/// Longest partial line held back waiting for its newline.
const MAX_PENDING: usize = 4096;

/// Relay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Lines kept in the ring.
    pub capacity: usize,
    /// Upper bound on how long the reader waits before re-checking the
    /// running flag.
    pub poll_timeout_ms: u16,
    /// Directory that holds the pipe.
    pub channel_dir: PathBuf,
    /// Copy relayed output to stdout as it arrives.
    pub echo: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            poll_timeout_ms: 200,
            channel_dir: std::env::temp_dir(),
            echo: true,
        }
    }
}

/// Accumulates bytes and yields complete lines.
///
/// Tabs become four spaces and carriage returns are dropped. Output that
/// never ends a line is committed in pieces of at most `MAX_PENDING` bytes.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(normalize(&raw[..pos]));
        }
        while self.pending.len() > MAX_PENDING {
            let mut cut = MAX_PENDING;
            // Keep a multi-byte character whole.
            while cut > 0 && (self.pending[cut] & 0xC0) == 0x80 {
                cut -= 1;
            }
            if cut == 0 {
                cut = MAX_PENDING;
            }
            let raw: Vec<u8> = self.pending.drain(..cut).collect();
            lines.push(normalize(&raw));
        }
        lines
    }

    /// The held partial line, if any.
    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.pending);
        Some(normalize(&raw))
    }
}

fn normalize(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .replace('\r', "")
        .replace('\t', "    ")
}

fn commit(ring: &SharedRing, lines: Vec<String>) -> usize {
    let count = lines.len();
    if count > 0 {
        let mut ring = LogRing::lock(ring);
        for line in lines {
            ring.push(line);
        }
    }
    count
}

/// Wait up to `timeout` for the channel to become readable.
fn wait_readable(channel: &File, timeout: Duration) -> io::Result<bool> {
    let ms = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
    let mut fds = [PollFd::new(channel.as_fd(), PollFlags::POLLIN)];
    match poll(&mut fds, PollTimeout::from(ms)) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(true),
        Err(Errno::EINTR) => Ok(false),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

enum Chunk {
    Data(usize),
    /// No writer is attached.
    Closed,
    Empty,
}

fn read_chunk(mut channel: &File, buf: &mut [u8]) -> io::Result<Chunk> {
    match channel.read(buf) {
        Ok(0) => Ok(Chunk::Closed),
        Ok(n) => Ok(Chunk::Data(n)),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(Chunk::Empty)
        }
        Err(err) => Err(err),
    }
}

fn echo_chunk(out: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}

struct Pump {
    channel: Arc<File>,
    ring: SharedRing,
    /// The session's "child running" signal.
    running: Arc<AtomicBool>,
    /// Set by the owning relay to end this thread regardless of `running`.
    halt: Arc<AtomicBool>,
    poll_timeout: Duration,
    echo: bool,
}

impl Pump {
    fn should_run(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.halt.load(Ordering::SeqCst)
    }

    /// Relay until the running flag clears or the relay halts this thread.
    /// Returns the number of lines committed.
    fn run(self) -> usize {
        let mut splitter = LineSplitter::default();
        let mut buf = [0u8; READ_CHUNK];
        let mut relayed = 0;

        while self.should_run() {
            match wait_readable(&self.channel, self.poll_timeout) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!(error = %err, "relay poll failed");
                    break;
                }
            }
            match read_chunk(&self.channel, &mut buf) {
                Ok(Chunk::Data(n)) => {
                    if self.echo {
                        if let Err(err) = echo_chunk(&mut io::stdout().lock(), &buf[..n]) {
                            debug!(error = %err, "relay echo failed");
                        }
                    }
                    relayed += commit(&self.ring, splitter.feed(&buf[..n]));
                }
                // A closed pipe polls readable forever; wait instead of spinning.
                Ok(Chunk::Closed) => thread::sleep(self.poll_timeout),
                Ok(Chunk::Empty) => {}
                Err(err) => {
                    warn!(error = %err, "relay read failed");
                    break;
                }
            }
        }

        relayed + commit(&self.ring, splitter.finish().into_iter().collect())
    }
}

/// Per-session output channel and its reader thread.
#[derive(Debug)]
pub struct OutputRelay {
    path: PathBuf,
    channel: Option<Arc<File>>,
    ring: SharedRing,
    reader: Option<JoinHandle<usize>>,
    halt: Option<Arc<AtomicBool>>,
    poll_timeout: Duration,
    echo: bool,
}

impl OutputRelay {
    /// Create a uniquely named pipe in the configured directory.
    ///
    /// The relay starts inert: nothing is opened until [`activate`](Self::activate).
    pub fn create(config: &RelayConfig) -> io::Result<Self> {
        let path = loop {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.subsec_nanos());
            let candidate = config
                .channel_dir
                .join(format!("dashpanel_{}_{nanos}.log", std::process::id()));
            match mkfifo(&candidate, Mode::S_IRUSR | Mode::S_IWUSR) {
                Ok(()) => break candidate,
                Err(Errno::EEXIST) => continue,
                Err(errno) => return Err(io::Error::from(errno)),
            }
        };
        debug!(path = %path.display(), "relay channel created");

        Ok(Self {
            path,
            channel: None,
            ring: LogRing::shared(config.capacity),
            reader: None,
            halt: None,
            poll_timeout: Duration::from_millis(u64::from(config.poll_timeout_ms.max(1))),
            echo: config.echo,
        })
    }

    /// Path the host should redirect the child's stdout to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ring(&self) -> SharedRing {
        Arc::clone(&self.ring)
    }

    /// Open the channel for non-blocking reads. Idempotent.
    pub fn activate(&mut self) -> io::Result<()> {
        if self.channel.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(&self.path)?;
        self.channel = Some(Arc::new(file));
        debug!(path = %self.path.display(), "relay channel opened");
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.channel.is_some()
    }

    /// Whether a reader thread is alive.
    pub fn is_running(&self) -> bool {
        self.reader
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn the reader thread. It runs until `running` is cleared or the
    /// relay stops it.
    ///
    /// A reader left from an earlier run is halted and joined first. Its
    /// `running` flag may already be set again by a quick stop and continue.
    pub fn start(&mut self, running: Arc<AtomicBool>) -> io::Result<()> {
        let Some(channel) = self.channel.clone() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "relay channel is not open",
            ));
        };
        self.stop();

        let halt = Arc::new(AtomicBool::new(false));
        let pump = Pump {
            channel,
            ring: Arc::clone(&self.ring),
            running,
            halt: Arc::clone(&halt),
            poll_timeout: self.poll_timeout,
            echo: self.echo,
        };
        let handle = thread::Builder::new()
            .name("dashpanel-relay".into())
            .spawn(move || pump.run())?;
        self.reader = Some(handle);
        self.halt = Some(halt);
        info!(path = %self.path.display(), "relay thread started");
        Ok(())
    }

    /// Wait for the reader thread to exit after its flag was cleared elsewhere.
    pub fn join(&mut self) {
        if let Some(handle) = self.reader.take() {
            match handle.join() {
                Ok(lines) => info!(lines, "relay thread stopped"),
                Err(_) => warn!("relay thread panicked"),
            }
        }
        self.halt = None;
    }

    /// Halt the reader thread and join it.
    pub fn stop(&mut self) {
        if let Some(halt) = &self.halt {
            halt.store(true, Ordering::SeqCst);
        }
        self.join();
    }

    /// Stop the reader, then close the channel. The pipe itself remains.
    pub fn deactivate(&mut self) {
        self.stop();
        if self.channel.take().is_some() {
            debug!(path = %self.path.display(), "relay channel closed");
        }
    }

    /// Read whatever is available within `timeout` and commit it.
    ///
    /// Returns the text read, or `None` when nothing arrived. Refused while the
    /// reader thread owns the channel.
    pub fn drain_once(&mut self, timeout: Duration) -> io::Result<Option<String>> {
        if self.is_running() {
            return Err(io::Error::new(
                io::ErrorKind::ResourceBusy,
                "relay thread is reading the channel",
            ));
        }
        let Some(channel) = self.channel.clone() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "relay channel is not open",
            ));
        };

        let mut splitter = LineSplitter::default();
        let mut buf = [0u8; READ_CHUNK];
        let mut text = Vec::new();
        let mut wait = timeout;
        while wait_readable(&channel, wait)? {
            match read_chunk(&channel, &mut buf)? {
                Chunk::Data(n) => {
                    text.extend_from_slice(&buf[..n]);
                    commit(&self.ring, splitter.feed(&buf[..n]));
                }
                Chunk::Closed | Chunk::Empty => break,
            }
            wait = Duration::ZERO;
        }
        commit(&self.ring, splitter.finish().into_iter().collect());

        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&text).into_owned()))
        }
    }
}

impl Drop for OutputRelay {
    fn drop(&mut self) {
        self.deactivate();
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %err, "failed to remove relay channel");
        }
    }
}
