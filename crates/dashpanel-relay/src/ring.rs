//! Fixed-capacity circular log buffer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lines kept by default.
pub const DEFAULT_CAPACITY: usize = 500;

/// Ring shared between the relay thread (sole writer) and the log pane.
pub type SharedRing = Arc<Mutex<LogRing>>;

/// Circular buffer of lines with a write cursor.
///
/// Slots never written hold `None`, so a partially filled ring never reports
/// placeholder entries.
#[derive(Debug, Clone)]
pub struct LogRing {
    lines: Vec<Option<String>>,
    cursor: usize,
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LogRing {
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: vec![None; capacity.max(1)],
            cursor: 0,
        }
    }

    #[must_use]
    pub fn shared(capacity: usize) -> SharedRing {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Lock a shared ring, recovering from a writer that panicked.
    pub fn lock(ring: &Mutex<LogRing>) -> MutexGuard<'_, LogRing> {
        ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.lines.len()
    }

    /// Number of written slots.
    pub fn len(&self) -> usize {
        self.lines.iter().filter(|line| line.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Option::is_none)
    }

    /// Write at the cursor, overwriting the oldest line once full.
    pub fn push(&mut self, line: String) {
        self.lines[self.cursor] = Some(line);
        self.cursor = (self.cursor + 1) % self.lines.len();
    }

    /// The most recent `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let (newer, older) = self.lines.split_at(self.cursor);
        let written: Vec<&String> = older.iter().chain(newer).flatten().collect();
        let skip = written.len().saturating_sub(n);
        written.into_iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.lines.iter_mut().for_each(|line| *line = None);
        self.cursor = 0;
    }
}
