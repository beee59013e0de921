#![forbid(unsafe_code)]

//! Session state shared between the debugger integration and the panes.
//!
//! The host layer owns one [`SessionState`] per dashboard session and calls
//! the observer methods (`on_continue`, `on_stop`, `breakpoint_created`, ...)
//! from its event hooks. Panes read the dirty flags during a refresh; the
//! per-cycle flags are cleared by [`SessionState::end_cycle`] after every
//! refresh hook whether or not the dashboard rendered.
//!
//! The only state visible off the main thread is the child-running signal,
//! shared with the relay thread as an `Arc<AtomicBool>`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::host::Breakpoint;

/// Why the debugged program stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Hit the breakpoint with this number.
    Breakpoint(u32),
    Signal,
    Step,
}

#[derive(Debug)]
pub struct SessionState {
    breakpoints: Vec<Breakpoint>,
    breakpoints_changed: bool,
    breakpoint_created: bool,
    hit_breakpoint: Option<u32>,
    location_stale: bool,
    history_count: usize,
    history_grew: bool,
    last_command: Option<String>,
    watch_refresh: bool,
    watch_expressions: Vec<String>,
    child_running: Arc<AtomicBool>,
    relay_active: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            breakpoints: Vec::new(),
            breakpoints_changed: false,
            breakpoint_created: false,
            hit_breakpoint: None,
            // The first render after start must resolve the location.
            location_stale: true,
            history_count: 0,
            history_grew: false,
            last_command: None,
            watch_refresh: true,
            watch_expressions: Vec::new(),
            child_running: Arc::new(AtomicBool::new(false)),
            relay_active: false,
        }
    }

    /// Reset every flag for a dashboard start or stop.
    ///
    /// The running signal keeps its allocation so a relay thread holding a
    /// clone observes the cleared value.
    pub fn reset(&mut self) {
        let child_running = Arc::clone(&self.child_running);
        child_running.store(false, Ordering::SeqCst);
        *self = Self {
            child_running,
            ..Self::new()
        };
    }

    // --- observers ---------------------------------------------------------

    /// The debugged program resumed.
    ///
    /// Returns `true` when the caller should start the relay thread: the relay
    /// is active and no child is already marked running. Detaching one thread
    /// of the child also reports a continue, so repeated calls are idempotent.
    pub fn on_continue(&mut self) -> bool {
        if self.child_running() || !self.relay_active {
            return false;
        }
        self.child_running.store(true, Ordering::SeqCst);
        debug!("child continued with relay active");
        true
    }

    pub fn on_stop(&mut self, reason: StopReason) {
        self.child_running.store(false, Ordering::SeqCst);
        self.location_stale = true;
        self.watch_refresh = true;
        self.hit_breakpoint = match reason {
            StopReason::Breakpoint(number) => Some(number),
            StopReason::Signal | StopReason::Step => None,
        };
        debug!(?reason, "child stopped");
    }

    /// The debugged program exited; logging ends with it.
    pub fn on_exit(&mut self) {
        self.child_running.store(false, Ordering::SeqCst);
        self.relay_active = false;
    }

    pub fn breakpoint_created(&mut self, breakpoint: Breakpoint) {
        debug!(number = breakpoint.number, "breakpoint created");
        if breakpoint.location().is_some() {
            self.breakpoint_created = true;
        }
        self.breakpoints_changed = true;
        self.breakpoints.push(breakpoint);
    }

    pub fn breakpoint_deleted(&mut self, number: u32) {
        let before = self.breakpoints.len();
        self.breakpoints.retain(|bp| bp.number != number);
        if self.breakpoints.len() != before {
            self.breakpoints_changed = true;
        }
    }

    /// Replace the stored snapshot of a breakpoint (condition, enable state, hit count).
    pub fn breakpoint_modified(&mut self, breakpoint: Breakpoint) {
        if let Some(slot) = self
            .breakpoints
            .iter_mut()
            .find(|bp| bp.number == breakpoint.number)
        {
            *slot = breakpoint;
            self.breakpoints_changed = true;
        }
    }

    pub fn mark_location_stale(&mut self) {
        self.location_stale = true;
    }

    pub fn request_watch_refresh(&mut self) {
        self.watch_refresh = true;
    }

    /// Record the host's value-history length; returns whether it grew.
    pub fn record_history_count(&mut self, count: usize) -> bool {
        self.history_grew = count > self.history_count;
        self.history_count = count;
        self.history_grew
    }

    /// Remember the command the operator just issued.
    ///
    /// Frame and thread selection (`f...`, `t...`) move the selected location.
    pub fn record_command(&mut self, command: impl Into<String>) {
        let command = command.into();
        if matches!(command.chars().next(), Some('f' | 't')) {
            self.location_stale = true;
        }
        self.last_command = Some(command);
    }

    /// Clear the per-cycle flags. Called after every refresh hook.
    pub fn end_cycle(&mut self) {
        self.location_stale = false;
        self.watch_refresh = false;
        self.history_grew = false;
    }

    // --- consumers ---------------------------------------------------------

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Consume the "breakpoint list changed" flag.
    pub fn take_breakpoints_changed(&mut self) -> bool {
        std::mem::take(&mut self.breakpoints_changed)
    }

    /// Consume the "breakpoint just created" flag, yielding the newest breakpoint.
    pub fn take_breakpoint_created(&mut self) -> Option<&Breakpoint> {
        if std::mem::take(&mut self.breakpoint_created) {
            self.breakpoints.last()
        } else {
            None
        }
    }

    pub fn hit_breakpoint(&self) -> Option<u32> {
        self.hit_breakpoint
    }

    pub fn location_stale(&self) -> bool {
        self.location_stale
    }

    pub fn watch_refresh_requested(&self) -> bool {
        self.watch_refresh
    }

    pub fn history_count(&self) -> usize {
        self.history_count
    }

    pub fn history_grew(&self) -> bool {
        self.history_grew
    }

    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    pub fn watch_expressions(&self) -> &[String] {
        &self.watch_expressions
    }

    pub fn add_watch(&mut self, expression: impl Into<String>) {
        self.watch_expressions.push(expression.into());
        self.watch_refresh = true;
    }

    /// Remove the watch expression at `index`; `None` when out of range.
    pub fn remove_watch(&mut self, index: usize) -> Option<String> {
        if index >= self.watch_expressions.len() {
            return None;
        }
        self.watch_refresh = true;
        Some(self.watch_expressions.remove(index))
    }

    pub fn child_running(&self) -> bool {
        self.child_running.load(Ordering::SeqCst)
    }

    /// Shared running signal observed by the relay thread.
    pub fn child_running_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.child_running)
    }

    pub fn relay_active(&self) -> bool {
        self.relay_active
    }

    pub fn set_relay_active(&mut self, active: bool) {
        self.relay_active = active;
    }
}
