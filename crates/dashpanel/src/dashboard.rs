//! The refresh cycle and the operator command surface.

use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use dashpanel_core::{
    Breakpoint, DebugHost, PanelError, Result, SessionState, Size, StopReason,
};
use dashpanel_layout::{LayoutConfig, LayoutTree};
use dashpanel_relay::OutputRelay;
use dashpanel_render::{BorderStyle, PaneContext, Presenter, compose};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::PanelConfig;
use crate::highlight::{Highlighter, PlainText};
use crate::registry::{PANE_NAMES, PaneRegistry, PaneSeed};

/// Rows reserved below the composed frame: the closing border and the host prompt.
const RESERVED_ROWS: u16 = 2;
/// How long `flush` waits for output from the child.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);
const FLUSH_CALL: &str = "call (int) fflush(stdout)";

/// Why a refresh cycle did not draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    LayoutInvalid,
    AutoRenderOff,
    PendingError,
    SkipRequested,
}

impl SkipReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::LayoutInvalid => "layout invalid",
            Self::AutoRenderOff => "auto render off",
            Self::PendingError => "pending error",
            Self::SkipRequested => "skip requested",
        }
    }
}

/// A multi-pane dashboard drawn before each host prompt.
///
/// The host integration calls [`refresh_hook`](Self::refresh_hook) before it
/// waits for the next operator command, forwards `panel ...` commands to
/// [`execute`](Self::execute), and reports program events through the
/// observer methods (`on_continue`, `on_stop`, ...).
pub struct Dashboard {
    config: PanelConfig,
    highlighter: Rc<dyn Highlighter>,
    enabled: bool,
    pending_error: bool,
    render_once: bool,
    skip_render_once: bool,
    layout_valid: bool,
    /// Content area the tree was built for.
    area: Option<Size>,
    tree: Option<LayoutTree>,
    current_layout: LayoutConfig,
    registry: Option<PaneRegistry>,
    session: SessionState,
    relay: Option<OutputRelay>,
    presenter: Presenter,
    border: BorderStyle,
}

impl Dashboard {
    pub fn new(config: PanelConfig) -> Self {
        Self {
            highlighter: Rc::new(PlainText),
            enabled: false,
            pending_error: false,
            render_once: false,
            skip_render_once: false,
            layout_valid: false,
            area: None,
            tree: None,
            current_layout: config.layout.clone(),
            registry: None,
            session: SessionState::new(),
            relay: None,
            presenter: Presenter::new(config.discard_scrollback),
            border: config.style.border(),
            config,
        }
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Rc::new(highlighter);
        self
    }

    /// Instantiate the panes, create the relay, and apply the configured layout.
    pub fn start(&mut self, host: &mut dyn DebugHost) -> Result<()> {
        self.session.reset();
        self.pending_error = false;
        self.render_once = false;
        self.skip_render_once = false;

        if self.config.redirect_inferior_logs && self.relay.is_none() {
            match OutputRelay::create(&self.config.relay) {
                Ok(relay) => self.relay = Some(relay),
                // The dashboard works without a relay; only the Log pane and `run` need it.
                Err(err) => warn!(error = %err, "output relay unavailable"),
            }
        }
        self.registry = Some(PaneRegistry::builtin(&PaneSeed {
            ring: self.relay.as_ref().map(OutputRelay::ring),
            highlighter: Rc::clone(&self.highlighter),
        }));

        host.set_output_suppressed(self.config.discard_host_output);
        let size = host.terminal_size()?;
        let layout = self.config.layout.clone();
        self.refresh_layout(Some(layout), size)?;
        self.enabled = true;
        info!(cols = size.cols, rows = size.rows, "dashboard started");
        Ok(())
    }

    /// Stop rendering, restore host output, and tear down the relay.
    pub fn stop(&mut self, host: &mut dyn DebugHost) {
        self.enabled = false;
        host.set_output_suppressed(false);
        self.session.reset();
        // Dropping the relay joins its thread and removes the channel.
        self.relay = None;
        self.registry = None;
        self.tree = None;
        self.area = None;
        self.layout_valid = false;
        info!("dashboard stopped");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn layout(&self) -> Option<&LayoutTree> {
        self.tree.as_ref()
    }

    pub fn relay(&self) -> Option<&OutputRelay> {
        self.relay.as_ref()
    }

    /// Slot currently showing the named pane.
    pub fn slot_of(&self, pane: &str) -> Option<dashpanel_layout::SlotId> {
        let idx = PANE_NAMES.iter().position(|name| *name == pane)?;
        self.tree.as_ref()?.slot_of(idx)
    }

    /// Rebuild the layout for `size`, switching to `new_layout` when given.
    ///
    /// Without a new layout this is a no-op unless the size changed. A
    /// rejected layout leaves the previous one in effect.
    fn refresh_layout(&mut self, new_layout: Option<LayoutConfig>, size: Size) -> Result<()> {
        let area = Size::new(size.cols, size.rows.saturating_sub(RESERVED_ROWS));
        if new_layout.is_none() && self.area == Some(area) && self.tree.is_some() {
            return Ok(());
        }
        let switching = new_layout.is_some();
        let layout = new_layout.unwrap_or_else(|| self.current_layout.clone());

        let built = LayoutTree::build(&layout, area).and_then(|mut tree| {
            tree.bind(&layout, PANE_NAMES)?;
            Ok(tree)
        });
        match built {
            Ok(tree) => {
                debug!(slots = tree.len(), cols = area.cols, rows = area.rows, "layout rebuilt");
                self.tree = Some(tree);
                self.current_layout = layout;
                self.area = Some(area);
                self.layout_valid = true;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, cols = area.cols, rows = area.rows, "layout rejected");
                // A resize that cannot be laid out leaves nothing valid to draw.
                if !switching {
                    self.layout_valid = false;
                    self.area = Some(area);
                }
                Err(err.into())
            }
        }
    }

    fn skip_reason(&mut self) -> Option<SkipReason> {
        if !self.layout_valid {
            return Some(SkipReason::LayoutInvalid);
        }
        if std::mem::take(&mut self.render_once) {
            return None;
        }
        if !self.config.auto_render {
            return Some(SkipReason::AutoRenderOff);
        }
        if std::mem::take(&mut self.pending_error) {
            return Some(SkipReason::PendingError);
        }
        if std::mem::take(&mut self.skip_render_once) {
            return Some(SkipReason::SkipRequested);
        }
        None
    }

    /// Run one refresh cycle. Returns whether a frame was drawn.
    ///
    /// Panes observe the cycle whether or not the dashboard draws, and the
    /// per-cycle session flags are cleared afterwards either way. Caching
    /// panes latch those flags while observing, so a skipped cycle's change
    /// still reaches the next drawn frame.
    pub fn refresh_hook(&mut self, host: &mut dyn DebugHost, out: &mut dyn Write) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        if let Some(command) = host.last_command() {
            self.session.record_command(command);
        }
        let count = host.history_count();
        self.session.record_history_count(count);

        if let Some(registry) = &mut self.registry {
            let mut ctx = PaneContext::new(&mut self.session, host, &self.config.style);
            for pane in registry.panes_mut() {
                pane.observe_cycle(&mut ctx);
            }
        }

        let result = self.draw_unless_skipped(host, out);
        self.session.end_cycle();
        result
    }

    fn draw_unless_skipped(&mut self, host: &mut dyn DebugHost, out: &mut dyn Write) -> Result<bool> {
        let size = host.terminal_size()?;
        if self.area.map(|area| area.cols) != Some(size.cols)
            || self.area.map(|area| area.rows) != Some(size.rows.saturating_sub(RESERVED_ROWS))
        {
            // Rejection is logged and recorded in `layout_valid`.
            let _ = self.refresh_layout(None, size);
        }

        if let Some(reason) = self.skip_reason() {
            debug!(reason = reason.as_str(), "render skipped");
            return Ok(false);
        }
        self.render(host, out)?;
        Ok(true)
    }

    fn render(&mut self, host: &mut dyn DebugHost, out: &mut dyn Write) -> Result<()> {
        let (Some(tree), Some(registry)) = (&self.tree, &mut self.registry) else {
            return Ok(());
        };
        let mut ctx = PaneContext::new(&mut self.session, host, &self.config.style);
        let lines = compose(tree, registry.panes_mut(), &mut ctx, &self.border);
        let closing = self.border.horizontal(usize::from(tree.area().cols));
        self.presenter.present(out, &lines, &closing)?;
        Ok(())
    }

    /// Run a `panel` command line.
    ///
    /// Any failure suppresses the next render so the message stays visible.
    pub fn execute(&mut self, args: &str, host: &mut dyn DebugHost, out: &mut dyn Write) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let result = Command::parse(args).and_then(|command| self.apply(command, host, out));
        match &result {
            Ok(()) => debug!(command = args, "command executed"),
            Err(err) => {
                self.pending_error = true;
                warn!(command = args, error = %err, "command rejected");
            }
        }
        result
    }

    fn apply(&mut self, command: Command, host: &mut dyn DebugHost, out: &mut dyn Write) -> Result<()> {
        match command {
            Command::Render => self.render_once = true,
            Command::Run(args) => self.run(&args, host)?,
            Command::View { pane, slot } => {
                let idx = PANE_NAMES
                    .iter()
                    .position(|name| *name == pane)
                    .ok_or_else(|| PanelError::runtime(format!("Invalid pane name {pane}")))?;
                let tree = self
                    .tree
                    .as_mut()
                    .ok_or_else(|| PanelError::runtime("No layout in effect."))?;
                tree.assign(idx, slot)
                    .ok_or_else(|| PanelError::runtime(format!("Invalid slot index {slot}")))?;
                // Keep the assignment across rebuilds on resize.
                self.current_layout.panes = tree
                    .slots()
                    .filter_map(|s| s.pane.map(|p| (PANE_NAMES[p].to_owned(), s.id)))
                    .collect();
            }
            Command::Print(expression) => {
                self.passthrough(host, &format!("print {expression}"))?;
            }
            Command::Silent(command) => self.passthrough(host, &command)?,
            Command::Layout(idx) => {
                let layout = self.config.alternate_layouts.get(idx).cloned().ok_or_else(|| {
                    PanelError::runtime(format!(
                        "Alternate layout {idx} out of range ({} defined).",
                        self.config.alternate_layouts.len()
                    ))
                })?;
                let size = host.terminal_size()?;
                self.refresh_layout(Some(layout), size)?;
            }
            Command::Watch(expression) => self.session.add_watch(expression),
            Command::Unwatch(idx) => {
                self.session
                    .remove_watch(idx)
                    .ok_or_else(|| PanelError::runtime(format!("{idx} out of watch list range.")))?;
            }
            Command::Flush => self.flush(host, out)?,
        }
        Ok(())
    }

    /// Run `command` with host output visible and skip the next render.
    fn passthrough(&mut self, host: &mut dyn DebugHost, command: &str) -> Result<()> {
        self.skip_render_once = true;
        host.set_output_suppressed(false);
        let result = host.execute(command);
        host.set_output_suppressed(self.config.discard_host_output);
        result.map_err(PanelError::from)
    }

    fn run(&mut self, args: &[String], host: &mut dyn DebugHost) -> Result<()> {
        let relay = self
            .relay
            .as_mut()
            .ok_or_else(|| PanelError::runtime("Inferior log redirection is disabled."))?;
        relay.activate()?;
        self.session.set_relay_active(true);

        let mut command = String::from("run");
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        command.push_str(&format!(" > {}", relay.path().display()));
        info!(%command, "launching with relay");
        host.execute(&command)?;
        Ok(())
    }

    fn flush(&mut self, host: &mut dyn DebugHost, out: &mut dyn Write) -> Result<()> {
        let relay = match self.relay.as_mut() {
            Some(relay) if relay.is_active() => relay,
            _ => return Err(PanelError::runtime("Panel logger is not enabled.")),
        };
        if !self.session.child_running() {
            // The reader exits within one poll interval once the child stops.
            relay.join();
        }
        self.skip_render_once = true;
        host.set_output_suppressed(false);
        let called = host.execute(FLUSH_CALL);
        host.set_output_suppressed(self.config.discard_host_output);
        called?;

        writeln!(out, "Trying to get inferior's log ...")?;
        match relay.drain_once(FLUSH_TIMEOUT)? {
            Some(text) => out.write_all(text.as_bytes())?,
            None => writeln!(out, "Failed to get new log.")?,
        }
        out.flush()?;
        Ok(())
    }

    /// Message shown to the operator for a failed command.
    pub fn report_error(err: &PanelError) -> String {
        format!("  Panel Error: {err}")
    }

    // --- session observers -----------------------------------------------

    /// The debugged program resumed. Starts the relay thread when logging.
    pub fn on_continue(&mut self) {
        if !self.session.on_continue() {
            return;
        }
        let Some(relay) = &mut self.relay else {
            return;
        };
        if let Err(err) = relay.start(self.session.child_running_signal()) {
            warn!(error = %err, "relay thread failed to start");
            self.session
                .child_running_signal()
                .store(false, std::sync::atomic::Ordering::SeqCst);
        }
    }

    pub fn on_stop(&mut self, reason: StopReason) {
        self.session.on_stop(reason);
    }

    /// The debugged program exited. The relay thread is joined before the
    /// channel closes.
    pub fn on_exit(&mut self) {
        let was_logging = self.session.relay_active();
        self.session.on_exit();
        if let Some(relay) = &mut self.relay {
            relay.deactivate();
        }
        if was_logging {
            debug!("logging ended with the child");
        }
    }

    pub fn breakpoint_created(&mut self, breakpoint: Breakpoint) {
        self.session.breakpoint_created(breakpoint);
    }

    pub fn breakpoint_deleted(&mut self, number: u32) {
        self.session.breakpoint_deleted(number);
    }

    pub fn breakpoint_modified(&mut self, breakpoint: Breakpoint) {
        self.session.breakpoint_modified(breakpoint);
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use dashpanel_core::{Frame, HostError, SourceLocation, ValueText};
    use tracing_test::traced_test;

    use super::*;

    /// Host that records commands and answers from fixed data.
    struct RecordingHost {
        size: Size,
        command: Option<String>,
        history: usize,
        executed: Vec<String>,
        suppressed: Vec<bool>,
        fail_execute: bool,
        location: Option<SourceLocation>,
    }

    impl RecordingHost {
        fn new(cols: u16, rows: u16) -> Self {
            Self {
                size: Size::new(cols, rows),
                command: None,
                history: 0,
                executed: Vec::new(),
                suppressed: Vec::new(),
                fail_execute: false,
                location: None,
            }
        }
    }

    impl DebugHost for RecordingHost {
        fn terminal_size(&self) -> io::Result<Size> {
            Ok(self.size)
        }
        fn last_command(&mut self) -> Option<String> {
            self.command.clone()
        }
        fn history_count(&mut self) -> usize {
            self.history
        }
        fn newest_value(&mut self) -> Option<ValueText> {
            Some(ValueText::new("7"))
        }
        fn selected_location(&mut self) -> Option<SourceLocation> {
            self.location.clone()
        }
        fn stack_frames(&mut self) -> Vec<Frame> {
            self.location
                .clone()
                .map(|location| Frame::Source { level: 0, location })
                .into_iter()
                .collect()
        }
        fn evaluate(&mut self, expression: &str) -> std::result::Result<ValueText, HostError> {
            Err(HostError::new(format!("No symbol \"{expression}\"")))
        }
        fn execute(&mut self, command: &str) -> std::result::Result<(), HostError> {
            self.executed.push(command.to_owned());
            if self.fail_execute {
                return Err(HostError::new("host refused"));
            }
            Ok(())
        }
        fn set_output_suppressed(&mut self, suppressed: bool) {
            self.suppressed.push(suppressed);
        }
    }

    fn config() -> PanelConfig {
        PanelConfig {
            redirect_inferior_logs: false,
            ..PanelConfig::default()
        }
    }

    fn started(host: &mut RecordingHost) -> Dashboard {
        let mut dashboard = Dashboard::new(config());
        dashboard.start(host).unwrap();
        dashboard
    }

    fn cycle(dashboard: &mut Dashboard, host: &mut RecordingHost) -> (bool, String) {
        let mut out = Vec::new();
        let drawn = dashboard.refresh_hook(host, &mut out).unwrap();
        (drawn, String::from_utf8(out).unwrap())
    }

    #[test]
    fn draws_full_frame_with_closing_border() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        let (drawn, out) = cycle(&mut dashboard, &mut host);
        assert!(drawn);
        assert!(out.starts_with("\x1b[H\x1b[2J"));
        // 22 content lines plus the closing border.
        assert_eq!(out.lines().count(), 23);
        assert!(out.contains("No source file/line found in current frame."));
        assert_eq!(host.suppressed, [true]);
    }

    #[traced_test]
    #[test]
    fn skip_order_and_one_shot_flags() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        let mut out = Vec::new();

        dashboard.execute("print x", &mut host, &mut out).unwrap();
        assert_eq!(host.executed, ["print x"]);
        assert_eq!(host.suppressed, [true, false, true]);
        assert!(!cycle(&mut dashboard, &mut host).0);
        assert!(logs_contain("render skipped"));
        assert!(logs_contain("skip requested"));
        assert!(cycle(&mut dashboard, &mut host).0);

        // An explicit render wins over a pending skip.
        dashboard.execute("silent info frame", &mut host, &mut out).unwrap();
        dashboard.execute("", &mut host, &mut out).unwrap();
        assert!(cycle(&mut dashboard, &mut host).0);
        assert!(!cycle(&mut dashboard, &mut host).0);
    }

    #[traced_test]
    #[test]
    fn errors_suppress_one_render() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        let mut out = Vec::new();

        let err = dashboard.execute("view Nope 0", &mut host, &mut out).unwrap_err();
        assert_eq!(Dashboard::report_error(&err), "  Panel Error: Invalid pane name Nope");
        assert!(logs_contain("command rejected"));
        assert!(!cycle(&mut dashboard, &mut host).0);
        assert!(logs_contain("pending error"));
        assert!(cycle(&mut dashboard, &mut host).0);

        let err = dashboard.execute("view Stack", &mut host, &mut out).unwrap_err();
        assert!(Dashboard::report_error(&err).contains("panel view PANE SLOT"));
        let err = dashboard.execute("view Stack 9", &mut host, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Invalid slot index 9");
        let err = dashboard.execute("unwatch 0", &mut host, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "0 out of watch list range.");
        let err = dashboard.execute("layout 0", &mut host, &mut out).unwrap_err();
        assert!(err.to_string().starts_with("Alternate layout 0 out of range"));
        let err = dashboard.execute("run", &mut host, &mut out).unwrap_err();
        assert!(err.is_panel_error());
        let err = dashboard.execute("flush", &mut host, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Panel logger is not enabled.");
    }

    #[test]
    fn host_failure_propagates_and_restores_output_mode() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        host.fail_execute = true;
        let err = dashboard
            .execute("silent bogus", &mut host, &mut Vec::new())
            .unwrap_err();
        assert!(!err.is_panel_error());
        assert_eq!(host.suppressed.last(), Some(&true));
    }

    #[test]
    fn auto_render_off_draws_only_on_request() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = Dashboard::new(PanelConfig {
            auto_render: false,
            ..config()
        });
        dashboard.start(&mut host).unwrap();
        assert!(!cycle(&mut dashboard, &mut host).0);
        dashboard.execute("", &mut host, &mut Vec::new()).unwrap();
        assert!(cycle(&mut dashboard, &mut host).0);
        assert!(!cycle(&mut dashboard, &mut host).0);
    }

    #[test]
    fn skipped_cycles_keep_location_changes_for_the_next_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        let source: String = (1..=40).map(|i| format!("line{i}\n")).collect();
        std::fs::write(&path, source).unwrap();

        let mut host = RecordingHost::new(80, 24);
        host.location = Some(SourceLocation::new(&path, 5).with_function("main"));
        let mut dashboard = Dashboard::new(PanelConfig {
            auto_render: false,
            ..config()
        });
        dashboard.start(&mut host).unwrap();
        dashboard.execute("", &mut host, &mut Vec::new()).unwrap();
        let (drawn, out) = cycle(&mut dashboard, &mut host);
        assert!(drawn);
        assert!(out.contains("\x1b[4m    5 line5"));

        // The stop lands on a new line while auto render is off.
        host.location = Some(SourceLocation::new(&path, 30).with_function("helper"));
        dashboard.on_stop(StopReason::Step);
        assert!(!cycle(&mut dashboard, &mut host).0);
        assert!(!dashboard.session().location_stale());

        dashboard.execute("", &mut host, &mut Vec::new()).unwrap();
        let (drawn, out) = cycle(&mut dashboard, &mut host);
        assert!(drawn);
        assert!(out.contains("\x1b[4m   30 line30"));
        assert!(!out.contains("\x1b[4m    5 line5"));
        assert!(out.contains(":30 in "));
    }

    #[test]
    fn view_swaps_and_survives_resize() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        dashboard.execute("view Stack 0", &mut host, &mut Vec::new()).unwrap();
        assert_eq!(dashboard.slot_of("Stack"), Some(0));
        assert_eq!(dashboard.slot_of("Source"), Some(2));

        // Hidden pane displaces the occupant.
        dashboard.execute("view Log 3", &mut host, &mut Vec::new()).unwrap();
        assert_eq!(dashboard.slot_of("Log"), Some(3));
        assert_eq!(dashboard.slot_of("Breakpoints"), None);

        host.size = Size::new(100, 30);
        assert!(cycle(&mut dashboard, &mut host).0);
        assert_eq!(dashboard.layout().unwrap().area(), Size::new(100, 28));
        assert_eq!(dashboard.slot_of("Stack"), Some(0));
        assert_eq!(dashboard.slot_of("Log"), Some(3));
    }

    #[traced_test]
    #[test]
    fn layout_switch_and_rejection() {
        let mut host = RecordingHost::new(80, 24);
        let mut alternate = LayoutConfig::new([
            Some(dashpanel_layout::SlotSpec::new(0, 10, 10)),
            None,
            None,
        ])
        .with_pane("Watch", 0);
        let mut dashboard = Dashboard::new(PanelConfig {
            alternate_layouts: vec![alternate.clone()],
            ..config()
        });
        dashboard.start(&mut host).unwrap();

        // Too-small terminal invalidates the layout until it fits again.
        host.size = Size::new(2, 3);
        assert!(!cycle(&mut dashboard, &mut host).0);
        assert!(logs_contain("layout rejected"));
        assert!(logs_contain("layout invalid"));
        host.size = Size::new(80, 24);
        assert!(cycle(&mut dashboard, &mut host).0);

        dashboard.execute("layout 0", &mut host, &mut Vec::new()).unwrap();
        assert_eq!(dashboard.layout().unwrap().len(), 1);
        assert_eq!(dashboard.slot_of("Watch"), Some(0));
        assert!(logs_contain("layout rebuilt"));
        host.size = Size::new(40, 12);
        assert!(cycle(&mut dashboard, &mut host).0);
        assert_eq!(dashboard.layout().unwrap().area(), Size::new(40, 10));

        alternate.panes.clear();
        let mut bad = Dashboard::new(PanelConfig {
            alternate_layouts: vec![alternate],
            ..config()
        });
        bad.start(&mut host).unwrap();
        let err = bad.execute("layout 0", &mut host, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Layout config: slot 0 has no pane assigned.");
        assert_eq!(bad.layout().unwrap().len(), 4);
    }

    #[test]
    fn value_history_records_while_hidden() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        dashboard.execute("view Log 1", &mut host, &mut Vec::new()).unwrap();
        assert_eq!(dashboard.slot_of("ValueHistory"), None);

        host.command = Some("p answer".into());
        host.history = 1;
        cycle(&mut dashboard, &mut host);
        dashboard.execute("view ValueHistory 1", &mut host, &mut Vec::new()).unwrap();
        host.command = Some("next".into());
        let (_, out) = cycle(&mut dashboard, &mut host);
        assert!(out.contains("1   p answer"));
    }

    #[test]
    fn frame_commands_mark_location_stale() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        cycle(&mut dashboard, &mut host);
        assert!(!dashboard.session().location_stale());
        host.command = Some("frame 2".into());
        dashboard.refresh_hook(&mut host, &mut Vec::new()).unwrap();
        // Cleared again at the end of the cycle.
        assert!(!dashboard.session().location_stale());
        assert_eq!(dashboard.session().last_command(), Some("frame 2"));
    }

    #[test]
    fn watch_commands_update_session() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        dashboard.execute("watch \"a + b\"", &mut host, &mut Vec::new()).unwrap();
        assert_eq!(dashboard.session().watch_expressions(), ["a + b"]);
        dashboard.execute("unwatch 0", &mut host, &mut Vec::new()).unwrap();
        assert!(dashboard.session().watch_expressions().is_empty());
    }

    #[test]
    fn disabled_dashboard_ignores_everything() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = Dashboard::new(config());
        assert!(!cycle(&mut dashboard, &mut host).0);
        dashboard.execute("view Nope 0", &mut host, &mut Vec::new()).unwrap();

        dashboard.start(&mut host).unwrap();
        dashboard.stop(&mut host);
        assert!(!dashboard.is_enabled());
        assert_eq!(host.suppressed, [true, false]);
        assert!(!cycle(&mut dashboard, &mut host).0);
    }

    #[test]
    fn stop_event_refreshes_location_on_next_cycle() {
        let mut host = RecordingHost::new(80, 24);
        let mut dashboard = started(&mut host);
        cycle(&mut dashboard, &mut host);
        dashboard.on_stop(StopReason::Step);
        assert!(dashboard.session().location_stale());
        assert!(dashboard.session().watch_refresh_requested());
        cycle(&mut dashboard, &mut host);
        assert!(!dashboard.session().location_stale());
    }
}
