//! End-to-end refresh cycles against a scripted host.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use dashpanel::{Dashboard, PanelConfig};
use dashpanel_core::{
    Breakpoint, BreakpointKind, DebugHost, Frame, HostError, Size, SourceLocation, StopReason,
    ValueText,
};
use dashpanel_relay::{LogRing, RelayConfig};
use tempfile::TempDir;

const SOURCE: &str = "#include <stdio.h>\n\nint main(void) {\n    int total = 0;\n    for (int i = 0; i < 3; i++)\n        total += i;\n    printf(\"%d\\n\", total);\n    return 0;\n}\n";

struct ScriptedHost {
    size: Size,
    file: PathBuf,
    line: u32,
    command: Option<String>,
    history: usize,
    executed: Vec<String>,
}

impl ScriptedHost {
    fn new(dir: &Path) -> Self {
        let file = dir.join("src").join("main.c");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, SOURCE).unwrap();
        Self {
            size: Size::new(120, 30),
            file,
            line: 4,
            command: None,
            history: 0,
            executed: Vec::new(),
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(&self.file, self.line).with_function("main")
    }
}

impl DebugHost for ScriptedHost {
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
        Some(ValueText::new(format!("{}", self.line * 10)))
    }
    fn selected_location(&mut self) -> Option<SourceLocation> {
        Some(self.location())
    }
    fn stack_frames(&mut self) -> Vec<Frame> {
        vec![
            Frame::Source {
                level: 0,
                location: self.location(),
            },
            Frame::SignalHandler,
        ]
    }
    fn evaluate(&mut self, expression: &str) -> Result<ValueText, HostError> {
        match expression {
            "total" => Ok(ValueText::new((self.line * 2).to_string())),
            other => Err(HostError::new(format!("No symbol \"{other}\" in current context."))),
        }
    }
    fn execute(&mut self, command: &str) -> Result<(), HostError> {
        self.executed.push(command.to_owned());
        Ok(())
    }
    fn set_output_suppressed(&mut self, _suppressed: bool) {}
}

fn cycle(dashboard: &mut Dashboard, host: &mut ScriptedHost) -> Option<String> {
    let mut out = Vec::new();
    let drawn = dashboard.refresh_hook(host, &mut out).unwrap();
    drawn.then(|| String::from_utf8(out).unwrap())
}

fn no_relay() -> PanelConfig {
    PanelConfig {
        redirect_inferior_logs: false,
        ..PanelConfig::default()
    }
}

#[test]
fn first_frame_shows_source_stack_and_history() {
    let dir = TempDir::new().unwrap();
    let mut host = ScriptedHost::new(dir.path());
    let mut dashboard = Dashboard::new(no_relay());
    dashboard.start(&mut host).unwrap();

    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert_eq!(frame.lines().count(), 29);
    assert!(frame.contains("int total = 0;"));
    assert!(frame.contains("src/main.c"));
    assert!(frame.contains(":4 in "));
    assert!(frame.contains("<OS Signal Handler>"));
}

#[test]
fn stepping_moves_source_window_and_records_prints() {
    let dir = TempDir::new().unwrap();
    let mut host = ScriptedHost::new(dir.path());
    let mut dashboard = Dashboard::new(no_relay());
    dashboard.start(&mut host).unwrap();
    cycle(&mut dashboard, &mut host).unwrap();

    host.line = 7;
    host.command = Some("next".into());
    dashboard.on_stop(StopReason::Step);
    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert!(frame.contains(":7 in "));

    host.command = Some("p total".into());
    host.history = 1;
    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert!(frame.contains("1   p total"));
    assert!(frame.contains("    70"));
}

#[test]
fn breakpoints_and_watches_follow_observers() {
    let dir = TempDir::new().unwrap();
    let mut host = ScriptedHost::new(dir.path());
    let mut dashboard = Dashboard::new(no_relay());
    dashboard.start(&mut host).unwrap();
    dashboard
        .execute("view Watch 1", &mut host, &mut Vec::new())
        .unwrap();
    dashboard
        .execute("watch total", &mut host, &mut Vec::new())
        .unwrap();
    dashboard
        .execute("watch ghost", &mut host, &mut Vec::new())
        .unwrap();

    let mut breakpoint = Breakpoint {
        number: 1,
        kind: BreakpointKind::Location(host.location()),
        condition: Some("i == 2".into()),
        enabled: true,
        hit_count: 0,
    };
    dashboard.breakpoint_created(breakpoint.clone());
    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert!(frame.contains("[if i == 2]"));
    assert!(frame.contains("0   total :"));
    assert!(frame.contains("    8"));
    assert!(frame.contains("No symbol \"ghost\" in current context."));

    breakpoint.hit_count = 3;
    dashboard.breakpoint_modified(breakpoint);
    dashboard.on_stop(StopReason::Breakpoint(1));
    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert!(frame.contains("hit  3 times"));

    dashboard.breakpoint_deleted(1);
    dashboard
        .execute("unwatch 1", &mut host, &mut Vec::new())
        .unwrap();
    dashboard.on_stop(StopReason::Step);
    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert!(!frame.contains("hit  3 times"));
    assert!(!frame.contains("ghost"));
}

#[test]
fn config_file_selects_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dashpanel.toml");
    fs::write(
        &path,
        r#"
redirect_inferior_logs = false

[layout]
slots = [[0, 5, 10], [1, 5, 10], [], [], []]

[layout.panes]
Stack = 0
Watch = 1
"#,
    )
    .unwrap();
    let config = PanelConfig::from_toml_file(&path).unwrap();

    let mut host = ScriptedHost::new(dir.path());
    let mut dashboard = Dashboard::new(config);
    dashboard.start(&mut host).unwrap();
    assert_eq!(dashboard.slot_of("Stack"), Some(0));
    assert_eq!(dashboard.slot_of("Source"), None);
    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert!(!frame.contains("int total"));
}

fn relay_config(dir: &Path) -> PanelConfig {
    PanelConfig {
        relay: RelayConfig {
            channel_dir: dir.to_path_buf(),
            poll_timeout_ms: 10,
            echo: false,
            ..RelayConfig::default()
        },
        ..PanelConfig::default()
    }
}

fn wait_for(mut ready: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !ready() {
        assert!(Instant::now() < deadline, "timed out");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn run_relays_child_output_to_log_pane() {
    let dir = TempDir::new().unwrap();
    let mut host = ScriptedHost::new(dir.path());
    let mut dashboard = Dashboard::new(relay_config(dir.path()));
    dashboard.start(&mut host).unwrap();
    let channel = dashboard.relay().unwrap().path().to_path_buf();
    assert!(channel.starts_with(dir.path()));

    dashboard
        .execute("run --verbose input.txt", &mut host, &mut Vec::new())
        .unwrap();
    assert_eq!(
        host.executed,
        [format!("run --verbose input.txt > {}", channel.display())]
    );
    assert!(dashboard.session().relay_active());

    let mut child = OpenOptions::new().write(true).open(&channel).unwrap();
    dashboard.on_continue();
    assert!(dashboard.relay().unwrap().is_running());
    child.write_all(b"first line\nsecond\tline\n").unwrap();
    let ring = dashboard.relay().unwrap().ring();
    wait_for(|| LogRing::lock(&ring).len() == 2);

    dashboard.on_stop(StopReason::Signal);
    dashboard
        .execute("view Log 1", &mut host, &mut Vec::new())
        .unwrap();
    let frame = cycle(&mut dashboard, &mut host).unwrap();
    assert!(frame.contains("first line"));
    assert!(frame.contains("second    line"));

    // Written while stopped; only `flush` picks it up.
    wait_for(|| !dashboard.relay().unwrap().is_running());
    child.write_all(b"buffered tail\n").unwrap();
    let mut out = Vec::new();
    dashboard.execute("flush", &mut host, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("Trying to get inferior's log ...\n"));
    assert!(out.contains("buffered tail"));
    assert_eq!(host.executed.last().unwrap(), "call (int) fflush(stdout)");
    assert!(cycle(&mut dashboard, &mut host).is_none());

    let mut out = Vec::new();
    dashboard.execute("flush", &mut host, &mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().ends_with("Failed to get new log.\n"));

    dashboard.on_exit();
    assert!(!dashboard.relay().unwrap().is_active());
    drop(child);
    drop(dashboard);
    assert!(!channel.exists());
}

#[test]
fn step_then_continue_within_one_poll_keeps_relaying() {
    let dir = TempDir::new().unwrap();
    let mut host = ScriptedHost::new(dir.path());
    let mut config = relay_config(dir.path());
    config.relay.poll_timeout_ms = 500;
    let mut dashboard = Dashboard::new(config);
    dashboard.start(&mut host).unwrap();
    let channel = dashboard.relay().unwrap().path().to_path_buf();
    dashboard.execute("run", &mut host, &mut Vec::new()).unwrap();

    let mut child = OpenOptions::new().write(true).open(&channel).unwrap();
    dashboard.on_continue();
    thread::sleep(Duration::from_millis(50));

    // The old reader is still inside its poll when the child resumes.
    dashboard.on_stop(StopReason::Step);
    let resumed = Instant::now();
    dashboard.on_continue();
    assert!(resumed.elapsed() < Duration::from_secs(2));
    assert!(dashboard.relay().unwrap().is_running());
    assert!(dashboard.session().child_running());

    child.write_all(b"after step\n").unwrap();
    let ring = dashboard.relay().unwrap().ring();
    wait_for(|| LogRing::lock(&ring).tail(1) == ["after step"]);

    dashboard.on_exit();
    assert!(!dashboard.relay().unwrap().is_running());
}

#[test]
fn stop_removes_relay_channel() {
    let dir = TempDir::new().unwrap();
    let mut host = ScriptedHost::new(dir.path());
    let mut dashboard = Dashboard::new(relay_config(dir.path()));
    dashboard.start(&mut host).unwrap();
    let channel = dashboard.relay().unwrap().path().to_path_buf();
    assert!(channel.exists());
    dashboard.stop(&mut host);
    assert!(dashboard.relay().is_none());
    assert!(!channel.exists());
}
