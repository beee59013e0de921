//! End-to-end relay behavior over a real FIFO.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use dashpanel_relay::{LogRing, OutputRelay, RelayConfig};

fn config(dir: &tempfile::TempDir) -> RelayConfig {
    RelayConfig {
        capacity: 8,
        poll_timeout_ms: 20,
        channel_dir: dir.path().to_path_buf(),
        echo: false,
    }
}

fn wait_for_lines(relay: &OutputRelay, count: usize) -> Vec<String> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let lines = LogRing::lock(&relay.ring()).tail(usize::MAX);
        if lines.len() >= count || Instant::now() > deadline {
            return lines;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn create_names_channel_in_directory() {
    let dir = tempfile::tempdir().unwrap();
    let relay = OutputRelay::create(&config(&dir)).unwrap();
    let name = relay.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(&format!("dashpanel_{}_", std::process::id())));
    assert!(name.ends_with(".log"));
    assert_eq!(relay.path().parent(), Some(dir.path()));
    assert!(!relay.is_active());
}

#[test]
fn relays_complete_lines_while_running() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    relay.activate().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    relay.start(Arc::clone(&running)).unwrap();

    let mut writer = OpenOptions::new().write(true).open(relay.path()).unwrap();
    writer.write_all(b"first\n\tsecond\r\nthi").unwrap();
    writer.flush().unwrap();

    assert_eq!(wait_for_lines(&relay, 2), ["first", "    second"]);
    assert!(relay.is_running());

    drop(writer);
    relay.stop();
    assert!(!relay.is_running());
    // The held partial line is committed when the thread exits.
    assert_eq!(LogRing::lock(&relay.ring()).tail(1), ["thi"]);
}

#[test]
fn thread_exits_when_flag_cleared_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    relay.activate().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    relay.start(Arc::clone(&running)).unwrap();

    running.store(false, Ordering::SeqCst);
    relay.join();
    assert!(!relay.is_running());
}

#[test]
fn restart_halts_reader_whose_flag_was_set_again() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&RelayConfig {
        poll_timeout_ms: 500,
        ..config(&dir)
    })
    .unwrap();
    relay.activate().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    relay.start(Arc::clone(&running)).unwrap();
    let mut writer = OpenOptions::new().write(true).open(relay.path()).unwrap();
    writer.write_all(b"before\n").unwrap();
    assert_eq!(wait_for_lines(&relay, 1), ["before"]);

    // Stop and continue before the reader wakes from its poll.
    running.store(false, Ordering::SeqCst);
    running.store(true, Ordering::SeqCst);
    let (tx, rx) = mpsc::channel();
    let flag = Arc::clone(&running);
    thread::spawn(move || {
        let started = relay.start(flag).map(|()| relay);
        let _ = tx.send(started);
    });
    let mut relay = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("restart joined the previous reader")
        .unwrap();

    writer.write_all(b"after\n").unwrap();
    assert_eq!(wait_for_lines(&relay, 2), ["before", "after"]);
    relay.stop();
    assert!(!relay.is_running());
    // Stopping the relay leaves the session's flag alone.
    assert!(running.load(Ordering::SeqCst));
}

#[test]
fn unterminated_output_reaches_ring_while_running() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    relay.activate().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    relay.start(Arc::clone(&running)).unwrap();

    let mut writer = OpenOptions::new().write(true).open(relay.path()).unwrap();
    for i in 0..5000 {
        write!(writer, "progress {i}%\r").unwrap();
    }
    writer.flush().unwrap();

    let lines = wait_for_lines(&relay, 1);
    assert!(!lines.is_empty());
    assert!(relay.is_running());
    assert!(lines[0].contains("progress"));

    relay.stop();
    let lines = LogRing::lock(&relay.ring()).tail(usize::MAX);
    assert!(lines.iter().all(|line| line.len() <= 4096));
}

#[test]
fn start_requires_activation() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    let err = relay.start(Arc::new(AtomicBool::new(true))).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);
}

#[test]
fn drain_once_reads_available_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    relay.activate().unwrap();

    assert_eq!(relay.drain_once(Duration::from_millis(10)).unwrap(), None);

    let mut writer = OpenOptions::new().write(true).open(relay.path()).unwrap();
    writer.write_all(b"flushed\n").unwrap();
    writer.flush().unwrap();

    let text = relay.drain_once(Duration::from_millis(500)).unwrap();
    assert_eq!(text.as_deref(), Some("flushed\n"));
    assert_eq!(LogRing::lock(&relay.ring()).tail(1), ["flushed"]);
}

#[test]
fn drain_once_refused_while_thread_reads() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    relay.activate().unwrap();
    relay.start(Arc::new(AtomicBool::new(true))).unwrap();
    let err = relay.drain_once(Duration::ZERO).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::ResourceBusy);
    relay.stop();
}

#[test]
fn drop_stops_thread_and_removes_channel() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    let path = relay.path().to_path_buf();
    relay.activate().unwrap();
    relay.start(Arc::new(AtomicBool::new(true))).unwrap();
    assert!(path.exists());
    drop(relay);
    assert!(!path.exists());
}

#[test]
fn ring_is_bounded_by_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = OutputRelay::create(&config(&dir)).unwrap();
    relay.activate().unwrap();
    relay.start(Arc::new(AtomicBool::new(true))).unwrap();

    let mut writer = OpenOptions::new().write(true).open(relay.path()).unwrap();
    for i in 0..20 {
        writeln!(writer, "line {i}").unwrap();
    }
    writer.flush().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while LogRing::lock(&relay.ring()).tail(1) != ["line 19"] && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    relay.stop();
    let lines = LogRing::lock(&relay.ring()).tail(usize::MAX);
    let expected: Vec<String> = (12..20).map(|i| format!("line {i}")).collect();
    assert_eq!(lines, expected);
}
