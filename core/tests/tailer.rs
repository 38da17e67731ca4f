use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::{mpsc, watch};
use waksense_core::{ReaderError, TailPoll, Tailer};
use waksense_core::types::{MonitorState, TailerSettings};

fn fast_settings() -> TailerSettings {
    TailerSettings {
        poll_interval_ms: 10,
        missing_file_interval_ms: 10,
        backoff_base_ms: 5,
        backoff_max_ms: 20,
        max_consecutive_failures: 3,
    }
}

fn append(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(bytes).unwrap();
}

fn lines(poll: TailPoll) -> Vec<String> {
    match poll {
        TailPoll::Lines(lines) => lines,
        TailPoll::FileMissing => panic!("expected lines, file is missing"),
    }
}

#[tokio::test]
async fn test_waits_for_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wakfu_chat.log");

    let mut tailer = Tailer::new(path.clone(), fast_settings());
    assert_eq!(tailer.offset(), 0);
    assert_eq!(tailer.poll().await.unwrap(), TailPoll::FileMissing);

    append(&path, b"first\nsecond\n");
    assert_eq!(lines(tailer.poll().await.unwrap()), vec!["first", "second"]);
    assert_eq!(tailer.offset(), 13);
}

#[tokio::test]
async fn test_existing_content_not_replayed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wakfu_chat.log");
    append(&path, b"old line\n");

    let mut tailer = Tailer::new(path.clone(), fast_settings());
    assert_eq!(tailer.offset(), 9);
    assert!(lines(tailer.poll().await.unwrap()).is_empty());

    append(&path, b"new line\n");
    assert_eq!(lines(tailer.poll().await.unwrap()), vec!["new line"]);
}

#[tokio::test]
async fn test_partial_line_waits_for_newline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wakfu_chat.log");
    append(&path, b"");

    let mut tailer = Tailer::new(path.clone(), fast_settings());
    append(&path, b"complete\npart");
    assert_eq!(lines(tailer.poll().await.unwrap()), vec!["complete"]);
    assert_eq!(tailer.offset(), 9);

    append(&path, b"ial\n");
    assert_eq!(lines(tailer.poll().await.unwrap()), vec!["partial"]);
    assert_eq!(tailer.offset(), 17);
}

#[tokio::test]
async fn test_crlf_blank_lines_and_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wakfu_chat.log");
    append(&path, b"");

    let mut tailer = Tailer::new(path.clone(), fast_settings());
    append(&path, b"one\r\n\r\n  \ntwo \xff\n");
    assert_eq!(
        lines(tailer.poll().await.unwrap()),
        vec!["one".to_string(), "two \u{FFFD}".to_string()]
    );
}

#[tokio::test]
async fn test_truncation_restarts_from_zero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wakfu_chat.log");
    append(&path, b"");

    let mut tailer = Tailer::new(path.clone(), fast_settings());
    append(&path, b"a fairly long line before rotation\n");
    lines(tailer.poll().await.unwrap());

    std::fs::write(&path, b"fresh\n").unwrap();
    assert_eq!(lines(tailer.poll().await.unwrap()), vec!["fresh"]);
    assert_eq!(tailer.offset(), 6);
}

#[tokio::test]
async fn test_run_streams_lines_until_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wakfu_chat.log");

    let tailer = Tailer::new(path.clone(), fast_settings());
    let (tx, mut rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (state_tx, mut state_rx) = watch::channel(MonitorState::Running);

    let task = tokio::spawn(async move { tailer.run(tx, shutdown_rx, &state_tx).await });

    // file doesn't exist yet
    tokio::time::timeout(Duration::from_secs(2), state_rx.wait_for(|s| *s == MonitorState::WaitingForFile))
        .await
        .unwrap()
        .unwrap();

    append(&path, b"hello\nworld\n");
    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    let second = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert_eq!(first.as_deref(), Some("hello"));
    assert_eq!(second.as_deref(), Some("world"));
    assert_eq!(*state_rx.borrow(), MonitorState::Running);

    shutdown_tx.send(true).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
    assert!(result.is_ok());
    // sender dropped with the tailer
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_gives_up_after_consecutive_failures() {
    let dir = TempDir::new().unwrap();
    // a directory opens fine on unix but every read fails
    let path = dir.path().join("not_a_file");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("filler"), b"x").unwrap();
    if std::fs::metadata(&path).unwrap().len() == 0 {
        // filesystem reports no size for directories; nothing to read
        return;
    }

    let tailer = Tailer::with_offset(path.clone(), fast_settings(), 0);
    let (tx, _rx) = mpsc::channel(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let (state_tx, _state_rx) = watch::channel(MonitorState::Running);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        tailer.run(tx, shutdown_rx, &state_tx),
    )
    .await
    .unwrap();

    match result {
        Err(ReaderError::TooManyFailures { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected TooManyFailures, got {other:?}"),
    }
}
