use super::ReaderError;
use encoding_rs::UTF_8;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, sleep};
use waksense_types::{MonitorState, TailerSettings};

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailPoll {
    FileMissing,
    Lines(Vec<String>),
}

/// Exponential backoff over consecutive failures.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    limit: u32,
    failures: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration, limit: u32) -> Self {
        Self {
            base,
            max,
            limit: limit.max(1),
            failures: 0,
        }
    }

    /// Record a failure. Returns the delay before the next attempt, or `None`
    /// once the failure limit is reached.
    pub fn fail(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures >= self.limit {
            return None;
        }
        let factor = 2u32.saturating_pow(self.failures - 1);
        Some(self.base.saturating_mul(factor).min(self.max))
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

/// Follows one growing log file by byte offset.
pub struct Tailer {
    path: PathBuf,
    offset: u64,
    settings: TailerSettings,
}

impl Tailer {
    /// Existing content is never replayed: the offset starts at end-of-file,
    /// or at 0 if the file doesn't exist yet.
    pub fn new(path: PathBuf, settings: TailerSettings) -> Self {
        let offset = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self::with_offset(path, settings, offset)
    }

    /// Start from an explicit byte offset (0 replays the whole file).
    pub fn with_offset(path: PathBuf, settings: TailerSettings, offset: u64) -> Self {
        Tailer {
            path,
            offset,
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read every complete line appended since the last poll.
    ///
    /// A trailing line without its newline is left unread; the offset only
    /// advances past consumed bytes, so it's picked up whole next time.
    pub async fn poll(&mut self) -> Result<TailPoll, ReaderError> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TailPoll::FileMissing),
            Err(source) => {
                return Err(ReaderError::Metadata {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let len = metadata.len();
        if len < self.offset {
            tracing::warn!(
                path = %self.path.display(),
                offset = self.offset,
                len,
                "Log file truncated, restarting from the beginning"
            );
            self.offset = 0;
        }
        if len == self.offset {
            return Ok(TailPoll::Lines(Vec::new()));
        }

        let file = File::open(&self.path)
            .await
            .map_err(|source| ReaderError::OpenFile {
                path: self.path.clone(),
                source,
            })?;
        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(self.offset))
            .await
            .map_err(|source| ReaderError::Seek {
                path: self.path.clone(),
                source,
            })?;

        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|source| ReaderError::ReadFile {
                    path: self.path.clone(),
                    source,
                })?;

            // EOF, or a partial line still being written
            if read == 0 || !buf.ends_with(b"\n") {
                break;
            }
            self.offset += read as u64;

            let (text, _) = UTF_8.decode_with_bom_removal(&buf);
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }

        Ok(TailPoll::Lines(lines))
    }

    /// Poll until shutdown, pushing lines in file order.
    ///
    /// Shutdown is observed between cycles, so an in-flight read always
    /// completes. Returns an error only after too many consecutive failures.
    pub async fn run(
        mut self,
        tx: mpsc::Sender<String>,
        mut shutdown: watch::Receiver<bool>,
        state: &watch::Sender<MonitorState>,
    ) -> Result<(), ReaderError> {
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms);
        let missing_interval = Duration::from_millis(self.settings.missing_file_interval_ms);
        let mut backoff = Backoff::new(
            Duration::from_millis(self.settings.backoff_base_ms),
            Duration::from_millis(self.settings.backoff_max_ms),
            self.settings.max_consecutive_failures,
        );

        tracing::info!(path = %self.path.display(), offset = self.offset, "Tailing log file");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = match self.poll().await {
                Ok(TailPoll::FileMissing) => {
                    backoff.reset();
                    set_state(state, MonitorState::WaitingForFile);
                    missing_interval
                }
                Ok(TailPoll::Lines(lines)) => {
                    backoff.reset();
                    set_state(state, MonitorState::Running);
                    if lines.is_empty() {
                        poll_interval
                    } else {
                        for line in lines {
                            if tx.send(line).await.is_err() {
                                tracing::debug!("Line consumer gone, stopping tailer");
                                return Ok(());
                            }
                        }
                        continue;
                    }
                }
                Err(err) => match backoff.fail() {
                    Some(delay) => {
                        tracing::warn!(
                            error = %err,
                            attempt = backoff.failures(),
                            delay_ms = delay.as_millis() as u64,
                            "Log read failed, backing off"
                        );
                        delay
                    }
                    None => {
                        tracing::error!(
                            error = %err,
                            attempts = backoff.failures(),
                            "Log read failed too many times, giving up"
                        );
                        return Err(ReaderError::TooManyFailures {
                            path: self.path.clone(),
                            attempts: backoff.failures(),
                            last: Box::new(err),
                        });
                    }
                },
            };

            tokio::select! {
                _ = sleep(delay) => {}
                changed = shutdown.changed() => {
                    // sender dropped counts as a stop request
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(path = %self.path.display(), offset = self.offset, "Tailer stopped");
        Ok(())
    }
}

fn set_state(state: &watch::Sender<MonitorState>, next: MonitorState) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}
