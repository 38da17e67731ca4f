//! One independent tail → dedup → parse → process pipeline per character.
//!
//! Topology: the tailer task pushes raw lines into a bounded channel; the
//! consumer task owns the suppressor, the parser and the processor, and
//! publishes a fresh [`OverlaySnapshot`] after every recognized line. Nothing
//! is shared between pipelines except the log file itself.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, watch};
use waksense_types::{
    AppConfig, ClassKind, DedupSettings, DedupStats, MonitorState, OverlaySnapshot,
    TrackedCharacter,
};

use super::background_tasks::BackgroundTasks;
use super::error::PipelineError;
use crate::combat_log::{DuplicateSuppressor, LogParser, Tailer};
use crate::signal_processor::{EventProcessor, GameSignal, SignalHandler};

const LINE_CHANNEL_CAPACITY: usize = 1024;

/// Overlay lock shared between a pipeline and whoever toggles it.
pub type LockFlag = Arc<AtomicBool>;

pub type BoxedHandler = Box<dyn SignalHandler + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineCommand {
    ResetDedupStats,
}

pub struct CharacterPipeline {
    character: String,
    class: ClassKind,
    lock: LockFlag,
    snapshot_rx: watch::Receiver<OverlaySnapshot>,
    state_rx: watch::Receiver<MonitorState>,
    command_tx: mpsc::Sender<PipelineCommand>,
    shutdown_tx: watch::Sender<bool>,
    tasks: BackgroundTasks,
}

impl CharacterPipeline {
    /// Start tailing the configured log for one character, from end-of-file.
    pub fn spawn(config: &AppConfig, character: &TrackedCharacter) -> Self {
        let tailer = Tailer::new(PathBuf::from(&config.log_file), config.tailer);
        Self::spawn_with_tailer(tailer, config, character, None)
    }

    /// Start with an already positioned tailer and an optional signal handler.
    pub fn spawn_with_tailer(
        tailer: Tailer,
        config: &AppConfig,
        character: &TrackedCharacter,
        handler: Option<BoxedHandler>,
    ) -> Self {
        let processor = EventProcessor::new(
            character.name.clone(),
            character.class,
            config.timeline_capacity,
        );
        Self::spawn_inner(tailer, processor, config.dedup, character, handler)
    }

    fn spawn_inner(
        tailer: Tailer,
        mut processor: EventProcessor,
        dedup: DedupSettings,
        character: &TrackedCharacter,
        handler: Option<BoxedHandler>,
    ) -> Self {
        let lock: LockFlag = Arc::new(AtomicBool::new(character.locked));
        let (line_tx, line_rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(MonitorState::Running);
        let (snapshot_tx, snapshot_rx) =
            watch::channel(processor.snapshot(DedupStats::default()));

        tracing::info!(
            character = %character.name,
            class = %character.class,
            path = %tailer.path().display(),
            "Pipeline started"
        );

        let character_name = character.name.clone();
        let tailer_task = tokio::spawn(async move {
            let result = tailer.run(line_tx, shutdown_rx, &state_tx).await;
            let reason = match &result {
                Ok(()) => "stopped".to_string(),
                Err(err) => err.to_string(),
            };
            if let Err(err) = &result {
                tracing::error!(character = %character_name, error = %err, "Monitoring stopped");
            }
            state_tx.send_replace(MonitorState::Stopped { reason });
            result
        });

        let consumer = Consumer {
            parser: LogParser::new(),
            dedup: DuplicateSuppressor::new(dedup),
            processor,
            lock: Arc::clone(&lock),
            snapshot_tx,
            handler,
            line_number: 0,
        };
        let consumer_task = tokio::spawn(consumer.run(line_rx, command_rx));

        Self {
            character: character.name.clone(),
            class: character.class,
            lock,
            snapshot_rx,
            state_rx,
            command_tx,
            shutdown_tx,
            tasks: BackgroundTasks {
                tailer: Some(tailer_task),
                consumer: Some(consumer_task),
            },
        }
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn class(&self) -> ClassKind {
        self.class
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> OverlaySnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<OverlaySnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn monitor_state(&self) -> MonitorState {
        self.state_rx.borrow().clone()
    }

    pub fn monitor_state_receiver(&self) -> watch::Receiver<MonitorState> {
        self.state_rx.clone()
    }

    pub fn lock_flag(&self) -> LockFlag {
        Arc::clone(&self.lock)
    }

    pub fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }

    /// Takes effect from the next processed line.
    pub fn set_locked(&self, locked: bool) {
        self.lock.store(locked, Ordering::Relaxed);
    }

    pub async fn reset_dedup_stats(&self) {
        if self
            .command_tx
            .send(PipelineCommand::ResetDedupStats)
            .await
            .is_err()
        {
            tracing::debug!(character = %self.character, "Pipeline already stopped");
        }
    }

    /// Signal the tailer to stop, let its current poll finish, and wait for
    /// both tasks. Returns the tailer's fatal error if it had given up.
    pub async fn stop(mut self) -> Result<(), PipelineError> {
        // receivers may already be gone if the tailer gave up
        let _ = self.shutdown_tx.send(true);
        let result = self.tasks.join_all().await;
        tracing::info!(character = %self.character, "Pipeline stopped");
        result
    }
}

impl Drop for CharacterPipeline {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}

/// State owned by the consumer task.
struct Consumer {
    parser: LogParser,
    dedup: DuplicateSuppressor,
    processor: EventProcessor,
    lock: LockFlag,
    snapshot_tx: watch::Sender<OverlaySnapshot>,
    handler: Option<BoxedHandler>,
    line_number: u64,
}

impl Consumer {
    async fn run(
        mut self,
        mut line_rx: mpsc::Receiver<String>,
        mut command_rx: mpsc::Receiver<PipelineCommand>,
    ) {
        loop {
            tokio::select! {
                line = line_rx.recv() => match line {
                    Some(line) => self.handle_line(&line),
                    // tailer finished and every queued line is drained
                    None => break,
                },
                Some(command) = command_rx.recv() => self.handle_command(command),
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        self.line_number += 1;
        if !self.dedup.accept(line) {
            return;
        }
        tracing::trace!(line, "accepted");
        let Some(parsed) = self.parser.parse_line(self.line_number, line) else {
            return;
        };

        let locked = self.lock.load(Ordering::Relaxed);
        let signals = self.processor.process_line(&parsed, locked);
        let snapshot = self.processor.snapshot(self.dedup.stats());
        if let Some(handler) = self.handler.as_mut() {
            dispatch(handler.as_mut(), &signals, &snapshot);
        }
        self.snapshot_tx.send_replace(snapshot);
    }

    fn handle_command(&mut self, command: PipelineCommand) {
        match command {
            PipelineCommand::ResetDedupStats => {
                self.dedup.reset_stats();
                let snapshot = self.processor.snapshot(self.dedup.stats());
                self.snapshot_tx.send_replace(snapshot);
            }
        }
    }
}

fn dispatch(handler: &mut dyn SignalHandler, signals: &[GameSignal], snapshot: &OverlaySnapshot) {
    for signal in signals {
        match signal {
            GameSignal::CombatStarted => handler.on_combat_start(),
            GameSignal::CombatEnded { fight_id } => handler.on_combat_end(*fight_id),
            _ => {}
        }
    }
    handler.handle_signals(signals, snapshot);
}
