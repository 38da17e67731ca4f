//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/waksense/waksense.log` (or platform equivalent)
//! with 10 MB size-based rotation. Set `DEBUG_LOGGING=1` to enable debug
//! output for waksense crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,waksense_core=debug,waksense_cli=debug";
const LOG_FILE_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that must be held for the lifetime of the process
/// so buffered lines are flushed on shutdown. Falls back to stderr-only
/// logging (and returns `None`) when the log file can't be created.
///
/// Stderr keeps the REPL's stdout clean.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join("waksense"),
        None => {
            init_stderr_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // subscriber isn't up yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    // waksense.log plus one rotated waksense.log.1
    let log_path = log_dir.join("waksense.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(LOG_FILE_MAX_BYTES),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(
        log_file = ?log_path,
        debug_logging,
        "Waksense logging initialized"
    );

    Some(guard)
}

fn filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::new(if debug_logging { DEBUG_DIRECTIVE } else { "info" })
}

fn init_stderr_only(debug_logging: bool) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(debug_logging, "Waksense logging initialized (stderr only)");
}
