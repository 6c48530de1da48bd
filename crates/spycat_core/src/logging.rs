//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize logging exactly once per process, either to size-rotated files
//!   or to stderr.
//! - Emit stable, metadata-only diagnostic events from core.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and destination.
//! - Logging initialization must not panic.
//! - Re-initialization with a different level or destination is rejected.
//! - Events never carry target notes or salaries; ids and codes only.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "spycat";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;
const BUILD_MODE: &str = if cfg!(debug_assertions) { "debug" } else { "release" };

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    /// `None` means stderr.
    log_dir: Option<PathBuf>,
    _logger: LoggerHandle,
}

impl LoggingState {
    /// Rejects a second init that asks for another level or destination.
    fn ensure_matches(&self, level: &str, log_dir: Option<&Path>) -> Result<(), String> {
        if self.log_dir.as_deref() != log_dir {
            return Err(format!(
                "logging already writes to `{}`; refusing to switch to `{}`",
                describe_destination(self.log_dir.as_deref()),
                describe_destination(log_dir)
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already runs at `{}`; refusing to switch to `{level}`",
                self.level
            ));
        }
        Ok(())
    }
}

/// Initializes core logging with level and optional directory.
///
/// With `log_dir = None` records go to stderr; otherwise they go to rolling
/// files under that absolute directory.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when `log_dir` is empty, non-absolute, or cannot be created.
/// - Returns an error when logging is already active with another level or
///   destination, or when the backend fails to start.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let normalized_level = normalize_level(level)?;
    let normalized_dir = log_dir.map(normalize_log_dir).transpose()?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        let logger = start_logger(normalized_level, normalized_dir.as_deref())?;
        install_panic_hook_once();

        info!(
            "event=app_start module=core status=ok platform={} build_mode={} version={}",
            std::env::consts::OS,
            BUILD_MODE,
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=core_init module=core status=ok level={} log_dir={}",
            normalized_level,
            describe_destination(normalized_dir.as_deref())
        );

        Ok(LoggingState {
            level: normalized_level,
            log_dir: normalized_dir.clone(),
            _logger: logger,
        })
    })?;

    state.ensure_matches(normalized_level, normalized_dir.as_deref())
}

/// Returns the default log level for current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, log_dir: Option<&Path>) -> Result<LoggerHandle, String> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

    let logger = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
        None => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
    };

    logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn describe_destination(log_dir: Option<&Path>) -> String {
    log_dir.map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    sanitize_message(text, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
