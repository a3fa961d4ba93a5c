//! Core logging bootstrap.
//!
//! # Responsibility
//! - Start a rolling file logger once per process.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Re-initializing with the same level and directory is a no-op.
//! - Re-initializing with a different level or directory is rejected.
//! - Initialization never panics.
//! - Log lines carry ids and counts only, never item titles or notes.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt;
use std::panic::PanicHookInfo;
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "shopping";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Self::parse(default_log_level()),
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unsupported log level `{other}`; expected trace|debug|info|warn|error"
            )),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested logger settings after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoggingConfig {
    level: LogLevel,
    log_dir: PathBuf,
}

impl LoggingConfig {
    /// Blank `level` falls back to [`default_log_level`].
    fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let level = LogLevel::parse(level)?;
        let log_dir = PathBuf::from(log_dir.trim());
        if log_dir.as_os_str().is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        if log_dir.is_relative() {
            return Err(format!(
                "log_dir must be an absolute path, got `{}`",
                log_dir.display()
            ));
        }
        Ok(Self { level, log_dir })
    }

    fn ensure_matches(&self, requested: &Self) -> Result<(), String> {
        let (setting, active, wanted) = if self.log_dir != requested.log_dir {
            (
                "at",
                self.log_dir.display().to_string(),
                requested.log_dir.display().to_string(),
            )
        } else if self.level != requested.level {
            (
                "with level",
                self.level.to_string(),
                requested.level.to_string(),
            )
        } else {
            return Ok(());
        };
        Err(format!(
            "logging already initialized {setting} `{active}`; refusing to switch to `{wanted}`"
        ))
    }
}

struct ActiveLogger {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

/// Initializes core logging.
///
/// `level` is one of `trace|debug|info|warn|error` (case-insensitive, blank
/// means [`default_log_level`]). `log_dir` must be an absolute directory; it is
/// created when missing.
///
/// # Errors
/// - Unsupported level, empty or relative directory.
/// - Directory creation or logger backend failure.
/// - A previous call used a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LoggingConfig::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| ActiveLogger::start(requested.clone()))?;
    active.config.ensure_matches(&requested)
}

/// Returns `(level, log_dir)` once logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    let active = ACTIVE.get()?;
    Some((active.config.level.as_str(), active.config.log_dir.clone()))
}

/// Default level for the current build: `debug`, or `info` in release.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

impl ActiveLogger {
    fn start(config: LoggingConfig) -> Result<Self, String> {
        std::fs::create_dir_all(&config.log_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                config.log_dir.display()
            )
        })?;

        let files = FileSpec::default()
            .directory(config.log_dir.as_path())
            .basename(LOG_FILE_BASENAME);
        let handle = Logger::try_with_str(config.level.as_str())
            .map_err(|err| format!("invalid log level `{}`: {err}", config.level))?
            .log_to_file(files)
            .rotate(
                Criterion::Size(ROTATE_AT_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        PANIC_HOOK.get_or_init(install_panic_hook);

        let build = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        };
        info!(
            "event=app_start module=core status=ok platform={} build_mode={build} version={}",
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=logging_init module=core status=ok level={} log_dir={}",
            config.level,
            config.log_dir.display()
        );

        Ok(Self {
            config,
            _handle: handle,
        })
    }
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        let payload = sanitize_message(&panic_payload(info), PANIC_PAYLOAD_LIMIT);
        error!(
            "event=panic_captured module=core status=error location={location} payload={payload}"
        );
        chained(info);
    }));
}

fn panic_payload(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Flattens line breaks and caps the text at `limit` chars, marking the cut.
fn sanitize_message(value: &str, limit: usize) -> String {
    let mut chars = value.chars();
    let mut out: String = chars
        .by_ref()
        .take(limit)
        .map(|ch| if matches!(ch, '\n' | '\r') { ' ' } else { ch })
        .collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        default_log_level, init_logging, logging_status, sanitize_message, LogLevel, LoggingConfig,
    };

    #[test]
    fn log_level_parse_accepts_known_values() {
        assert_eq!(LogLevel::parse("INFO").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::parse(" warning ").unwrap(), LogLevel::Warn);
        assert!(LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn default_log_level_follows_build_mode() {
        let expected = if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };
        assert_eq!(default_log_level(), expected);

        let blank = LogLevel::parse("  ").unwrap();
        assert_eq!(blank.as_str(), expected);
    }

    #[test]
    fn config_rejects_empty_and_relative_dirs() {
        assert!(LoggingConfig::parse("info", "  ").is_err());
        let error = LoggingConfig::parse("info", "logs/dev").unwrap_err();
        assert!(error.contains("absolute"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert_eq!(sanitized, "line1 li...");

        assert_eq!(sanitize_message("short", 8), "short");
    }

    #[test]
    fn config_mismatch_names_the_conflicting_setting() {
        let dir = std::env::temp_dir();
        let dir_str = dir.to_str().unwrap();
        let active = LoggingConfig::parse("info", dir_str).unwrap();
        let other_level = LoggingConfig::parse("debug", dir_str).unwrap();

        assert!(active.ensure_matches(&active.clone()).is_ok());
        let error = active.ensure_matches(&other_level).unwrap_err();
        assert!(error.contains("with level `info`"));
    }

    #[test]
    fn init_logging_is_idempotent_for_same_config_and_rejects_conflicts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_str = first.path().to_str().unwrap();
        let second_str = second.path().to_str().unwrap();

        init_logging("info", first_str).unwrap();
        init_logging("INFO", first_str).unwrap();

        let level_error = init_logging("debug", first_str).unwrap_err();
        assert!(level_error.contains("refusing to switch"));

        let dir_error = init_logging("info", second_str).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().unwrap();
        assert_eq!(active_level, "info");
        assert_eq!(active_dir, first.path());
    }
}
