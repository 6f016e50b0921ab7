//! Rolling file logging for roster processes.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process.
//! - Route panics through the log before the default hook runs.
//!
//! # Invariants
//! - Repeating `init_logging` with identical settings is a no-op.
//! - Changing level or directory after start is rejected, never applied.
//! - Initialization never panics.
//! - Events carry ids and counts only, never student profile contents.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "roster";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_MAX_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: &'static str,
    dir: PathBuf,
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - Unknown level, blank or relative directory.
/// - Directory cannot be created or backend fails to start.
/// - Logging already active with different settings.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), String> {
    let wanted = LogSettings {
        level: parse_level(level)?,
        dir: absolute_dir(log_dir.as_ref())?,
    };

    let active = ACTIVE.get_or_try_init(|| start_logger(wanted.clone()))?;
    ensure_same_settings(&active.settings, &wanted)
}

/// Active `(level, directory)` or `None` before initialization.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: LogSettings) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            settings.dir.display()
        )
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", settings.level))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        settings.level,
        settings.dir.display()
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn ensure_same_settings(active: &LogSettings, wanted: &LogSettings) -> Result<(), String> {
    if active.dir != wanted.dir {
        return Err(format!(
            "logging already active at `{}`; refusing to switch to `{}`",
            active.dir.display(),
            wanted.dir.display()
        ));
    }
    if active.level != wanted.level {
        return Err(format!(
            "logging already active with level `{}`; refusing to switch to `{}`",
            active.level, wanted.level
        ));
    }
    Ok(())
}

fn parse_level(level: &str) -> Result<&'static str, String> {
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

fn absolute_dir(dir: &Path) -> Result<PathBuf, String> {
    if dir.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if !dir.is_absolute() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            dir.display()
        ));
    }
    Ok(dir.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            single_line(&payload, PANIC_PAYLOAD_MAX_CHARS)
        );
        previous(info);
    }));
}

// Panic text may echo user input; keep it on one line and bounded.
fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut out: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{absolute_dir, init_logging, logging_status, parse_level, single_line};
    use std::path::{Path, PathBuf};

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("roster-logging-{label}-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn parse_level_normalizes_aliases() {
        assert_eq!(parse_level(" WARNING ").unwrap(), "warn");
        assert_eq!(parse_level("Info").unwrap(), "info");
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = absolute_dir(Path::new("logs/dev")).unwrap_err();
        assert!(err.contains("absolute"));
    }

    #[test]
    fn single_line_flattens_and_truncates() {
        let out = single_line("a\nb\rc-long-tail", 5);
        assert!(!out.contains('\n'));
        assert!(!out.contains('\r'));
        assert!(out.ends_with("..."));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        // The logger outlives the test, so the directory is left in place.
        let first = scratch_dir("first");
        let second = scratch_dir("second");

        init_logging("info", &first).unwrap();
        init_logging("INFO", &first).unwrap();

        let level_err = init_logging("debug", &first).unwrap_err();
        assert!(level_err.contains("refusing to switch"));
        let dir_err = init_logging("info", &second).unwrap_err();
        assert!(dir_err.contains("refusing to switch"));

        let (level, dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(dir, first);
    }
}
