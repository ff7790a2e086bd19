// ── Logging ───────────────────────────────────────────────────────────────────
//
// A GUI process has no console in release builds, so events go to a log file
// in the settings directory.  The filter is read from `RIBBONPAD_LOG`
// (EnvFilter syntax) and defaults to `ribbonpad=info`.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "RIBBONPAD_LOG";

const LOG_FILE: &str = "ribbonpad.log";

/// Keeps the non-blocking writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("ribbonpad=info"))
}

/// Install the global subscriber writing to `<log_dir>/ribbonpad.log`.
///
/// Falls back to the system temp directory when `log_dir` cannot be created.
/// Returns `None` if a global subscriber is already installed.
pub fn init(log_dir: &Path) -> Option<LoggingGuard> {
    let log_dir = std::fs::create_dir_all(log_dir)
        .map(|()| log_dir.to_path_buf())
        .or_else(|_| -> std::io::Result<PathBuf> {
            let dir = std::env::temp_dir().join("ribbonpad").join("logs");
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        })
        .ok()?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(env_filter()).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}
