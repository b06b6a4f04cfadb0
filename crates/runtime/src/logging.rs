use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directory holding the rolling log files, `~/.wayfinder/logs`.
pub fn log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wayfinder/logs")
}

/// Install the global subscriber for `component`.
///
/// Returns `None` if a global subscriber was already installed. Keep the
/// guard alive for as long as logs should be flushed to disk.
pub fn init_logging(component: &str, to_stderr: bool) -> Option<WorkerGuard> {
    let log_dir = log_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    // One file per embedding component and day; routing events share it with the host.
    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let installed = if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).try_init()
    } else {
        registry.try_init()
    };

    match installed {
        Ok(()) => Some(guard),
        Err(e) => {
            tracing::debug!("Logging already initialized: {}", e);
            None
        }
    }
}
