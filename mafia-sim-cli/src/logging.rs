//! Logger sink setup (§6 "Logger sink" external collaborator): a
//! `tracing-subscriber` that writes timestamped lines to stdout and,
//! optionally, duplicates them to a rolling file under the logs directory
//! via `tracing-appender`. The installed subscriber is safe for concurrent
//! calls from every agent thread, satisfying the engine's requirement on
//! its logging sink.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Guard returned by [`init`]; dropping it flushes the background file
/// writer. Must be held for the lifetime of `main`.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Installs the global subscriber. `logs_dir` is where the rolling log
/// file (`mafia-sim.log`) is written; the directory is created if absent.
pub fn init(logs_dir: &Path) -> LoggingGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer().with_target(false);

    let file_guard = match std::fs::create_dir_all(logs_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::never(logs_dir, "mafia-sim.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().with_ansi(false).with_target(false).with_writer(non_blocking);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();

            Some(guard)
        }
        Err(err) => {
            tracing_subscriber::registry().with(env_filter).with(stdout_layer).init();
            tracing::warn!(error = %err, dir = %logs_dir.display(), "could not create logs dir, file logging disabled");
            None
        }
    };

    LoggingGuard { _file_guard: file_guard }
}
