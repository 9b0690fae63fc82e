//! Usage: Process-wide tracing setup (stdout + optional daily rolling file) and the panic hook.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "strava-data-viewer.log";

/// Install the global subscriber once. The returned guard must outlive the process's logging:
/// dropping it stops the background file writer.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut dir_error = None;
    let (file_layer, guard) = match log_dir {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                (
                    Some(fmt::layer().with_ansi(false).with_writer(writer)),
                    Some(guard),
                )
            }
            Err(err) => {
                dir_error = Some(format!("{}: {err}", dir.display()));
                (None, None)
            }
        },
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already initialized (tests spawn several apps per process).
        return guard;
    }
    let _ = tracing_log::LogTracer::init();

    if let Some(err) = dir_error {
        tracing::warn!("log directory unavailable, logging to stdout only: {err}");
    }

    install_panic_hook();
    guard
}

fn install_panic_hook() {
    // Payload is not logged; it may carry token material.
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(
            location = %location,
            "PANIC: application panicked at {location}. Check the log file for context leading up to this panic."
        );
    }));
}
