use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{config::AppConfig, infrastructure::directories::ResolvedPaths};

const LOG_FILE_PREFIX: &str = "comment-guard.log";

// Keeps the file writer flushing until the process exits.
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Console plus daily-rolling file output. Later calls are no-ops.
pub fn init_tracing(config: &AppConfig, paths: &ResolvedPaths) -> Result<()> {
    if FILE_GUARD.get().is_some() {
        return Ok(());
    }

    let appender = tracing_appender::rolling::daily(&paths.logs_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(build_filter(&config.logging.level))
        .with(
            fmt::layer()
                .with_writer(io::stdout)
                .with_target(true)
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_ansi(false),
        )
        .try_init()?;

    let _ = FILE_GUARD.set(guard);
    tracing::info!(
        logs = %paths.logs_dir.display(),
        level = %config.logging.level,
        "tracing initialized"
    );
    Ok(())
}

/// `RUST_LOG` wins; then the configured level; then `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
