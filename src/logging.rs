//! File logging via tracing. The terminal belongs to the UI, so nothing is
//! written to stdout or stderr once the explorer is running.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DEFAULT_LOG_LEVEL;
use crate::error::{AppError, Result};

/// Prefix of the daily-rolled log files.
pub const LOG_FILE_PREFIX: &str = "fx.log";

/// Install the global subscriber writing to `directory`.
///
/// `RUST_LOG` wins over `level`. Keep the returned guard alive for the
/// lifetime of the process or buffered lines are lost.
pub fn init_logging(directory: &Path, level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(std::env::var("RUST_LOG").ok().as_deref(), level))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}

/// Filter from `env` if set and valid, else `level`, else the default level.
fn build_filter(env: Option<&str>, level: &str) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}
