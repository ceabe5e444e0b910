use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "cvdash.log";

/// Directory of the daily log files: $XDG_DATA_HOME/cvdash/logs
pub fn default_log_dir() -> PathBuf {
  dirs::data_local_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("cvdash")
    .join("logs")
}

/// Filter from `--debug`, then CVDASH_LOG, then RUST_LOG, defaulting to info.
fn env_filter(debug: bool) -> EnvFilter {
  if debug {
    return EnvFilter::new("cvdash=debug");
  }
  EnvFilter::try_from_env("CVDASH_LOG")
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("cvdash=info"))
}

/// Initialize the tracing subscriber.
///
/// The terminal belongs to the UI, so records go to a daily-rolling file.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_tracing(debug: bool) -> Result<WorkerGuard> {
  let dir = default_log_dir();
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
    &dir,
    LOG_FILE_PREFIX,
  ));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .with(env_filter(debug))
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
