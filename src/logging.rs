use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Env var holding the tracing filter directive
pub const LOG_ENV: &str = "COIN9S_LOG";

/// Directory for the rolling log files
pub fn log_dir() -> Option<PathBuf> {
  dirs::data_dir().map(|dir| dir.join("coin9s").join("logs"))
}

/// Route tracing output to a daily log file.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or stderr.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init() -> Result<Option<WorkerGuard>> {
  let dir = match log_dir() {
    Some(dir) => dir,
    None => return Ok(None),
  };
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "coin9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(Some(guard))
}
