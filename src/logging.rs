//! Log setup for the binary.
//!
//! The terminal runs in raw mode on the alternate screen, so logs never go to
//! stdout/stderr. They are written to the file named by `QUIZ_LOG_PATH`, and
//! dropped when it is unset.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber when `QUIZ_LOG_PATH` is set.
///
/// Returns whether logging was enabled. The filter comes from `RUST_LOG`
/// (default `info`).
pub fn init_logging() -> Result<bool> {
    match std::env::var("QUIZ_LOG_PATH") {
        Ok(path) if !path.trim().is_empty() => {
            init_file_logging(Path::new(path.trim()))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))
}
