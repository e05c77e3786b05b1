//! Application logging functionality
//!
//! Sets up the tracing subscriber and manages the log directory

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::ConfigFile;

/// File name prefix of the daily log files
pub const LOG_FILE_PREFIX: &str = "thaikern.log";

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    ConfigFile::config_dir().join("logs")
}

/// Get the path to today's log file
pub fn current_log_file() -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d");
    logs_dir().join(format!("{LOG_FILE_PREFIX}.{timestamp}"))
}

/// Initialize the logs directory
pub fn initialize_logs_directory() -> anyhow::Result<()> {
    let logs_dir = logs_dir();
    fs::create_dir_all(&logs_dir)?;
    Ok(())
}

fn build_filter(default_filter: &str) -> anyhow::Result<EnvFilter> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;
    Ok(filter)
}

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// With `log_to_file`, output is also written to a daily file under
/// [`logs_dir`]. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init(default_filter: &str, log_to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = build_filter(default_filter)?;
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !log_to_file {
        tracing_subscriber::registry().with(filter).with(stderr).try_init()?;
        return Ok(None);
    }

    initialize_logs_directory()?;
    let appender = tracing_appender::rolling::daily(logs_dir(), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()?;

    tracing::debug!("Logging to {:?}", current_log_file());
    Ok(Some(guard))
}
