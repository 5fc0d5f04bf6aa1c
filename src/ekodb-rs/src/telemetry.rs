//! Logging setup for applications embedding the client
//!
//! - Console output for development
//! - Optional JSON formatted logs to a rolling file (daily, 10MB per file)
//!
//! The library itself only emits `tracing` events; calling this is optional.

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const DEFAULT_FILTER: &str = "ekodb_rs=debug,ekodb_core=debug";
const LOG_FILE: &str = "ekodb-client.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Install a global subscriber, honoring `RUST_LOG`
///
/// With `log_dir` set, also writes JSON lines there. The returned guard must be
/// kept alive so buffered file logs are flushed.
pub fn init_telemetry(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(
                dir.join(LOG_FILE),
                RollingConditionBasic::new().daily().max_size(MAX_LOG_BYTES),
                9,
            )?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::info!("Logging to {:?} ({} rotated daily or at 10MB)", dir, LOG_FILE);
    }

    Ok(guard)
}
