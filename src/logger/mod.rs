//! Logger module
//!
//! Provides logging for the server:
//! - Diagnostics through `tracing`, filtered by `RUST_LOG` or `logging.level`
//! - Access logging with multiple formats
//! - File-based output for both

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use std::io;
use std::net::SocketAddr;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::Config;

/// Initialize logging with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> io::Result<()> {
    writer::init(config.logging.access_log_file.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    let fmt_layer = match config.logging.error_log_file.as_deref() {
        Some(path) => fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(writer::open_log_file(path)?))
            .boxed(),
        None => fmt::layer().with_writer(io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(io::Error::other)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        address = %format!("http://{addr}"),
        root = %config.site.root,
        mode = ?config.site.mode,
        workers = ?config.server.workers,
        "server started"
    );
    if let Some(path) = &config.logging.access_log_file {
        tracing::info!(path = %path, "access log");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    writer::write_access(&entry.format(format));
}
