//! Error types
//!
//! `ResolveError` covers every request-fatal failure of the resolution
//! pipeline. Lookup misses are not errors and never appear here.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::compiler::CompileError;

/// Request-fatal failure while resolving a request
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Multi-tenant root could not be listed
    #[error("failed to list projects in {}", path.display())]
    ListProjects {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Project configuration file is malformed
    #[error("invalid project configuration in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    /// Compiler could not open a session for the project
    #[error("failed to prepare compiler for {}", root.display())]
    Session {
        root: PathBuf,
        #[source]
        source: CompileError,
    },

    /// Source file failed to render
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Static file could not be transmitted
    #[error("failed to serve {} (status {status})", path.display())]
    Static { status: u16, path: PathBuf },

    /// Filesystem read failure outside of the static sender
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Blocking render task was cancelled or panicked
    #[error("render task did not complete")]
    Task(#[from] tokio::task::JoinError),
}

/// Startup failure of the binary
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load server configuration")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{0}'")]
    Address(String),

    #[error("failed to compile built-in pages")]
    Pages(#[from] minijinja::Error),

    #[error("site root {} is not a directory", .0.display())]
    SiteRoot(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Render an error and its `source()` chain as trace lines, outermost first
pub fn error_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        lines.push(cause.to_string());
        current = cause.source();
    }
    lines
}
