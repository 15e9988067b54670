//! Resolution outcomes
//!
//! Every request ends in exactly one [`Outcome`]; the response finalizer
//! derives status, headers and body from it and nothing else.

use hyper::body::Bytes;
use serde::Serialize;

use crate::compiler::OutputType;
use crate::error::{error_chain, ResolveError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Compiled page or asset, HTTP 200
    Compiled { body: String, output: OutputType },
    /// Verbatim file, HTTP 200, typed by its own extension
    StaticFile {
        body: Bytes,
        extension: Option<String>,
    },
    /// Canonicalizing redirect, HTTP 301
    Redirect { target: String },
    /// Custom or built-in not-found page, HTTP 404
    NotFound { body: Bytes, output: OutputType },
    /// Developer error page, HTTP 500
    ServerError(ErrorDetails),
}

impl Outcome {
    pub const fn status(&self) -> u16 {
        match self {
            Self::Compiled { .. } | Self::StaticFile { .. } => 200,
            Self::Redirect { .. } => 301,
            Self::NotFound { .. } => 404,
            Self::ServerError(_) => 500,
        }
    }

    pub fn server_error(project: &str, err: &ResolveError) -> Self {
        Self::ServerError(ErrorDetails::from_error(project, err))
    }
}

/// What the error page shows about a request-fatal failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    pub project: String,
    pub message: String,
    pub source_file: Option<String>,
    pub line: Option<usize>,
    pub trace: Vec<String>,
}

impl ErrorDetails {
    pub fn from_error(project: &str, err: &ResolveError) -> Self {
        let (source_file, line, message) = match err {
            ResolveError::Compile(compile) => (
                Some(compile.source_file.clone()),
                compile.line,
                compile.message.clone(),
            ),
            other => (None, None, other.to_string()),
        };
        Self {
            project: project.to_string(),
            message,
            source_file,
            line,
            trace: error_chain(err),
        }
    }
}
