//! Asset compiler contract
//!
//! The resolution pipeline never decides which source languages exist or in
//! which order they are tried. It asks an [`AssetCompiler`] for a candidate
//! list, checks which candidate exists, and hands the winner to a
//! [`RenderSession`] opened for the project.

mod processors;
#[cfg(test)]
pub mod stub;
mod template;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::Globals;
use crate::http::mime;

pub use processors::{extname, ProcessorTable};
pub use template::TemplateCompiler;

/// Logical type of a compiled output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputType {
    Html,
    Css,
    Js,
    Other(String),
}

impl OutputType {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "js" => Self::Js,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
            Self::Other(ext) => ext,
        }
    }

    /// `Content-Type` header value, with charset when the type defines one
    pub fn content_type(&self) -> String {
        mime::content_type_for(Some(self.extension()))
    }
}

/// Failure to render a source file
#[derive(Debug, Clone, Error)]
#[error("{source_file}{}: {message}", .line.map(|l| format!(":{l}")).unwrap_or_default())]
pub struct CompileError {
    pub source_file: String,
    pub message: String,
    pub line: Option<usize>,
}

impl CompileError {
    pub fn new(source_file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            message: message.into(),
            line: None,
        }
    }

    #[must_use]
    pub const fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

/// A compiler bound to one project root and its globals
pub trait RenderSession: Send + Sync {
    /// Render a root-relative source file
    fn render(&self, source: &str) -> Result<String, CompileError>;
}

/// Source-language knowledge consumed by the resolution pipeline
pub trait AssetCompiler: Send + Sync {
    /// Root-relative source filenames that could produce `output_path`,
    /// highest priority first
    fn build_candidate_list(&self, output_path: &str) -> Vec<String>;

    /// Logical output type produced by a source file
    fn output_type(&self, source: &str) -> OutputType;

    /// Whether `ext` names a source language (serving it raw would leak sources)
    fn is_source_extension(&self, ext: &str) -> bool;

    /// Open a render session for a project
    fn open(&self, root: &Path, globals: &Globals) -> Result<Arc<dyn RenderSession>, CompileError>;

    /// First candidate that exists as a regular file under `root`
    ///
    /// Symlinks are followed but must stay inside `root`.
    fn find_first_existing(&self, root: &Path, candidates: &[String]) -> Option<String> {
        let root = std::fs::canonicalize(root).ok()?;
        candidates
            .iter()
            .find(|candidate| {
                std::fs::canonicalize(root.join(candidate))
                    .is_ok_and(|resolved| resolved.starts_with(&root) && resolved.is_file())
            })
            .cloned()
    }
}
