//! Minimal compiler for tests: `md` renders to html, `styl` to css
//!
//! `# Title` lines become `<h1>` headings, every other line is copied. A
//! source containing `!error` fails to compile, with the line number of the
//! marker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{AssetCompiler, CompileError, OutputType, ProcessorTable, RenderSession};
use crate::config::Globals;

pub struct StubCompiler {
    table: ProcessorTable,
}

impl StubCompiler {
    pub fn new() -> Self {
        let mut processors = BTreeMap::new();
        processors.insert("html".to_string(), vec!["md".to_string()]);
        processors.insert("css".to_string(), vec!["styl".to_string()]);
        processors.insert("js".to_string(), vec![]);
        Self {
            table: ProcessorTable::new(processors),
        }
    }
}

impl AssetCompiler for StubCompiler {
    fn build_candidate_list(&self, output_path: &str) -> Vec<String> {
        self.table.build_candidate_list(output_path)
    }

    fn output_type(&self, source: &str) -> OutputType {
        self.table.output_type(source)
    }

    fn is_source_extension(&self, ext: &str) -> bool {
        self.table.is_source_extension(ext)
    }

    fn open(&self, root: &Path, _globals: &Globals) -> Result<Arc<dyn RenderSession>, CompileError> {
        Ok(Arc::new(StubSession {
            root: root.to_path_buf(),
        }))
    }
}

struct StubSession {
    root: PathBuf,
}

impl RenderSession for StubSession {
    fn render(&self, source: &str) -> Result<String, CompileError> {
        let text = std::fs::read_to_string(self.root.join(source))
            .map_err(|e| CompileError::new(source, e.to_string()))?;

        let mut out = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.contains("!error") {
                return Err(CompileError::new(source, "unexpected token").with_line(Some(idx + 1)));
            }
            match line.strip_prefix("# ") {
                Some(title) => out.push(format!("<h1>{title}</h1>")),
                None => out.push(line.to_string()),
            }
        }
        Ok(out.join("\n"))
    }
}
