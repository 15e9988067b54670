//! Processor table
//!
//! Maps an output extension (`html`, `css`, `js`) to the source extensions
//! that compile to it, in priority order. Candidate lists, output types and
//! the source-extension filter are all derived from this one table.

use std::collections::BTreeMap;

use super::OutputType;

/// Extension of the last path segment, without the dot
///
/// Dotfiles such as `.env` have no extension, matching how the static
/// sender and the compiler treat them.
pub fn extname(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &base[idx + 1..],
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessorTable {
    processors: BTreeMap<String, Vec<String>>,
}

impl ProcessorTable {
    pub const fn new(processors: BTreeMap<String, Vec<String>>) -> Self {
        Self { processors }
    }

    fn html_sources(&self) -> &[String] {
        self.processors
            .get("html")
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Candidate sources for a requested output path
    ///
    /// `foo.html` yields `foo.<src>` for every html source, then
    /// `foo.html.<src>`. A path whose extension is not an output type is
    /// treated as a template name: an html source extension is tried
    /// verbatim, anything else gets every html source extension appended.
    pub fn build_candidate_list(&self, file_path: &str) -> Vec<String> {
        let ext = extname(file_path);
        let mut list = Vec::new();

        match self.processors.get(ext).filter(|_| !ext.is_empty()) {
            Some(sources) => {
                let stem = &file_path[..file_path.len() - ext.len()];
                list.extend(sources.iter().map(|src| format!("{stem}{src}")));
                list.extend(sources.iter().map(|src| format!("{file_path}.{src}")));
            }
            None if !ext.is_empty() && self.html_sources().iter().any(|s| s == ext) => {
                list.push(file_path.to_string());
            }
            None => {
                list.extend(
                    self.html_sources()
                        .iter()
                        .map(|src| format!("{file_path}.{src}")),
                );
            }
        }

        list.into_iter()
            .map(|candidate| candidate.trim_matches('/').to_string())
            .collect()
    }

    pub fn output_type(&self, source: &str) -> OutputType {
        let ext = extname(source);
        self.processors
            .iter()
            .find(|(_, sources)| sources.iter().any(|s| s == ext))
            .map_or_else(
                || OutputType::from_extension(ext),
                |(output, _)| OutputType::from_extension(output),
            )
    }

    pub fn is_source_extension(&self, ext: &str) -> bool {
        !ext.is_empty()
            && self
                .processors
                .values()
                .any(|sources| sources.iter().any(|s| s == ext))
    }
}
