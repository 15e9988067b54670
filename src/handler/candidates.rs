//! Path normalizer and candidate builder
//!
//! Maps a request path to the source file that should render it. Priority
//! order belongs to the compiler; this module only normalizes the path,
//! asks for candidates and applies the `index.html` redirect rule.

use std::borrow::Cow;
use std::path::Path;

use crate::compiler::AssetCompiler;

/// What the caller is looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Serve the request path as asked
    Path(String),
    /// Custom error page for a status (`200.*`, `404.*`)
    Fallback(u16),
}

/// Result of a source lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMatch {
    /// Root-relative source file to render
    Found(String),
    /// `<dir>/index.html` has no source but `<dir>` has one; redirect there.
    /// The target is percent-encoded and relative to the project mount.
    Redirect(String),
    Missing,
}

/// Normalize a request path
///
/// Strips the query string, percent-decodes, resolves `.` and `..` without
/// climbing above the root and maps a trailing slash to `index.html`. The
/// result always starts with `/`.
pub fn normalize_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if decoded.is_empty() || decoded.ends_with('/') {
        segments.push("index.html");
    }

    format!("/{}", segments.join("/"))
}

/// Find the source for a lookup under `root`
pub fn find_source(compiler: &dyn AssetCompiler, root: &Path, lookup: &Lookup) -> SourceMatch {
    let normalized = match lookup {
        Lookup::Path(path) => normalize_url(path),
        Lookup::Fallback(status) => format!("/{status}.html"),
    };

    let candidates = compiler.build_candidate_list(&normalized);
    if let Some(source) = compiler.find_first_existing(root, &candidates) {
        return SourceMatch::Found(source);
    }

    if matches!(lookup, Lookup::Path(_)) {
        if let Some(parent) = index_parent(&normalized) {
            let mut candidates = compiler.build_candidate_list(parent);
            candidates.push(format!("{}.html", parent.trim_start_matches('/')));
            if compiler.find_first_existing(root, &candidates).is_some() {
                return SourceMatch::Redirect(encode_path(parent));
            }
        }
    }

    SourceMatch::Missing
}

/// `/foo/index.html` -> `/foo`; `None` for the site root and other names
fn index_parent(normalized: &str) -> Option<&str> {
    normalized
        .strip_suffix("/index.html")
        .filter(|parent| !parent.is_empty())
}

/// Percent-encode each segment of a decoded path, keeping the separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
