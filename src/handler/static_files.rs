//! Static file transmission
//!
//! Reads a literal file from a project root and reports what happened as a
//! [`SendEvent`]. The caller decides how directories and misses are handled.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hyper::body::Bytes;
use tokio::fs;

/// Outcome of a static send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendEvent {
    /// File found and read
    File { body: Bytes, path: PathBuf },
    /// Path names a directory and the request had no trailing slash
    Directory,
    /// Transmission failed; `path` is the filesystem path that was tried
    Error { status: u16, path: PathBuf },
}

/// Send the file at URL path `url_path` (no query) under `root`
///
/// A trailing slash maps to `index.html`. `..` segments are refused with
/// 403, as are files that resolve outside `root` through symlinks.
pub async fn send(root: &Path, url_path: &str) -> SendEvent {
    let decoded = urlencoding::decode(url_path).unwrap_or(Cow::Borrowed(url_path));

    let Some(relative) = map_path(&decoded) else {
        tracing::warn!(path = %url_path, "path traversal attempt blocked");
        return SendEvent::Error {
            status: 403,
            path: root.to_path_buf(),
        };
    };
    let file_path = root.join(relative);

    // NUL cannot appear in a filesystem path
    if decoded.contains('\0') {
        return SendEvent::Error {
            status: 404,
            path: file_path,
        };
    }

    let meta = match fs::metadata(&file_path).await {
        Ok(meta) => meta,
        Err(e) => return io_error(&e, file_path),
    };
    if meta.is_dir() {
        return SendEvent::Directory;
    }

    // Security: ensure file_path is within root after resolving symlinks
    let (root_canonical, file_canonical) =
        match (fs::canonicalize(root).await, fs::canonicalize(&file_path).await) {
            (Ok(root), Ok(file)) => (root, file),
            (Err(e), _) | (_, Err(e)) => return io_error(&e, file_path),
        };
    if !file_canonical.starts_with(&root_canonical) {
        tracing::warn!(
            path = %url_path,
            resolved = %file_canonical.display(),
            "path traversal attempt blocked"
        );
        return SendEvent::Error {
            status: 403,
            path: file_path,
        };
    }

    match fs::read(&file_path).await {
        Ok(content) => SendEvent::File {
            body: Bytes::from(content),
            path: file_path,
        },
        Err(e) => {
            tracing::error!(path = %file_path.display(), error = %e, "failed to read file");
            io_error(&e, file_path)
        }
    }
}

/// Relative filesystem path for a decoded URL path, `None` on `..`
fn map_path(decoded: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            other => relative.push(other),
        }
    }
    if decoded.is_empty() || decoded.ends_with('/') {
        relative.push("index.html");
    }
    Some(relative)
}

fn io_error(err: &std::io::Error, path: PathBuf) -> SendEvent {
    let status = match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory | ErrorKind::InvalidInput => 404,
        ErrorKind::PermissionDenied => 403,
        _ => 500,
    };
    SendEvent::Error { status, path }
}
