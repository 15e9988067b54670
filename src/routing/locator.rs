//! Project locator
//!
//! Decides which project root serves a request and which path inside that
//! root was asked for. Single-project mode always answers with the fixed
//! root; multi-tenant mode picks a tenant directory from the first path
//! segment, listing the root on every request.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tokio::fs;

use super::should_ignore;
use crate::config::project::CONFIG_FILES;
use crate::config::{ProjectConfig, SiteConfig, SiteMode};
use crate::error::ResolveError;
use crate::pages::ProjectEntry;

#[derive(Debug, Clone)]
pub enum ProjectLocator {
    Single { root: PathBuf },
    MultiHost { root: PathBuf },
}

/// Project root and the request path relative to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath {
    pub root: PathBuf,
    /// Public URL prefix of the project (`/<tenant>` or empty)
    pub mount: String,
    /// Request path relative to the project root, always starting with `/`
    pub sub_path: String,
    pub tenant: Option<String>,
}

/// Where a request goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Project(ProjectPath),
    /// Terminal redirect, answered before any project is loaded
    Redirect(String),
    /// Root of a multi-tenant site: entry names in listing order
    Index(Vec<String>),
    /// No tenant matched; the not-found cascade runs against `root`
    Missing { root: PathBuf },
}

impl ProjectLocator {
    pub fn from_config(site: &SiteConfig) -> Self {
        let root = PathBuf::from(&site.root);
        match site.mode {
            SiteMode::Single => Self::Single { root },
            SiteMode::Multihost => Self::MultiHost { root },
        }
    }

    pub fn root(&self) -> &Path {
        match self {
            Self::Single { root } | Self::MultiHost { root } => root,
        }
    }

    /// Locate the project for a URL path (no query string)
    pub async fn locate(&self, path: &str) -> Result<Location, ResolveError> {
        match self {
            Self::Single { root } => Ok(Location::Project(ProjectPath {
                root: root.clone(),
                mount: String::new(),
                sub_path: path.to_string(),
                tenant: None,
            })),
            Self::MultiHost { root } => locate_tenant(root, path).await,
        }
    }
}

async fn locate_tenant(root: &Path, path: &str) -> Result<Location, ResolveError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (segment, rest) = match trimmed.split_once('/') {
        Some((segment, rest)) => (segment, Some(rest)),
        None => (trimmed, None),
    };

    // Private tenant names never reach a project
    if should_ignore(&[], segment) {
        return Ok(Location::Missing {
            root: root.to_path_buf(),
        });
    }

    let entries = list_entries(root).await?;

    if segment.is_empty() {
        return Ok(Location::Index(
            entries.into_iter().map(|(name, _)| name).collect(),
        ));
    }

    let wanted = urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment));
    // Duplicate names cannot exist on a case-sensitive filesystem; first match wins
    let Some((tenant, _)) = entries
        .into_iter()
        .find(|(name, is_dir)| *is_dir && *name == wanted)
    else {
        return Ok(Location::Missing {
            root: root.to_path_buf(),
        });
    };

    match rest {
        None | Some("") => Ok(Location::Redirect(format!("/{segment}/index.html"))),
        Some(rest) => Ok(Location::Project(ProjectPath {
            root: root.join(&tenant),
            mount: format!("/{segment}"),
            sub_path: format!("/{rest}"),
            tenant: Some(tenant),
        })),
    }
}

/// Directory entries of the multi-tenant root as `(name, is_dir)`
async fn list_entries(root: &Path) -> Result<Vec<(String, bool)>, ResolveError> {
    let list_error = |source| ResolveError::ListProjects {
        path: root.to_path_buf(),
        source,
    };

    let mut dir = fs::read_dir(root).await.map_err(list_error)?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await.map_err(list_error)? {
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    Ok(entries)
}

/// Entries shown on the multi-tenant index page
///
/// Drops private names and reserved config filenames, keeps listing order.
pub fn project_entries(names: &[String], config: &ProjectConfig, host: &str) -> Vec<ProjectEntry> {
    names
        .iter()
        .filter(|name| !should_ignore(&config.ignore, name))
        .filter(|name| !CONFIG_FILES.contains(&name.as_str()))
        .map(|name| ProjectEntry {
            name: name.clone(),
            url: format!("http://{host}/{}", urlencoding::encode(name)),
        })
        .collect()
}
