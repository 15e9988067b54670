// Project configuration module
// Loads the optional per-project config file (site.toml / site.json)

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ResolveError;

/// Variables handed to every template of a project
pub type Globals = HashMap<String, serde_json::Value>;

/// Reserved filenames holding project configuration, in lookup order
///
/// These are never listed as tenants in multi-tenant mode.
pub const CONFIG_FILES: &[&str] = &["site.toml", "site.json"];

/// Per-project settings, read-only once loaded
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Path prefixes that are never served
    pub ignore: Vec<String>,
    /// `user:pass` pairs; empty disables basic auth
    #[serde(deserialize_with = "deserialize_credentials")]
    pub basic_auth: Vec<String>,
    pub globals: Globals,
}

/// `basic_auth` accepts a single string or a list
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialList {
    One(String),
    Many(Vec<String>),
}

fn deserialize_credentials<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match CredentialList::deserialize(deserializer)? {
        CredentialList::One(cred) => vec![cred],
        CredentialList::Many(creds) => creds,
    })
}

/// Load the project config found in `root`, or defaults when there is none
pub fn load(root: &Path) -> Result<ProjectConfig, ResolveError> {
    let Some(path) = CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
    else {
        return Ok(ProjectConfig::default());
    };

    config::Config::builder()
        .add_source(config::File::from(path.as_path()))
        .build()
        .and_then(|settings| settings.try_deserialize())
        .map_err(|source| ResolveError::Config { path, source })
}
