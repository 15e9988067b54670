// Configuration types module
// Defines all server configuration data structures

use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub compiler: CompilerConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
            workers: None,
        }
    }
}

/// How the site root maps to projects
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SiteMode {
    /// The root is one project
    #[default]
    Single,
    /// The root holds one project directory per tenant
    Multihost,
}

/// Site configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub root: String,
    pub mode: SiteMode,
    /// Redirect directory requests without a trailing slash
    pub directory_redirect: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            mode: SiteMode::Single,
            directory_redirect: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        }
    }
}

/// Compiler configuration
///
/// `processors` maps an output extension to the source extensions that
/// compile to it, highest priority first.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CompilerConfig {
    pub processors: BTreeMap<String, Vec<String>>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        let mut processors = BTreeMap::new();
        processors.insert("html".to_string(), vec!["jinja".to_string(), "j2".to_string()]);
        processors.insert("css".to_string(), Vec::new());
        processors.insert("js".to_string(), Vec::new());
        Self { processors }
    }
}
