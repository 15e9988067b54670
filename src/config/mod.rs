// Configuration module entry point
// Server configuration, per-project configuration and shared runtime state

pub mod project;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use project::{Globals, ProjectConfig};
pub use state::AppState;
pub use types::{
    CompilerConfig, Config, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig, SiteMode,
};

/// Command-line values that take precedence over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub root: Option<String>,
    pub multihost: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// Sources, lowest precedence first: built-in defaults, the config file
    /// (optional), `SITESERVE_*` environment variables (`__` separates
    /// sections, e.g. `SITESERVE_SERVER__PORT`), command-line overrides.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SITESERVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(root) = &overrides.root {
            builder = builder.set_override("site.root", root.as_str())?;
        }
        if overrides.multihost {
            builder = builder.set_override("site.mode", "multihost")?;
        }
        if let Some(host) = &overrides.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(port) = overrides.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| addr)
    }
}
