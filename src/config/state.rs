// Application state module
// Read-only runtime state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::compiler::{AssetCompiler, TemplateCompiler};
use crate::logger::AccessLogFormat;
use crate::routing::ProjectLocator;

/// Application state
pub struct AppState {
    pub config: Config,
    pub locator: ProjectLocator,
    pub compiler: Arc<dyn AssetCompiler>,
    pub access_log_format: AccessLogFormat,
}

impl AppState {
    /// State with the bundled template compiler
    pub fn new(config: &Config) -> Self {
        let compiler = TemplateCompiler::new(config.compiler.processors.clone());
        Self::with_compiler(config, Arc::new(compiler))
    }

    pub fn with_compiler(config: &Config, compiler: Arc<dyn AssetCompiler>) -> Self {
        Self {
            config: config.clone(),
            locator: ProjectLocator::from_config(&config.site),
            compiler,
            access_log_format: AccessLogFormat::parse(&config.logging.access_log_format),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
