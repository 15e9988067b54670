//! Per-request resolution state
//!
//! A [`RequestContext`] is built once the project is known and is threaded
//! by `&mut` through every cascade stage. It cannot exist without a project
//! root.

use std::path::PathBuf;
use std::sync::Arc;

use hyper::Method;

use crate::compiler::{extname, AssetCompiler, RenderSession};
use crate::config::ProjectConfig;
use crate::error::ResolveError;
use crate::routing::ProjectPath;

/// Request data the resolver needs, detached from the hyper request
#[derive(Debug, Clone)]
pub struct Inbound {
    pub method: Method,
    /// Original request target, query included
    pub url: String,
    /// URL path without the query string
    pub path: String,
    /// `Host` header, or the listen address when absent
    pub host: String,
    pub authorization: Option<String>,
}

impl Inbound {
    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

pub struct RequestContext {
    pub url: String,
    /// Public URL path, mount prefix included
    pub public_path: String,
    pub method: Method,
    pub host: String,
    pub root: PathBuf,
    pub mount: String,
    pub sub_path: String,
    pub tenant: Option<String>,
    /// Extension of the requested path, without the dot
    pub original_ext: String,
    pub config: Arc<ProjectConfig>,
    pub compiler: Arc<dyn AssetCompiler>,
    pub directory_redirect: bool,
    session: Option<Arc<dyn RenderSession>>,
}

impl RequestContext {
    pub fn new(
        inbound: &Inbound,
        project: ProjectPath,
        config: Arc<ProjectConfig>,
        compiler: Arc<dyn AssetCompiler>,
    ) -> Self {
        let original_ext = extname(&project.sub_path).to_string();
        Self {
            url: inbound.url.clone(),
            public_path: inbound.path.clone(),
            method: inbound.method.clone(),
            host: inbound.host.clone(),
            root: project.root,
            mount: project.mount,
            sub_path: project.sub_path,
            tenant: project.tenant,
            original_ext,
            config,
            compiler,
            directory_redirect: true,
            session: None,
        }
    }

    #[must_use]
    pub const fn with_directory_redirect(mut self, enabled: bool) -> Self {
        self.directory_redirect = enabled;
        self
    }

    /// Compiler session for this project, opened on first use
    pub fn session(&mut self) -> Result<Arc<dyn RenderSession>, ResolveError> {
        if let Some(session) = &self.session {
            return Ok(Arc::clone(session));
        }
        let session = self
            .compiler
            .open(&self.root, &self.config.globals)
            .map_err(|source| ResolveError::Session {
                root: self.root.clone(),
                source,
            })?;
        self.session = Some(Arc::clone(&session));
        Ok(session)
    }
}
