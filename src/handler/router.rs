//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: locate the project, load its
//! configuration, check credentials, run the cascade and finalize.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, AUTHORIZATION, CONTENT_LENGTH, HOST, REFERER, USER_AGENT};
use hyper::{Request, Response};
use tokio::task;

use super::cascade;
use super::context::{Inbound, RequestContext};
use super::outcome::Outcome;
use crate::compiler::OutputType;
use crate::config::{project, AppState, ProjectConfig};
use crate::error::ResolveError;
use crate::http::{auth, build_401_response, finalize};
use crate::logger::{self, AccessLogEntry};
use crate::pages;
use crate::routing::{project_entries, Location, ProjectPath};

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let inbound = Inbound::from_request(&req, &state);

    let response = respond(&inbound, &state).await;

    if state.access_log_enabled() {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            inbound.method.to_string(),
            inbound.path.clone(),
        );
        entry.host.clone_from(&inbound.host);
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = http_version(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.referer = header(REFERER);
        entry.user_agent = header(USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.access_log_format);
    }

    Ok(response)
}

impl Inbound {
    fn from_request<B>(req: &Request<B>, state: &AppState) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            method: req.method().clone(),
            url: req
                .uri()
                .path_and_query()
                .map_or_else(|| req.uri().path().to_string(), ToString::to_string),
            path: req.uri().path().to_string(),
            host: header(HOST).unwrap_or_else(|| {
                format!("{}:{}", state.config.server.host, state.config.server.port)
            }),
            authorization: header(AUTHORIZATION),
        }
    }
}

const fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Resolve a request and build its response
pub async fn respond(inbound: &Inbound, state: &AppState) -> Response<Full<Bytes>> {
    let is_head = inbound.is_head();
    let fail = |err: &ResolveError| {
        tracing::error!(path = %inbound.path, error = %err, "request failed");
        finalize(Outcome::server_error(&inbound.host, err), is_head)
    };

    let location = match state.locator.locate(&inbound.path).await {
        Ok(location) => location,
        Err(e) => return fail(&e),
    };

    let (project, missing) = match location {
        Location::Project(project) => (project, false),
        Location::Redirect(target) => return finalize(Outcome::Redirect { target }, is_head),
        Location::Index(names) => {
            let config = match load_config(state.locator.root()).await {
                Ok(config) => config,
                Err(e) => return fail(&e),
            };
            let entries = project_entries(&names, &config, &inbound.host);
            let body = pages::project_index(&inbound.host, &entries);
            return finalize(
                Outcome::Compiled {
                    body,
                    output: OutputType::Html,
                },
                is_head,
            );
        }
        Location::Missing { root } => (
            ProjectPath {
                root,
                mount: String::new(),
                sub_path: inbound.path.clone(),
                tenant: None,
            },
            true,
        ),
    };

    let config = match load_config(&project.root).await {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    if !missing && !auth::is_authorized(&config.basic_auth, inbound.authorization.as_deref()) {
        tracing::debug!(path = %inbound.path, "basic auth rejected");
        return build_401_response(auth::REALM);
    }

    let mut ctx = RequestContext::new(
        inbound,
        project,
        Arc::new(config),
        Arc::clone(&state.compiler),
    )
    .with_directory_redirect(state.config.site.directory_redirect);

    let outcome = if missing {
        cascade::not_found(&mut ctx).await
    } else {
        cascade::resolve(&mut ctx).await
    };
    finalize(outcome, is_head)
}

/// Project config is re-read on every request so edits apply immediately
async fn load_config(root: &Path) -> Result<ProjectConfig, ResolveError> {
    let root: PathBuf = root.to_path_buf();
    task::spawn_blocking(move || project::load(&root)).await?
}
