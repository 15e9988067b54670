//! Built-in pages
//!
//! The default 404 page, the developer error page and the multi-tenant
//! project index ship inside the binary. They are compiled once into a
//! shared, read-only template environment.

use std::sync::OnceLock;

use minijinja::{context, Environment};
use serde::Serialize;

use crate::compiler::CompileError;
use crate::handler::ErrorDetails;
use crate::http::response::escape_html;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("index.html", include_str!("../templates/index.html")),
];

static PAGES: OnceLock<Environment<'static>> = OnceLock::new();

/// One entry of the multi-tenant project index
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    pub url: String,
}

fn build_environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    env.add_global(
        "pkg",
        context! { name => env!("CARGO_PKG_NAME"), version => env!("CARGO_PKG_VERSION") },
    );
    Ok(env)
}

/// Compile the built-in templates
///
/// Called once at startup so a broken template fails the process instead of
/// the first request that needs it.
pub fn init() -> Result<(), minijinja::Error> {
    if PAGES.get().is_none() {
        let env = build_environment()?;
        let _ = PAGES.set(env);
    }
    Ok(())
}

fn render(name: &str, ctx: minijinja::Value) -> Option<String> {
    let env = match PAGES.get() {
        Some(env) => env,
        None => {
            init().ok()?;
            PAGES.get()?
        }
    };
    env.get_template(name)
        .and_then(|t| t.render(ctx))
        .map_err(|e| tracing::error!(template = name, error = %e, "failed to render built-in page"))
        .ok()
}

/// Default 404 page
pub fn not_found(project: &str) -> String {
    render("404.html", context! { project => project, name => "Page Not Found" })
        .unwrap_or_else(|| "404 Not Found".to_string())
}

/// Developer-facing error page
pub fn server_error(details: &ErrorDetails) -> String {
    render(
        "error.html",
        context! { project => &details.project, error => details },
    )
    .unwrap_or_else(|| format!("500 Internal Server Error\n\n{}", details.message))
}

/// Multi-tenant index of hosted projects
pub fn project_index(host: &str, projects: &[ProjectEntry]) -> String {
    render("index.html", context! { project => host, projects => projects })
        .unwrap_or_else(|| {
            projects
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
}

/// Notice for a `200.*` or `404.*` page that failed to compile
pub fn broken_page(err: &CompileError) -> String {
    format!(
        "<p>There is an error in your {} file</p>",
        escape_html(&err.source_file)
    )
}

/// Stylesheet that shows a compile error on top of the page
///
/// Keeps the response a valid stylesheet so the page layout survives: the
/// message goes into a comment and into a quoted `content` string.
pub fn stylesheet_error(err: &CompileError) -> String {
    let text = err.to_string();
    let comment = text.replace("*/", "* /");
    let quoted = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\A ")
        .replace('<', "\\3C ");
    format!(
        "/* {comment} */\n\
         body:before {{ display: block; white-space: pre; font-family: monospace; \
         padding: 1em; margin: 0 0 1em; background: #fee2e2; color: #991b1b; \
         content: \"{quoted}\"; }}\n"
    )
}
