//! Resolution cascade
//!
//! Stages run in a fixed order against a [`RequestContext`]. Each stage
//! either finishes the request, defers to the next stage, or jumps straight
//! to the not-found cascade. The not-found cascade always ends in a 404: its
//! last stage renders the built-in page and cannot defer.

use std::io::ErrorKind;
use std::sync::Arc;

use hyper::body::Bytes;
use hyper::Method;
use tokio::{fs, task};

use super::candidates::{find_source, Lookup, SourceMatch};
use super::context::RequestContext;
use super::outcome::Outcome;
use super::static_files::{self, SendEvent};
use crate::compiler::{CompileError, OutputType};
use crate::error::ResolveError;
use crate::pages;
use crate::routing::should_ignore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    IgnoreFilter,
    SourceExtensionFilter,
    StaticAsset,
    CompiledAsset,
    Custom200Static,
    Custom200Compiled,
    Custom404Static,
    Custom404Compiled,
    Default404,
}

/// What a stage decided
#[derive(Debug)]
pub enum Step {
    Done(Outcome),
    Defer,
    /// Abandon the current cascade and run the not-found cascade
    NotFound,
}

pub const PRIMARY: &[Stage] = &[
    Stage::IgnoreFilter,
    Stage::SourceExtensionFilter,
    Stage::StaticAsset,
    Stage::CompiledAsset,
    Stage::Custom200Static,
    Stage::Custom200Compiled,
];

pub const NOT_FOUND: &[Stage] = &[
    Stage::Custom404Static,
    Stage::Custom404Compiled,
    Stage::Default404,
];

/// Resolve a request to exactly one outcome
pub async fn resolve(ctx: &mut RequestContext) -> Outcome {
    match run(PRIMARY, ctx).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => not_found(ctx).await,
        Err(e) => server_error(ctx, &e),
    }
}

/// Run only the not-found cascade
pub async fn not_found(ctx: &mut RequestContext) -> Outcome {
    match run(NOT_FOUND, ctx).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => default_404(ctx),
        Err(e) => server_error(ctx, &e),
    }
}

async fn run(stages: &[Stage], ctx: &mut RequestContext) -> Result<Option<Outcome>, ResolveError> {
    for stage in stages {
        match stage.run(ctx).await? {
            Step::Done(outcome) => {
                tracing::debug!(?stage, status = outcome.status(), path = %ctx.public_path, "resolved");
                return Ok(Some(outcome));
            }
            Step::Defer => {}
            Step::NotFound => {
                tracing::debug!(?stage, path = %ctx.public_path, "not found");
                return Ok(None);
            }
        }
    }
    Ok(None)
}

impl Stage {
    async fn run(self, ctx: &mut RequestContext) -> Result<Step, ResolveError> {
        match self {
            Self::IgnoreFilter => Ok(if should_ignore(&ctx.config.ignore, &ctx.sub_path) {
                Step::NotFound
            } else {
                Step::Defer
            }),
            Self::SourceExtensionFilter => {
                Ok(if ctx.compiler.is_source_extension(&ctx.original_ext) {
                    Step::NotFound
                } else {
                    Step::Defer
                })
            }
            Self::StaticAsset => static_asset(ctx).await,
            Self::CompiledAsset => {
                let lookup = Lookup::Path(ctx.sub_path.clone());
                compiled(ctx, lookup, 200).await
            }
            Self::Custom200Static => custom_static(ctx, 200).await,
            Self::Custom200Compiled => compiled(ctx, Lookup::Fallback(200), 200).await,
            Self::Custom404Static => custom_static(ctx, 404).await,
            Self::Custom404Compiled => compiled(ctx, Lookup::Fallback(404), 404).await,
            Self::Default404 => Ok(Step::Done(default_404(ctx))),
        }
    }
}

async fn static_asset(ctx: &RequestContext) -> Result<Step, ResolveError> {
    if ctx.method != Method::GET && ctx.method != Method::HEAD {
        return Ok(Step::Defer);
    }

    let mut event = static_files::send(&ctx.root, &ctx.sub_path).await;
    // Implicit `.html` for extensionless paths
    let retry = matches!(
        &event,
        SendEvent::Error { status: 404, path } if path.extension().is_none()
    );
    if retry {
        event = static_files::send(&ctx.root, &format!("{}.html", ctx.sub_path)).await;
    }

    match event {
        SendEvent::File { body, path } => Ok(Step::Done(Outcome::StaticFile {
            body,
            extension: path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_string),
        })),
        SendEvent::Directory if ctx.directory_redirect => Ok(Step::Done(Outcome::Redirect {
            target: format!("{}/", ctx.public_path),
        })),
        SendEvent::Directory | SendEvent::Error { status: 404, .. } => Ok(Step::Defer),
        SendEvent::Error { status, path } => Err(ResolveError::Static { status, path }),
    }
}

/// `200.html` / `404.html` served verbatim
async fn custom_static(ctx: &RequestContext, status: u16) -> Result<Step, ResolveError> {
    let path = ctx.root.join(format!("{status}.html"));
    let body = match fs::read(&path).await {
        Ok(content) => Bytes::from(content),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            return Ok(Step::Defer)
        }
        Err(source) => return Err(ResolveError::Io { path, source }),
    };

    Ok(Step::Done(if status == 404 {
        Outcome::NotFound {
            body,
            output: OutputType::Html,
        }
    } else {
        Outcome::StaticFile {
            body,
            extension: Some("html".to_string()),
        }
    }))
}

/// Find and render a source, answering with `status` on success
///
/// A broken `200.*` or `404.*` page answers 404 with a short notice naming
/// the file, so the not-found cascade still ends in a 404.
async fn compiled(ctx: &mut RequestContext, lookup: Lookup, status: u16) -> Result<Step, ResolveError> {
    let fallback = matches!(lookup, Lookup::Fallback(_));
    let source = match lookup_source(ctx, lookup).await? {
        SourceMatch::Found(source) => source,
        SourceMatch::Redirect(target) => {
            return Ok(Step::Done(Outcome::Redirect {
                target: format!("{}{target}", ctx.mount),
            }))
        }
        SourceMatch::Missing => return Ok(Step::Defer),
    };
    let output = ctx.compiler.output_type(&source);

    match render(ctx, source).await? {
        Ok(body) if body.is_empty() => Ok(Step::Defer),
        Ok(body) if status == 404 => Ok(Step::Done(Outcome::NotFound {
            body: Bytes::from(body),
            output,
        })),
        Ok(body) => Ok(Step::Done(Outcome::Compiled { body, output })),
        Err(e) if fallback => {
            tracing::warn!(error = %e, path = %ctx.public_path, "custom page failed to compile");
            Ok(Step::Done(Outcome::NotFound {
                body: Bytes::from(pages::broken_page(&e)),
                output: OutputType::Html,
            }))
        }
        Err(e) if output == OutputType::Css => {
            tracing::warn!(error = %e, "stylesheet failed to compile");
            Ok(Step::Done(Outcome::Compiled {
                body: pages::stylesheet_error(&e),
                output,
            }))
        }
        Err(e) => Err(ResolveError::Compile(e)),
    }
}

/// Candidate lookup touches the filesystem, so it runs off the reactor
async fn lookup_source(ctx: &RequestContext, lookup: Lookup) -> Result<SourceMatch, ResolveError> {
    let compiler = Arc::clone(&ctx.compiler);
    let root = ctx.root.clone();
    Ok(task::spawn_blocking(move || find_source(compiler.as_ref(), &root, &lookup)).await?)
}

/// Render on the blocking pool; a dropped request abandons the result
async fn render(
    ctx: &mut RequestContext,
    source: String,
) -> Result<Result<String, CompileError>, ResolveError> {
    let session = ctx.session()?;
    Ok(task::spawn_blocking(move || session.render(&source)).await?)
}

fn default_404(ctx: &RequestContext) -> Outcome {
    Outcome::NotFound {
        body: Bytes::from(pages::not_found(&ctx.host)),
        output: OutputType::Html,
    }
}

fn server_error(ctx: &RequestContext, err: &ResolveError) -> Outcome {
    tracing::error!(path = %ctx.public_path, error = %err, "request failed");
    Outcome::server_error(&ctx.host, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::stub::StubCompiler;
    use crate::config::ProjectConfig;
    use crate::handler::context::Inbound;
    use crate::routing::ProjectPath;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                stdfs::create_dir_all(parent).unwrap();
            }
            stdfs::write(path, content).unwrap();
        }
        dir
    }

    fn context_with(
        dir: &TempDir,
        method: Method,
        path: &str,
        config: ProjectConfig,
    ) -> RequestContext {
        let inbound = Inbound {
            method,
            url: path.to_string(),
            path: path.to_string(),
            host: "localhost:9000".to_string(),
            authorization: None,
        };
        let project = ProjectPath {
            root: dir.path().to_path_buf(),
            mount: String::new(),
            sub_path: path.to_string(),
            tenant: None,
        };
        RequestContext::new(
            &inbound,
            project,
            Arc::new(config),
            Arc::new(StubCompiler::new()),
        )
    }

    async fn get(dir: &TempDir, path: &str) -> Outcome {
        let mut ctx = context_with(dir, Method::GET, path, ProjectConfig::default());
        resolve(&mut ctx).await
    }

    fn html(body: &str) -> Outcome {
        Outcome::Compiled {
            body: body.to_string(),
            output: OutputType::Html,
        }
    }

    #[tokio::test]
    async fn test_compiles_extensionless_path() {
        let dir = project(&[("about.md", "# About")]);
        assert_eq!(get(&dir, "/about").await, html("<h1>About</h1>"));
        assert_eq!(get(&dir, "/about.html").await, html("<h1>About</h1>"));
    }

    #[tokio::test]
    async fn test_root_renders_index_source() {
        let dir = project(&[("index.md", "# Home")]);
        assert_eq!(get(&dir, "/").await, html("<h1>Home</h1>"));
    }

    #[tokio::test]
    async fn test_static_file_beats_compiled_source() {
        let dir = project(&[("about.html", "<p>static</p>"), ("about.md", "# About")]);
        assert_eq!(
            get(&dir, "/about.html").await,
            Outcome::StaticFile {
                body: Bytes::from_static(b"<p>static</p>"),
                extension: Some("html".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_implicit_html_for_static_files() {
        let dir = project(&[("contact.html", "<p>contact</p>")]);
        assert_eq!(
            get(&dir, "/contact").await,
            Outcome::StaticFile {
                body: Bytes::from_static(b"<p>contact</p>"),
                extension: Some("html".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_ignored_paths_never_served() {
        let dir = project(&[
            ("_partials/nav.html", "<nav></nav>"),
            (".env", "SECRET=1"),
            ("drafts/post.html", "<p>draft</p>"),
        ]);
        let config = ProjectConfig {
            ignore: vec!["drafts".to_string()],
            ..ProjectConfig::default()
        };
        for path in ["/_partials/nav.html", "/.env", "/drafts/post.html"] {
            let mut ctx = context_with(&dir, Method::GET, path, config.clone());
            let outcome = resolve(&mut ctx).await;
            assert_eq!(outcome.status(), 404, "{path}");
        }
    }

    #[tokio::test]
    async fn test_ignored_path_uses_custom_404() {
        let dir = project(&[("_secret.html", "hidden"), ("404.html", "<p>gone</p>")]);
        assert_eq!(
            get(&dir, "/_secret.html").await,
            Outcome::NotFound {
                body: Bytes::from_static(b"<p>gone</p>"),
                output: OutputType::Html,
            }
        );
    }

    #[tokio::test]
    async fn test_source_files_are_not_served_raw() {
        let dir = project(&[("about.md", "# About")]);
        assert_eq!(get(&dir, "/about.md").await.status(), 404);
    }

    #[tokio::test]
    async fn test_directory_redirects_to_trailing_slash() {
        let dir = project(&[("docs/index.html", "<p>docs</p>")]);
        assert_eq!(
            get(&dir, "/docs").await,
            Outcome::Redirect {
                target: "/docs/".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_directory_redirect_can_be_disabled() {
        let dir = project(&[("docs/guide.html", "<p>guide</p>")]);
        let mut ctx = context_with(&dir, Method::GET, "/docs", ProjectConfig::default())
            .with_directory_redirect(false);
        assert_eq!(resolve(&mut ctx).await.status(), 404);
    }

    #[tokio::test]
    async fn test_index_redirects_to_parent() {
        let dir = project(&[("foo.md", "# Foo")]);
        assert_eq!(
            get(&dir, "/foo/index.html").await,
            Outcome::Redirect {
                target: "/foo".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_index_redirect_keeps_mount() {
        let dir = project(&[("foo.md", "# Foo")]);
        let mut ctx = context_with(&dir, Method::GET, "/foo/index.html", ProjectConfig::default());
        ctx.mount = "/site-a".to_string();
        assert_eq!(
            resolve(&mut ctx).await,
            Outcome::Redirect {
                target: "/site-a/foo".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_broken_stylesheet_answers_with_css() {
        let dir = project(&[("style.styl", "body\n  !error")]);
        let Outcome::Compiled { body, output } = get(&dir, "/style.css").await else {
            panic!("expected compiled stylesheet");
        };
        assert_eq!(output, OutputType::Css);
        assert!(body.contains("style.styl:2: unexpected token"));
        assert!(body.contains("body:before"));
    }

    #[tokio::test]
    async fn test_broken_page_is_a_server_error() {
        let dir = project(&[("bad.md", "# Bad\n!error")]);
        let Outcome::ServerError(details) = get(&dir, "/bad").await else {
            panic!("expected server error");
        };
        assert_eq!(details.source_file.as_deref(), Some("bad.md"));
        assert_eq!(details.line, Some(2));
        assert_eq!(details.project, "localhost:9000");
    }

    #[tokio::test]
    async fn test_empty_render_defers() {
        let dir = project(&[("blank.md", "")]);
        assert_eq!(get(&dir, "/blank").await.status(), 404);
    }

    #[tokio::test]
    async fn test_custom_200_static_then_compiled() {
        let dir = project(&[("200.html", "<p>app shell</p>")]);
        assert_eq!(
            get(&dir, "/any/route").await,
            Outcome::StaticFile {
                body: Bytes::from_static(b"<p>app shell</p>"),
                extension: Some("html".to_string()),
            }
        );

        let dir = project(&[("200.md", "# Shell")]);
        assert_eq!(get(&dir, "/any/route").await, html("<h1>Shell</h1>"));
    }

    #[tokio::test]
    async fn test_custom_404_compiled() {
        let dir = project(&[("404.md", "# Lost")]);
        assert_eq!(
            get(&dir, "/missing").await,
            Outcome::NotFound {
                body: Bytes::from_static(b"<h1>Lost</h1>"),
                output: OutputType::Html,
            }
        );
    }

    #[tokio::test]
    async fn test_default_404_page() {
        let dir = project(&[]);
        let Outcome::NotFound { body, output } = get(&dir, "/missing").await else {
            panic!("expected not found");
        };
        assert_eq!(output, OutputType::Html);
        assert!(String::from_utf8_lossy(&body).contains("Page Not Found"));
    }

    #[tokio::test]
    async fn test_broken_404_source_still_answers_404() {
        let dir = project(&[("404.md", "!error")]);
        let Outcome::NotFound { body, output } = get(&dir, "/missing").await else {
            panic!("expected not found");
        };
        assert_eq!(output, OutputType::Html);
        assert!(String::from_utf8_lossy(&body).contains("error in your 404.md file"));
    }

    #[tokio::test]
    async fn test_broken_200_source_answers_404() {
        let dir = project(&[("200.md", "# Shell\n!error")]);
        let Outcome::NotFound { body, .. } = get(&dir, "/any/route").await else {
            panic!("expected not found");
        };
        assert!(String::from_utf8_lossy(&body).contains("error in your 200.md file"));
    }

    #[tokio::test]
    async fn test_non_get_methods_skip_static_stage() {
        let dir = project(&[("robots.txt", "User-agent: *"), ("about.md", "# About")]);
        let mut ctx = context_with(&dir, Method::POST, "/robots.txt", ProjectConfig::default());
        assert_eq!(resolve(&mut ctx).await.status(), 404);

        let mut ctx = context_with(&dir, Method::POST, "/about", ProjectConfig::default());
        assert_eq!(resolve(&mut ctx).await, html("<h1>About</h1>"));
    }

    #[tokio::test]
    async fn test_parent_segments_never_escape_root() {
        let dir = project(&[("index.html", "home")]);
        assert_eq!(get(&dir, "/a/../../etc/passwd").await.status(), 404);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let dir = project(&[("about.md", "# About"), ("docs/index.html", "x")]);
        for path in ["/about", "/docs", "/nope", "/_x"] {
            assert_eq!(get(&dir, path).await, get(&dir, path).await, "{path}");
        }
    }

    #[tokio::test]
    async fn test_not_found_cascade_alone() {
        let dir = project(&[("404.html", "<p>no tenant</p>"), ("about.md", "# About")]);
        let mut ctx = context_with(&dir, Method::GET, "/about", ProjectConfig::default());
        assert_eq!(
            not_found(&mut ctx).await,
            Outcome::NotFound {
                body: Bytes::from_static(b"<p>no tenant</p>"),
                output: OutputType::Html,
            }
        );
    }
}
