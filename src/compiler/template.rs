//! Bundled template compiler backed by `minijinja`

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use minijinja::{context, Environment, Value};

use super::{extname, AssetCompiler, CompileError, OutputType, ProcessorTable, RenderSession};
use crate::config::Globals;

/// Renders every configured source extension as a jinja template
#[derive(Debug, Clone)]
pub struct TemplateCompiler {
    table: ProcessorTable,
}

impl TemplateCompiler {
    pub const fn new(processors: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            table: ProcessorTable::new(processors),
        }
    }
}

impl AssetCompiler for TemplateCompiler {
    fn build_candidate_list(&self, output_path: &str) -> Vec<String> {
        self.table.build_candidate_list(output_path)
    }

    fn output_type(&self, source: &str) -> OutputType {
        self.table.output_type(source)
    }

    fn is_source_extension(&self, ext: &str) -> bool {
        self.table.is_source_extension(ext)
    }

    fn open(&self, root: &Path, globals: &Globals) -> Result<Arc<dyn RenderSession>, CompileError> {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(root.to_path_buf()));
        for (name, value) in globals {
            env.add_global(name.clone(), Value::from_serialize(value));
        }
        Ok(Arc::new(TemplateSession { env }))
    }
}

struct TemplateSession {
    env: Environment<'static>,
}

impl RenderSession for TemplateSession {
    fn render(&self, source: &str) -> Result<String, CompileError> {
        let template = self
            .env
            .get_template(source)
            .map_err(|e| to_compile_error(source, &e))?;

        // `current.path` is the source path split into segments, extension dropped
        let ext = extname(source);
        let stem = source
            .strip_suffix(ext)
            .map_or(source, |s| s.trim_end_matches('.'));
        let path: Vec<&str> = stem.split('/').filter(|s| !s.is_empty()).collect();

        template
            .render(context! { current => context! { source => source, path => path } })
            .map_err(|e| to_compile_error(source, &e))
    }
}

fn to_compile_error(source: &str, err: &minijinja::Error) -> CompileError {
    let message = err
        .detail()
        .map_or_else(|| err.kind().to_string(), ToString::to_string);
    CompileError::new(err.name().unwrap_or(source), message).with_line(err.line())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn compiler() -> TemplateCompiler {
        let mut processors = BTreeMap::new();
        processors.insert("html".to_string(), vec!["jinja".to_string()]);
        processors.insert("css".to_string(), vec!["cssj".to_string()]);
        TemplateCompiler::new(processors)
    }

    #[test]
    fn test_render_with_globals_and_includes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_header.jinja"), "<h1>{{ title }}</h1>").unwrap();
        fs::write(
            dir.path().join("about.jinja"),
            "{% include '_header.jinja' %}<p>{{ current.path | join('/') }}</p>",
        )
        .unwrap();

        let mut globals = Globals::new();
        globals.insert("title".to_string(), serde_json::json!("About"));

        let session = compiler().open(dir.path(), &globals).unwrap();
        let body = session.render("about.jinja").unwrap();
        assert_eq!(body, "<h1>About</h1><p>about</p>");
    }

    #[test]
    fn test_render_nested_source_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("blog")).unwrap();
        fs::write(
            dir.path().join("blog/post.jinja"),
            "{{ current.source }} {{ current.path | join(',') }}",
        )
        .unwrap();

        let session = compiler().open(dir.path(), &Globals::new()).unwrap();
        assert_eq!(
            session.render("blog/post.jinja").unwrap(),
            "blog/post.jinja blog,post"
        );
    }

    #[test]
    fn test_syntax_error_reports_source_and_line() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.jinja"), "line one\n{% if %}\n").unwrap();

        let session = compiler().open(dir.path(), &Globals::new()).unwrap();
        let err = session.render("broken.jinja").unwrap_err();
        assert_eq!(err.source_file, "broken.jinja");
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_every_source_extension_is_templated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.cssj"), "body { color: {{ color }}; }").unwrap();

        let mut globals = Globals::new();
        globals.insert("color".to_string(), serde_json::json!("red"));

        let session = compiler().open(dir.path(), &globals).unwrap();
        assert_eq!(session.render("main.cssj").unwrap(), "body { color: red; }");
    }

    #[test]
    fn test_output_types_follow_processor_table() {
        assert_eq!(compiler().output_type("main.cssj"), OutputType::Css);
        assert_eq!(compiler().output_type("index.jinja"), OutputType::Html);
        assert!(compiler().is_source_extension("cssj"));
    }
}
