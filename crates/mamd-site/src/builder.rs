//! Site build driver.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use mamd_highlight::CodeHighlighter;
use mamd_renderer::{HtmlBackend, MarkdownRenderer, NodeKind, RenderError};

use crate::scanner::scan_sources;
use crate::stylesheet::copy_stylesheet;
use crate::task::FileTask;
use crate::template::{PageTemplate, TemplateError};

/// Configuration for a site build.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Root of the Markdown source tree.
    pub input_dir: PathBuf,
    /// Root of the generated site.
    pub output_dir: PathBuf,
    /// Stylesheet copied into `output_dir`, if any.
    pub stylesheet: Option<PathBuf>,
    /// Source file extension, without the dot.
    pub extension: String,
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Rewrite relative `.md` links to `.html`.
    pub rewrite_links: bool,
    /// Highlight style name.
    pub style: String,
}

impl BuildConfig {
    /// Default settings for building `input_dir` into `output_dir`.
    #[must_use]
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            stylesheet: None,
            extension: "md".to_owned(),
            gfm: true,
            rewrite_links: false,
            style: mamd_highlight::DEFAULT_STYLE.to_owned(),
        }
    }
}

/// Fatal error that stops the build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy stylesheet {}: {source}", path.display())]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stage at which a page failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageStage {
    Read,
    Convert,
    Template,
    CreateDir,
    Write,
}

impl fmt::Display for PageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Convert => "convert",
            Self::Template => "template",
            Self::CreateDir => "create directory",
            Self::Write => "write",
        })
    }
}

/// Error for a single page. Other pages are still built.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("failed to read source: {0}")]
    Read(#[source] std::io::Error),

    #[error(transparent)]
    Convert(#[from] RenderError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to create output directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("failed to write page: {0}")]
    Write(#[source] std::io::Error),
}

impl PageError {
    /// Stage the page failed at.
    #[must_use]
    pub fn stage(&self) -> PageStage {
        match self {
            Self::Read(_) => PageStage::Read,
            Self::Convert(_) => PageStage::Convert,
            Self::Template(_) => PageStage::Template,
            Self::CreateDir(_) => PageStage::CreateDir,
            Self::Write(_) => PageStage::Write,
        }
    }
}

/// A page that could not be built.
#[derive(Debug)]
pub struct PageFailure {
    pub source: PathBuf,
    pub error: PageError,
}

/// A page written by the build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltPage {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Source size in bytes.
    pub size: usize,
    pub depth: usize,
}

/// Result of a completed build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages written, in traversal order.
    pub pages: Vec<PathBuf>,
    /// Pages that failed, in traversal order.
    pub failures: Vec<PageFailure>,
}

impl BuildReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds a static site from a Markdown tree.
#[derive(Debug)]
pub struct SiteBuilder {
    config: BuildConfig,
    template: PageTemplate,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(config: BuildConfig, template: PageTemplate) -> Self {
        Self { config, template }
    }

    /// Build every page under the input directory.
    ///
    /// Per-page failures are collected in the report; only problems with the
    /// input root, output root, stylesheet, or traversal abort the build.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on a fatal error.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        self.build_with_progress(|_| {})
    }

    /// Like [`build`](Self::build), calling `on_page` after each page is written.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on a fatal error.
    pub fn build_with_progress(
        &self,
        mut on_page: impl FnMut(&BuiltPage),
    ) -> Result<BuildReport, BuildError> {
        let input = &self.config.input_dir;
        let output = &self.config.output_dir;
        if !input.is_dir() {
            return Err(BuildError::InputNotFound(input.clone()));
        }

        fs::create_dir_all(output).map_err(|source| BuildError::OutputDir {
            path: output.clone(),
            source,
        })?;

        if let Some(stylesheet) = &self.config.stylesheet {
            copy_stylesheet(stylesheet, output).map_err(|source| BuildError::Stylesheet {
                path: stylesheet.clone(),
                source,
            })?;
        }

        let sources =
            scan_sources(input, &self.config.extension).map_err(|source| BuildError::Scan {
                path: input.clone(),
                source,
            })?;

        let mut renderer = self.renderer();
        let mut report = BuildReport::default();
        for source in sources {
            let Some(task) = FileTask::new(input, output, &source) else {
                tracing::warn!(path = %source.display(), "Skipping source outside the input root");
                continue;
            };
            match self.build_page(&mut renderer, &task) {
                Ok(page) => {
                    on_page(&page);
                    report.pages.push(page.output);
                }
                Err(error) => {
                    tracing::warn!(
                        path = %source.display(),
                        stage = %error.stage(),
                        %error,
                        "Page failed"
                    );
                    report.failures.push(PageFailure { source, error });
                }
            }
        }

        tracing::info!(
            pages = report.pages.len(),
            failures = report.failures.len(),
            "Build finished"
        );
        Ok(report)
    }

    fn renderer(&self) -> MarkdownRenderer<HtmlBackend> {
        MarkdownRenderer::new()
            .with_gfm(self.config.gfm)
            .with_link_rewrite(self.config.rewrite_links)
            .with_node_renderer(
                NodeKind::FencedCodeBlock,
                CodeHighlighter::PRIORITY,
                CodeHighlighter::new(&self.config.style),
            )
    }

    fn build_page(
        &self,
        renderer: &mut MarkdownRenderer<HtmlBackend>,
        task: &FileTask,
    ) -> Result<BuiltPage, PageError> {
        let markdown = fs::read_to_string(&task.source).map_err(PageError::Read)?;
        tracing::info!(
            path = %task.source.display(),
            size = markdown.len(),
            depth = task.depth,
            out_dir = %task.out_dir.display(),
            "Building page"
        );

        let content = renderer.render_markdown(&markdown)?.html;
        let page = self
            .template
            .render(&content, &task.title, &task.css_offset)?;

        fs::create_dir_all(&task.out_dir).map_err(PageError::CreateDir)?;
        let output = task.output_path();
        fs::write(&output, page).map_err(PageError::Write)?;
        Ok(BuiltPage {
            source: task.source.clone(),
            output,
            size: markdown.len(),
            depth: task.depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mamd_renderer::{Node, NodeRenderer, WalkStatus};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const LAYOUT: &str = concat!(
        "<html><head><title>{{ title }}</title>",
        r#"<link rel="stylesheet" href="{{ css_offset }}mamd.css"/></head>"#,
        "<body>{{ content }}</body></html>"
    );

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn builder(input: &Path, output: &Path) -> SiteBuilder {
        SiteBuilder::new(
            BuildConfig::new(input, output),
            PageTemplate::from_source(LAYOUT).unwrap(),
        )
    }

    fn read(path: impl AsRef<Path>) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_index_with_go_block() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(
            input.path(),
            "index.md",
            "# Hi\n\n```go\npackage main\n\nfunc main() {}\n```\n",
        );

        let report = builder(input.path(), output.path()).build().unwrap();
        assert!(report.is_success());
        assert_eq!(report.pages, [output.path().join("index.html")]);

        let html = read(output.path().join("index.html"));
        assert!(html.starts_with("<html><head><title>index</title>"));
        assert!(html.contains(r#"href="mamd.css""#));
        assert!(html.contains(r#"<body><h1 id="hi">Hi</h1>"#));
        assert!(html.contains(r#"<span style="display:flex;">"#));
        assert!(html.matches(r#"<span style="color:"#).count() >= 2);
    }

    #[test]
    fn test_one_line_go_block() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "index.md", "# Hi\n\n```go\nfunc f(){}\n```\n");

        builder(input.path(), output.path()).build().unwrap();
        let html = read(output.path().join("index.html"));
        assert!(html.contains(r#"<h1 id="hi">Hi</h1>"#));
        assert!(html.matches(r#"<span style="color:"#).count() >= 2);
        assert!(!html.contains("language-go"));
    }

    #[test]
    fn test_unannotated_python_block() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "py.md", "```\ndef f():\n    return 1\n```\n");

        builder(input.path(), output.path()).build().unwrap();
        let html = read(output.path().join("py.html"));
        assert!(html.matches(r#"<span style="color:"#).count() >= 3);
    }

    #[test]
    fn test_progress_reports_each_page() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "index.md", "# Home\n");
        write(input.path(), "docs/guide.md", "Guide\n");

        let mut seen = Vec::new();
        let report = builder(input.path(), output.path())
            .build_with_progress(|page| seen.push(page.clone()))
            .unwrap();

        assert_eq!(
            seen,
            [
                BuiltPage {
                    source: input.path().join("docs/guide.md"),
                    output: output.path().join("docs/guide.html"),
                    size: 6,
                    depth: 1,
                },
                BuiltPage {
                    source: input.path().join("index.md"),
                    output: output.path().join("index.html"),
                    size: 7,
                    depth: 0,
                },
            ]
        );
        assert_eq!(
            report.pages,
            seen.iter().map(|page| page.output.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_nested_page_gets_offset() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "docs/guide.md", "Guide\n");
        write(input.path(), "a/b/c/doc.md", "Deep\n");

        let report = builder(input.path(), output.path()).build().unwrap();
        assert_eq!(
            report.pages,
            [
                output.path().join("a/b/c/doc.html"),
                output.path().join("docs/guide.html"),
            ]
        );
        assert!(read(output.path().join("docs/guide.html")).contains(r#"href="../mamd.css""#));
        assert!(
            read(output.path().join("a/b/c/doc.html")).contains(r#"href="../../../mamd.css""#)
        );
    }

    #[test]
    fn test_non_markdown_files_are_ignored() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "page.md", "x\n");
        write(input.path(), "image.png", "x");
        write(input.path(), "notes.txt", "x");

        let report = builder(input.path(), output.path()).build().unwrap();
        assert_eq!(report.pages.len(), 1);
        assert!(!output.path().join("image.html").exists());
        assert!(!output.path().join("notes.html").exists());
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "index.md", "# Intro\n\n# Intro\n\n```python\nx = 1\n```\n");
        write(input.path(), "sub/page.md", "| a | b |\n|---|---|\n| 1 | 2 |\n");
        write(input.path(), "mamd.css", "body {}");

        let mut config = BuildConfig::new(input.path(), output.path());
        config.stylesheet = Some(input.path().join("mamd.css"));
        let builder = SiteBuilder::new(config, PageTemplate::from_source(LAYOUT).unwrap());

        let first = builder.build().unwrap();
        let snapshot: Vec<_> = first.pages.iter().map(read).collect();
        let second = builder.build().unwrap();
        assert_eq!(first.pages, second.pages);
        assert_eq!(second.pages.iter().map(read).collect::<Vec<_>>(), snapshot);
        assert_eq!(read(output.path().join("mamd.css")), "body {}");
        assert!(snapshot[0].contains(r#"<h1 id="intro-1">Intro</h1>"#));
    }

    #[test]
    fn test_failing_page_does_not_stop_siblings() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "a.md", "first\n");
        fs::write(input.path().join("b.md"), [0xff, 0xfe, 0x00]).unwrap();
        write(input.path(), "c.md", "third\n");

        let report = builder(input.path(), output.path()).build().unwrap();
        assert!(!report.is_success());
        assert_eq!(
            report.pages,
            [output.path().join("a.html"), output.path().join("c.html")]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, input.path().join("b.md"));
        assert_eq!(report.failures[0].error.stage(), PageStage::Read);
    }

    struct Failing;

    impl NodeRenderer for Failing {
        fn enter(&mut self, node: &Node<'_, '_>, _out: &mut String) -> Result<WalkStatus, RenderError> {
            Err(RenderError::node(node.kind(), "boom"))
        }
    }

    #[test]
    fn test_convert_failure_is_reported() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "q.md", "> quoted\n");
        let builder = builder(input.path(), output.path());

        let mut renderer = builder
            .renderer()
            .with_node_renderer(NodeKind::BlockQuote, 0, Failing);
        let task = FileTask::new(input.path(), output.path(), &input.path().join("q.md")).unwrap();
        let err = builder.build_page(&mut renderer, &task).unwrap_err();
        assert_eq!(err.stage(), PageStage::Convert);
        assert!(!task.output_path().exists());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = builder(&dir.path().join("absent"), dir.path())
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::InputNotFound(_)));
    }

    #[test]
    fn test_missing_stylesheet_is_fatal() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "index.md", "x\n");
        let mut config = BuildConfig::new(input.path(), output.path());
        config.stylesheet = Some(input.path().join("missing.css"));
        let builder = SiteBuilder::new(config, PageTemplate::from_source(LAYOUT).unwrap());

        let err = builder.build().unwrap_err();
        assert!(matches!(err, BuildError::Stylesheet { .. }));
        assert!(!output.path().join("index.html").exists());
    }

    #[test]
    fn test_unknown_language_passthrough() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "x.md", "```foobarlang\nhello <world>\n```\n");

        builder(input.path(), output.path()).build().unwrap();
        let html = read(output.path().join("x.html"));
        assert!(html.contains("hello &lt;world&gt;"));
        assert!(html.contains("</code></pre>"));
    }
}
