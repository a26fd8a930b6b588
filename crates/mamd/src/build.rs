//! Site build command.

use std::path::PathBuf;

use clap::Args;
use mamd_config::{CliSettings, Config};
use mamd_site::{BuildConfig, BuildReport, BuiltPage, PageTemplate, SiteBuilder};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for building a site.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Directory containing Markdown sources.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory to write the site into.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Path to configuration file (default: auto-discover mamd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page template (overrides config).
    #[arg(long)]
    template: Option<PathBuf>,

    /// Stylesheet copied into the output directory (overrides config).
    #[arg(long)]
    stylesheet: Option<PathBuf>,

    /// Syntax highlighting style (overrides config).
    #[arg(long, env = "MAMD_STYLE")]
    style: Option<String>,

    /// Log every built page.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or template loading fails, the build
    /// aborts, or any page fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            template: self.template,
            stylesheet: self.stylesheet,
            style: self.style,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let template = PageTemplate::load(&config.site_resolved.template)?;
        let builder = SiteBuilder::new(
            build_config(self.input, self.output, config),
            template,
        );

        let report = builder.build_with_progress(|page| output.info(&progress_line(page)))?;
        summarize(&report, output)
    }
}

fn build_config(input: PathBuf, output: PathBuf, config: Config) -> BuildConfig {
    BuildConfig {
        input_dir: input,
        output_dir: output,
        stylesheet: Some(config.site_resolved.stylesheet),
        extension: config.site_resolved.extension,
        gfm: config.markdown.gfm,
        rewrite_links: config.markdown.rewrite_links,
        style: config.highlight.style,
    }
}

fn progress_line(page: &BuiltPage) -> String {
    format!(
        "  {} ({} bytes, depth {}) -> {}",
        page.source.display(),
        page.size,
        page.depth,
        page.output.display()
    )
}

fn summarize(report: &BuildReport, output: &Output) -> Result<(), CliError> {
    let total = report.pages.len() + report.failures.len();
    if report.is_success() {
        output.success(&format!("Built {total} pages"));
        return Ok(());
    }

    output.info(&format!("Built {} of {total} pages", report.pages.len()));
    for failure in &report.failures {
        output.warning(&format!(
            "  {} ({}): {}",
            failure.source.display(),
            failure.error.stage(),
            failure.error
        ));
    }
    Err(CliError::PagesFailed(report.failures.len(), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_build_config_from_config() {
        let config = Config::default();
        let build = build_config(PathBuf::from("docs"), PathBuf::from("site"), config);
        assert_eq!(build.input_dir, PathBuf::from("docs"));
        assert_eq!(build.output_dir, PathBuf::from("site"));
        assert_eq!(build.stylesheet.as_deref(), Some(Path::new("./mamd.css")));
        assert_eq!(build.extension, "md");
        assert!(build.gfm);
        assert_eq!(build.style, "monokailight");
    }

    #[test]
    fn test_progress_line() {
        let page = BuiltPage {
            source: PathBuf::from("docs/guide.md"),
            output: PathBuf::from("site/guide.html"),
            size: 42,
            depth: 1,
        };
        assert_eq!(
            progress_line(&page),
            "  docs/guide.md (42 bytes, depth 1) -> site/guide.html"
        );
    }

    #[test]
    fn test_end_to_end_with_config_file() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("docs");
        let out = root.path().join("site");
        std::fs::create_dir_all(input.join("guide")).unwrap();
        std::fs::write(input.join("guide/setup.md"), "# Setup\n").unwrap();
        std::fs::write(
            root.path().join("page.html"),
            "<title>{{ title }}</title>{{ content }}",
        )
        .unwrap();
        std::fs::write(root.path().join("site.css"), "body {}").unwrap();
        let config_path = root.path().join("mamd.toml");
        std::fs::write(
            &config_path,
            "[site]\ntemplate = \"page.html\"\nstylesheet = \"site.css\"\n",
        )
        .unwrap();

        let args = BuildArgs {
            input: input.clone(),
            output: out.clone(),
            config: Some(config_path),
            template: None,
            stylesheet: None,
            style: None,
            verbose: false,
        };
        args.execute(&Output::new()).unwrap();

        assert_eq!(
            std::fs::read_to_string(out.join("guide/setup.html")).unwrap(),
            "<title>setup</title><h1 id=\"setup\">Setup</h1>\n"
        );
        assert!(out.join("site.css").exists());
    }

    #[test]
    fn test_failed_pages_are_an_error() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("bad.md"), [0xff, 0xfe]).unwrap();
        std::fs::write(root.path().join("page.html"), "{{ content }}").unwrap();
        std::fs::write(root.path().join("mamd.css"), "").unwrap();
        let config_path = root.path().join("mamd.toml");
        std::fs::write(&config_path, "[site]\ntemplate = \"page.html\"\n").unwrap();

        let args = BuildArgs {
            input: root.path().to_path_buf(),
            output: root.path().join("out"),
            config: Some(config_path),
            template: None,
            stylesheet: None,
            style: None,
            verbose: false,
        };
        let err = args.execute(&Output::new()).unwrap_err();
        assert!(matches!(err, CliError::PagesFailed(1, 1)));
    }
}
