//! Page template.

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, Value, context};

/// Error returned when the page template cannot be loaded or rendered.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template source does not parse.
    #[error("invalid page template: {0}")]
    Syntax(#[source] minijinja::Error),

    /// Rendering a page failed.
    #[error("failed to render page template: {0}")]
    Render(#[source] minijinja::Error),
}

/// Page layout with `content`, `title` and `css_offset` placeholders.
///
/// Loaded once and reused for every page. `title` is HTML-escaped on
/// output; `content` and `css_offset` are inserted as is.
pub struct PageTemplate {
    env: Environment<'static>,
}

const PAGE: &str = "page.html";

impl PageTemplate {
    /// Load the template from a file.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Read`] if the file cannot be read and
    /// [`TemplateError::Syntax`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source)
    }

    /// Build the template from source text.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the source does not parse.
    pub fn from_source(source: impl Into<String>) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template_owned(PAGE, source.into())
            .map_err(TemplateError::Syntax)?;
        Ok(Self { env })
    }

    /// Render one page.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if evaluation fails.
    pub fn render(
        &self,
        content: &str,
        title: &str,
        css_offset: &str,
    ) -> Result<String, TemplateError> {
        let ctx = context! {
            content => Value::from_safe_string(content.to_owned()),
            title => title,
            css_offset => Value::from_safe_string(css_offset.to_owned()),
        };
        self.env
            .get_template(PAGE)
            .and_then(|template| template.render(ctx))
            .map_err(TemplateError::Render)
    }
}

impl std::fmt::Debug for PageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTemplate").finish_non_exhaustive()
    }
}
