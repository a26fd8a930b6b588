//! Static site build driver for MaMD.
//!
//! Walks an input tree, converts every Markdown file through
//! [`mamd_renderer::MarkdownRenderer`] with fenced code blocks highlighted by
//! [`mamd_highlight::CodeHighlighter`], wraps the result in a [`PageTemplate`]
//! and writes it to the mirrored location under the output root.

mod builder;
mod scanner;
mod stylesheet;
mod task;
mod template;

pub use builder::{
    BuildConfig, BuildError, BuildReport, BuiltPage, PageError, PageFailure, PageStage,
    SiteBuilder,
};
pub use scanner::scan_sources;
pub use stylesheet::{StylesheetCopy, copy_stylesheet};
pub use task::FileTask;
pub use template::{PageTemplate, TemplateError};
