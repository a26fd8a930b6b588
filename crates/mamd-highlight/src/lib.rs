//! Syntax highlighting for fenced code blocks.
//!
//! [`highlight`] selects a [`Grammar`] by language tag (or by sniffing the
//! content), tokenizes the code into a lazy [`TokenStream`], and writes the
//! tokens as a `<pre><code>` block with inline styles from a named [`Style`].
//!
//! [`CodeHighlighter`] plugs this into [`mamd_renderer::MarkdownRenderer`] as
//! a node renderer for fenced code blocks.
//!
//! # Example
//!
//! ```
//! use mamd_highlight::{Style, highlight};
//!
//! let mut out = String::new();
//! highlight("let x = 1;\n", Some("rust"), Style::get_or_fallback("github"), &mut out).unwrap();
//! assert!(out.starts_with("<pre style="));
//! ```

mod category;
mod format;
mod grammar;
mod hook;
mod style;
mod tokens;

pub use category::TokenCategory;
pub use format::{HighlightError, format_html};
pub use grammar::Grammar;
pub use hook::CodeHighlighter;
pub use style::{Attrs, DEFAULT_STYLE, FALLBACK, Style};
pub use tokens::{Token, TokenStream};

/// Highlight `source` and write the HTML fragment into `out`.
///
/// # Errors
///
/// Returns [`HighlightError`] if writing fails or the token stream does not
/// cover the whole input.
pub fn highlight<W: std::fmt::Write>(
    source: &str,
    language: Option<&str>,
    style: &Style,
    out: &mut W,
) -> Result<(), HighlightError> {
    let grammar = Grammar::select(source, language);
    format_html(grammar.tokenize(source), style, source.len(), out)
}
