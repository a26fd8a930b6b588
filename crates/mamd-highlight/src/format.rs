//! HTML formatter with inline styles.

use std::fmt::Write;

use mamd_renderer::escape_html;

use crate::style::Style;
use crate::tokens::Token;

/// Error returned when a code block cannot be highlighted.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// Writing to the output failed.
    #[error("failed to write highlighted code")]
    Format(#[from] std::fmt::Error),

    /// The token stream did not cover the input.
    #[error("token stream covered {emitted} of {expected} bytes")]
    Incomplete {
        /// Input length in bytes.
        expected: usize,
        /// Bytes covered by emitted tokens.
        emitted: usize,
    },
}

const LINE_OPEN: &str = r#"<span style="display:flex;">"#;

/// Write `tokens` as a `<pre><code>` block, one line wrapper per source line.
///
/// Each styled token becomes a `<span style="...">`; tokens without style
/// attributes are written as escaped text.
///
/// # Errors
///
/// Returns [`HighlightError::Format`] if writing fails and
/// [`HighlightError::Incomplete`] if the tokens do not cover `expected_len`
/// bytes.
pub fn format_html<'a, W: Write>(
    tokens: impl IntoIterator<Item = Token<'a>>,
    style: &Style,
    expected_len: usize,
    out: &mut W,
) -> Result<(), HighlightError> {
    write!(out, r#"<pre style="{}"><code>"#, style.container_css())?;

    let mut emitted = 0;
    let mut line_open = false;
    for token in tokens {
        emitted += token.text.len();
        let css = style
            .lookup(token.category)
            .map(|attrs| attrs.css())
            .filter(|css| !css.is_empty());

        for piece in token.text.split_inclusive('\n') {
            if !line_open {
                out.write_str(LINE_OPEN)?;
                line_open = true;
            }
            match &css {
                Some(css) => write!(out, r#"<span style="{css}">{}</span>"#, escape_html(piece))?,
                None => out.write_str(&escape_html(piece))?,
            }
            if piece.ends_with('\n') {
                out.write_str("</span>")?;
                line_open = false;
            }
        }
    }
    if line_open {
        out.write_str("</span>")?;
    }

    if emitted != expected_len {
        return Err(HighlightError::Incomplete {
            expected: expected_len,
            emitted,
        });
    }

    out.write_str("</code></pre>\n")?;
    Ok(())
}
