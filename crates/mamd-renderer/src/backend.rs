//! Render backend trait for format-specific rendering.
//!
//! The generic renderer handles document structure; the backend decides how
//! the format-specific leaves are spelled.

use std::borrow::Cow;

/// Backend trait for format-specific rendering operations.
///
/// Implementations provide format-specific rendering for:
/// - Code blocks that no registered [`NodeRenderer`](crate::NodeRenderer) claimed
/// - Blockquotes
/// - Images
/// - Link transformation
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "python")
    /// * `content` - The code content
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String);

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String);

    /// Render an image.
    ///
    /// # Arguments
    ///
    /// * `src` - Image source URL
    /// * `alt` - Alt text for the image
    /// * `title` - Optional title attribute
    /// * `out` - Output buffer to write to
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Transform a link URL.
    ///
    /// Default implementation returns the URL unchanged.
    /// [`HtmlBackend`](crate::HtmlBackend) rewrites relative `.md` links when
    /// `rewrite_md` is set.
    #[must_use]
    fn transform_link(url: &str, _rewrite_md: bool) -> Cow<'_, str> {
        Cow::Borrowed(url)
    }

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br/>\n");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr/>\n");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked="" disabled=""/> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled=""/> "#);
        }
    }
}
