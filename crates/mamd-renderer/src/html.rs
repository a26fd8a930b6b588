//! XHTML backend for markdown rendering.

use std::borrow::Cow;
use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::state::escape_html;

/// XHTML render backend.
///
/// Produces:
/// - `<pre><code>` for code blocks not claimed by a node renderer
/// - `<blockquote>` for blockquotes
/// - self-closing `<img .../>` for images
/// - optional `.md` to `.html` link rewriting
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            write!(
                out,
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(out, "<pre><code>{}</code></pre>\n", escape_html(content)).unwrap();
        }
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>\n");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>\n");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}" alt="{}"{title_attr}/>"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }

    fn transform_link(url: &str, rewrite_md: bool) -> Cow<'_, str> {
        if rewrite_md {
            rewrite_md_link(url)
        } else {
            Cow::Borrowed(url)
        }
    }
}

/// Rewrite a relative link to a markdown file into a link to its built page.
///
/// - `guide.md` → `guide.html`
/// - `../api/index.md#auth` → `../api/index.html#auth`
///
/// External links, fragment-only links, and non-markdown links are returned unchanged.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
fn rewrite_md_link(url: &str) -> Cow<'_, str> {
    if url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.starts_with('#')
    {
        return Cow::Borrowed(url);
    }

    let (path_part, fragment) = match url.find('#') {
        Some(hash_pos) => (&url[..hash_pos], &url[hash_pos..]),
        None => (url, ""),
    };

    match path_part.strip_suffix(".md") {
        Some(stem) if !stem.is_empty() && !stem.ends_with('/') => {
            Cow::Owned(format!("{stem}.html{fragment}"))
        }
        _ => Cow::Borrowed(url),
    }
}
