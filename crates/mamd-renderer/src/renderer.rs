//! Generic markdown renderer with pluggable backend.

use std::fmt::Write;
use std::marker::PhantomData;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Tag, TagEnd};

use crate::autolink::push_linkified;
use crate::backend::RenderBackend;
use crate::document::{Document, NodeKind};
use crate::error::RenderError;
use crate::registry::{NodeRenderer, NodeRenderers, WalkStatus};
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, escape_html};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered XHTML fragment.
    pub html: String,
}

/// Generic markdown renderer with pluggable backend.
///
/// Uses the [`RenderBackend`] trait to delegate format-specific rendering
/// while handling common elements (tables, lists, inline formatting, heading
/// ids) generically.
///
/// # Node renderers
///
/// Block nodes can be rendered by [`NodeRenderer`]s registered with
/// [`with_node_renderer`](Self::with_node_renderer). They are consulted in
/// ascending priority before the built-in rendering.
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    /// Consecutive text awaiting linkification.
    pending_text: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    link_depth: usize,
    gfm: bool,
    rewrite_links: bool,
    renderers: NodeRenderers,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a new renderer with GFM enabled and link rewriting disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            pending_text: String::new(),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            link_depth: 0,
            gfm: true,
            rewrite_links: false,
            renderers: NodeRenderers::default(),
            _backend: PhantomData,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Bare URL autolinks (`https://…`, `www.…`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Rewrite relative links to `*.md` files into links to `*.html` pages.
    #[must_use]
    pub fn with_link_rewrite(mut self, enabled: bool) -> Self {
        self.rewrite_links = enabled;
        self
    }

    /// Register a renderer for block nodes of `kind`.
    ///
    /// Lower `priority` values are consulted first; equal priorities keep
    /// registration order. The built-in rendering runs last.
    #[must_use]
    pub fn with_node_renderer<R: NodeRenderer + 'static>(
        mut self,
        kind: NodeKind,
        priority: i32,
        renderer: R,
    ) -> Self {
        self.renderers.register(kind, priority, Box::new(renderer));
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Parse and render markdown text using the configured parser options.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a registered node renderer fails.
    pub fn render_markdown(&mut self, markdown: &str) -> Result<RenderResult, RenderError> {
        let document = Document::parse(markdown, self.parser_options());
        self.render(&document)
    }

    /// Render a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a registered node renderer fails. Rendering
    /// of the document stops at the first failure.
    pub fn render(&mut self, document: &Document<'_>) -> Result<RenderResult, RenderError> {
        self.reset();

        let events = document.events();
        // (start, end, slot) of nodes entered with `WalkStatus::Continue`.
        let mut open: Vec<(usize, usize, usize)> = Vec::new();
        let mut index = 0;

        while index < events.len() {
            if let Some(&(start, end, slot)) = open.last()
                && end == index
            {
                open.pop();
                self.flush_text();
                if let Some(node) = document.node_at(start) {
                    self.renderers.leave(slot, &node, &mut self.output)?;
                }
                index += 1;
                continue;
            }

            if !self.renderers.is_empty()
                && let Some(node) = document.node_at(index)
            {
                self.flush_text();
                match self.renderers.enter(&node, &mut self.output)? {
                    Some((slot, WalkStatus::SkipChildren)) => {
                        self.renderers.leave(slot, &node, &mut self.output)?;
                        index = node.end() + 1;
                        continue;
                    }
                    Some((slot, WalkStatus::Continue)) => {
                        open.push((index, node.end(), slot));
                        index += 1;
                        continue;
                    }
                    Some((_, WalkStatus::PassThrough)) | None => {}
                }
            }

            self.process_event(&events[index].0);
            index += 1;
        }

        self.flush_text();
        Ok(RenderResult {
            html: std::mem::take(&mut self.output),
        })
    }

    fn reset(&mut self) {
        self.output.clear();
        self.pending_text.clear();
        self.code = CodeBlockState::default();
        self.table = TableState::default();
        self.image = ImageState::default();
        self.heading = HeadingState::default();
        self.link_depth = 0;
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.flush_text();
            self.output.push_str(content);
        }
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        push_linkified(&self.pending_text, &mut self.output);
        self.pending_text.clear();
    }

    fn process_event(&mut self, event: &Event<'_>) {
        if !matches!(event, Event::Text(_)) {
            self.flush_text();
        }
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(*tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.inline_code(code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => B::task_list_marker(*checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled
            }
        }
    }

    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known.
                self.heading.start_heading(*level);
            }
            Tag::BlockQuote(_) => B::blockquote_start(&mut self.output),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>\n"),
                Some(n) => writeln!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>\n"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>\n"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments.clone());
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>\n");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let cell = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{cell}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = if *link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    B::transform_link(dest_url, self.rewrite_links).into_owned()
                };
                let mut link = format!(r#"<a href="{}""#, escape_html(&href));
                if !title.is_empty() {
                    write!(link, r#" title="{}""#, escape_html(title)).unwrap();
                }
                link.push('>');
                self.push_inline(&link);
                self.link_depth += 1;
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the matching end tag.
                self.image.start(dest_url.to_string(), title.to_string());
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    writeln!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => B::blockquote_end(&mut self.output),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                B::code_block(lang.as_deref(), &content, &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>\n"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>\n"),
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.output.push_str("</tr>\n</thead>\n<tbody>\n");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>\n"
                } else {
                    "</td>\n"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.push_inline("</a>");
            }
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.end() {
                    let mut image = String::new();
                    B::image(&src, &alt, &title, &mut image);
                    self.push_inline(&image);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else if self.gfm && self.link_depth == 0 {
            self.pending_text.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
        } else if self.heading.is_active() {
            self.heading.push_text(code);
            self.heading
                .push_html(&format!("<code>{}</code>", escape_html(code)));
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn raw_html(&mut self, html: &str) {
        if self.heading.is_active() {
            self.heading.push_html(html);
        } else if !self.image.is_active() {
            self.output.push_str(html);
        }
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }

    fn hard_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            let mut html = String::new();
            B::hard_break(&mut html);
            self.heading.push_html(&html);
        } else {
            B::hard_break(&mut self.output);
        }
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HtmlBackend;
    use crate::document::Node;
    use pretty_assertions::assert_eq;

    fn render_html(markdown: &str) -> String {
        MarkdownRenderer::<HtmlBackend>::new()
            .render_markdown(markdown)
            .unwrap()
            .html
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render_html("Hello, world!"), "<p>Hello, world!</p>\n");
    }

    #[test]
    fn test_heading_with_id() {
        assert_eq!(
            render_html("## Section Title"),
            "<h2 id=\"section-title\">Section Title</h2>\n"
        );
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let html = render_html("## Intro\n\n## Intro\n\n## Intro");
        assert_eq!(
            html,
            "<h2 id=\"intro\">Intro</h2>\n<h2 id=\"intro-1\">Intro</h2>\n<h2 id=\"intro-2\">Intro</h2>\n"
        );
    }

    #[test]
    fn test_heading_ids_reset_between_documents() {
        let mut renderer = MarkdownRenderer::<HtmlBackend>::new();
        let first = renderer.render_markdown("# Intro").unwrap();
        let second = renderer.render_markdown("# Intro").unwrap();
        assert_eq!(first.html, second.html);
    }

    #[test]
    fn test_heading_with_inline_code() {
        assert_eq!(
            render_html("## Install `npm`"),
            "<h2 id=\"install-npm\">Install <code>npm</code></h2>\n"
        );
    }

    #[test]
    fn test_heading_without_slug_text() {
        assert_eq!(render_html("# ???"), "<h1 id=\"heading\">???</h1>\n");
    }

    #[test]
    fn test_code_block_without_renderers() {
        assert_eq!(
            render_html("```rust\nfn main() {}\n```"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_raw_html_passthrough() {
        let html = render_html("<div class=\"note\">\n<b>raw</b>\n</div>\n\nText with <kbd>Ctrl</kbd>.");
        assert!(html.contains("<div class=\"note\">\n<b>raw</b>\n</div>\n"));
        assert!(html.contains("<kbd>Ctrl</kbd>"));
    }

    #[test]
    fn test_xhtml_void_elements() {
        let html = render_html("line  \nbreak\n\n---\n\n![alt](a.png)");
        assert!(html.contains("line<br/>\nbreak"));
        assert!(html.contains("<hr/>"));
        assert!(html.contains(r#"<img src="a.png" alt="alt"/>"#));
        assert!(!html.contains("<br>"));
        assert!(!html.contains("<hr>"));
    }

    #[test]
    fn test_task_list() {
        let html = render_html("- [x] done\n- [ ] todo");
        assert!(html.contains(r#"<input type="checkbox" checked="" disabled=""/> done"#));
        assert!(html.contains(r#"<input type="checkbox" disabled=""/> todo"#));
    }

    #[test]
    fn test_table() {
        let html = render_html("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains(r#"<th style="text-align:left">A</th>"#));
        assert!(html.contains(r#"<td style="text-align:right">2</td>"#));
        assert!(html.contains("</tbody>\n</table>"));
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(render_html("~~deleted~~"), "<p><del>deleted</del></p>\n");
    }

    #[test]
    fn test_gfm_disabled() {
        let html = MarkdownRenderer::<HtmlBackend>::new()
            .with_gfm(false)
            .render_markdown("~~kept~~ https://example.com")
            .unwrap()
            .html;
        assert_eq!(html, "<p>~~kept~~ https://example.com</p>\n");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            render_html("- Item 1\n- Item 2"),
            "<ul>\n<li>Item 1</li>\n<li>Item 2</li>\n</ul>\n"
        );
        assert!(render_html("3. Third").contains(r#"<ol start="3">"#));
    }

    #[test]
    fn test_bare_url_autolink() {
        assert_eq!(
            render_html("See https://example.com/page."),
            "<p>See <a href=\"https://example.com/page\">https://example.com/page</a>.</p>\n"
        );
    }

    #[test]
    fn test_no_autolink_inside_links_or_code() {
        let html = render_html("[https://a.com](https://b.com) `https://c.com`");
        assert_eq!(
            html,
            "<p><a href=\"https://b.com\">https://a.com</a> <code>https://c.com</code></p>\n"
        );
    }

    #[test]
    fn test_angle_autolinks() {
        let html = render_html("<https://example.com> <me@example.com>");
        assert!(html.contains(r#"<a href="https://example.com">https://example.com</a>"#));
        assert!(html.contains(r#"<a href="mailto:me@example.com">me@example.com</a>"#));
    }

    #[test]
    fn test_link_title() {
        assert_eq!(
            render_html(r#"[x](a.html "Tip")"#),
            "<p><a href=\"a.html\" title=\"Tip\">x</a></p>\n"
        );
    }

    #[test]
    fn test_link_rewrite() {
        let html = MarkdownRenderer::<HtmlBackend>::new()
            .with_link_rewrite(true)
            .render_markdown("[Guide](docs/guide.md#setup) [Site](https://x.com/a.md)")
            .unwrap()
            .html;
        assert!(html.contains(r#"href="docs/guide.html#setup""#));
        assert!(html.contains(r#"href="https://x.com/a.md""#));
    }

    #[test]
    fn test_link_rewrite_disabled_by_default() {
        assert!(render_html("[Guide](guide.md)").contains(r#"href="guide.md""#));
    }

    #[test]
    fn test_image_alt_is_plain_text() {
        assert_eq!(
            render_html("![an *emphasized* `alt`](a.png \"T\")"),
            "<p><img src=\"a.png\" alt=\"an emphasized alt\" title=\"T\"/></p>\n"
        );
    }

    struct Boxed;

    impl NodeRenderer for Boxed {
        fn enter(&mut self, _node: &Node<'_, '_>, out: &mut String) -> Result<WalkStatus, RenderError> {
            out.push_str("<section>");
            Ok(WalkStatus::Continue)
        }

        fn leave(&mut self, _node: &Node<'_, '_>, out: &mut String) -> Result<(), RenderError> {
            out.push_str("</section>\n");
            Ok(())
        }
    }

    struct Failing;

    impl NodeRenderer for Failing {
        fn enter(&mut self, node: &Node<'_, '_>, _out: &mut String) -> Result<WalkStatus, RenderError> {
            Err(RenderError::node(node.kind(), "boom"))
        }
    }

    struct Declining;

    impl NodeRenderer for Declining {
        fn enter(&mut self, _node: &Node<'_, '_>, _out: &mut String) -> Result<WalkStatus, RenderError> {
            Ok(WalkStatus::PassThrough)
        }
    }

    #[test]
    fn test_continue_renders_children() {
        let html = MarkdownRenderer::<HtmlBackend>::new()
            .with_node_renderer(NodeKind::BlockQuote, 10, Boxed)
            .render_markdown("> quoted *text*\n\nafter")
            .unwrap()
            .html;
        assert_eq!(
            html,
            "<section><p>quoted <em>text</em></p>\n</section>\n<p>after</p>\n"
        );
    }

    #[test]
    fn test_pass_through_falls_back_to_builtin() {
        let html = MarkdownRenderer::<HtmlBackend>::new()
            .with_node_renderer(NodeKind::FencedCodeBlock, 10, Declining)
            .render_markdown("```\ncode\n```")
            .unwrap()
            .html;
        assert_eq!(html, "<pre><code>code\n</code></pre>\n");
    }

    #[test]
    fn test_node_renderer_error_aborts() {
        let err = MarkdownRenderer::<HtmlBackend>::new()
            .with_node_renderer(NodeKind::FencedCodeBlock, 10, Failing)
            .render_markdown("# Title\n\n```go\nx\n```")
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to render fenced code block: boom");
    }

    #[test]
    fn test_indented_code_not_offered_to_fenced_renderers() {
        let html = MarkdownRenderer::<HtmlBackend>::new()
            .with_node_renderer(NodeKind::FencedCodeBlock, 10, Failing)
            .render_markdown("    indented\n")
            .unwrap()
            .html;
        assert_eq!(html, "<pre><code>indented\n</code></pre>\n");
    }
}
