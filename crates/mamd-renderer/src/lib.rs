//! Markdown to XHTML renderer with pluggable block renderers.
//!
//! This crate provides a generic [`MarkdownRenderer`] that walks a parsed
//! [`Document`] and produces an HTML fragment through the [`RenderBackend`]
//! trait.
//!
//! # Architecture
//!
//! - [`Document`]: the parsed event sequence of one Markdown source, with byte
//!   ranges into the source buffer. Immutable once parsed.
//! - [`NodeRenderer`]: extension point for block nodes. Renderers are
//!   registered per [`NodeKind`] with a priority and run before (or instead
//!   of) the built-in rendering of that node.
//! - [`HtmlBackend`]: XHTML output for format-specific elements (code blocks,
//!   images, breaks, rules).
//!
//! Shared functionality (tables, lists, inline formatting, heading ids) is
//! handled by the generic renderer.
//!
//! # Example
//!
//! ```
//! use mamd_renderer::{HtmlBackend, MarkdownRenderer};
//!
//! let result = MarkdownRenderer::<HtmlBackend>::new()
//!     .render_markdown("# Hello\n\n**Bold** text")
//!     .unwrap();
//! assert!(result.html.contains(r#"<h1 id="hello">Hello</h1>"#));
//! ```

mod autolink;
mod backend;
mod document;
mod error;
mod html;
mod registry;
mod renderer;
mod state;

pub use backend::RenderBackend;
pub use document::{CodeBlock, Document, Node, NodeKind};
pub use error::RenderError;
pub use html::HtmlBackend;
pub use registry::{NodeRenderer, WalkStatus};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{escape_html, slugify};
