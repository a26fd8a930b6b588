//! Fenced code block renderer.

use mamd_renderer::{Node, NodeRenderer, RenderError, WalkStatus};

use crate::highlight;
use crate::style::Style;

/// Node renderer that syntax-highlights fenced code blocks.
///
/// Register it for [`NodeKind::FencedCodeBlock`](mamd_renderer::NodeKind)
/// at [`CodeHighlighter::PRIORITY`].
#[derive(Clone, Copy, Debug)]
pub struct CodeHighlighter {
    style: &'static Style,
}

impl CodeHighlighter {
    /// Registration priority, ahead of the built-in code block rendering.
    pub const PRIORITY: i32 = 500;

    /// Create a highlighter for the named style, falling back for unknown names.
    #[must_use]
    pub fn new(style: &str) -> Self {
        Self {
            style: Style::get_or_fallback(style),
        }
    }

    #[must_use]
    pub fn style(&self) -> &'static Style {
        self.style
    }
}

impl NodeRenderer for CodeHighlighter {
    fn enter(&mut self, node: &Node<'_, '_>, out: &mut String) -> Result<WalkStatus, RenderError> {
        let Some(block) = node.code_block() else {
            return Ok(WalkStatus::PassThrough);
        };
        let code = block.text();
        highlight(&code, block.language(), self.style, out)
            .map_err(|err| RenderError::node(node.kind(), err))?;
        Ok(WalkStatus::SkipChildren)
    }
}
