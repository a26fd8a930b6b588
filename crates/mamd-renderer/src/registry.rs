//! Node renderer registry.
//!
//! Node renderers are consulted per [`NodeKind`] before the built-in rendering
//! of a block node. Priorities only order renderers among themselves: lower
//! values run first, equal values keep their registration order, and the
//! built-in rendering runs only when every renderer passes.

use crate::document::{Node, NodeKind};
use crate::error::RenderError;

/// Directive returned by [`NodeRenderer::enter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Not handled. The next renderer (or the built-in rendering) is consulted.
    PassThrough,
    /// Opening output written. Children are rendered by the core, then
    /// [`NodeRenderer::leave`] is called.
    Continue,
    /// Complete output written. Children are skipped and
    /// [`NodeRenderer::leave`] is called immediately.
    SkipChildren,
}

/// Extension point for rendering block nodes.
///
/// # Example
///
/// ```
/// use mamd_renderer::{
///     HtmlBackend, MarkdownRenderer, Node, NodeKind, NodeRenderer, RenderError, WalkStatus,
/// };
///
/// struct Shout;
///
/// impl NodeRenderer for Shout {
///     fn enter(&mut self, node: &Node<'_, '_>, out: &mut String) -> Result<WalkStatus, RenderError> {
///         let Some(block) = node.code_block() else {
///             return Ok(WalkStatus::PassThrough);
///         };
///         out.push_str(&block.text().to_uppercase());
///         Ok(WalkStatus::SkipChildren)
///     }
/// }
///
/// let result = MarkdownRenderer::<HtmlBackend>::new()
///     .with_node_renderer(NodeKind::FencedCodeBlock, 100, Shout)
///     .render_markdown("```\nhi\n```\n")
///     .unwrap();
/// assert_eq!(result.html, "HI\n");
/// ```
pub trait NodeRenderer {
    /// Called when the walker enters a node of a registered kind.
    ///
    /// # Errors
    ///
    /// Any error aborts rendering of the whole document.
    fn enter(&mut self, node: &Node<'_, '_>, out: &mut String) -> Result<WalkStatus, RenderError>;

    /// Called when the walker leaves a node this renderer entered with
    /// [`WalkStatus::Continue`] or [`WalkStatus::SkipChildren`].
    ///
    /// # Errors
    ///
    /// Any error aborts rendering of the whole document.
    fn leave(&mut self, _node: &Node<'_, '_>, _out: &mut String) -> Result<(), RenderError> {
        Ok(())
    }
}

struct Entry {
    kind: NodeKind,
    priority: i32,
    renderer: Box<dyn NodeRenderer>,
}

/// Registered node renderers, ordered by ascending priority.
#[derive(Default)]
pub(crate) struct NodeRenderers {
    entries: Vec<Entry>,
}

impl NodeRenderers {
    pub(crate) fn register(&mut self, kind: NodeKind, priority: i32, renderer: Box<dyn NodeRenderer>) {
        let position = self
            .entries
            .partition_point(|entry| entry.priority <= priority);
        self.entries.insert(
            position,
            Entry {
                kind,
                priority,
                renderer,
            },
        );
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offer a node to the renderers registered for its kind.
    ///
    /// Returns the slot of the renderer that handled it along with its directive.
    pub(crate) fn enter(
        &mut self,
        node: &Node<'_, '_>,
        out: &mut String,
    ) -> Result<Option<(usize, WalkStatus)>, RenderError> {
        for (slot, entry) in self.entries.iter_mut().enumerate() {
            if entry.kind != node.kind() {
                continue;
            }
            match entry.renderer.enter(node, out)? {
                WalkStatus::PassThrough => {}
                status => return Ok(Some((slot, status))),
            }
        }
        Ok(None)
    }

    pub(crate) fn leave(
        &mut self,
        slot: usize,
        node: &Node<'_, '_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        match self.entries.get_mut(slot) {
            Some(entry) => entry.renderer.leave(node, out),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pulldown_cmark::Options;

    use super::*;
    use crate::document::Document;

    struct Recorder {
        name: &'static str,
        status: WalkStatus,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl NodeRenderer for Recorder {
        fn enter(
            &mut self,
            _node: &Node<'_, '_>,
            _out: &mut String,
        ) -> Result<WalkStatus, RenderError> {
            self.log.borrow_mut().push(format!("enter {}", self.name));
            Ok(self.status)
        }

        fn leave(&mut self, _node: &Node<'_, '_>, _out: &mut String) -> Result<(), RenderError> {
            self.log.borrow_mut().push(format!("leave {}", self.name));
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        status: WalkStatus,
        log: &Rc<RefCell<Vec<String>>>,
    ) -> Box<dyn NodeRenderer> {
        Box::new(Recorder {
            name,
            status,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn test_ascending_priority_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut renderers = NodeRenderers::default();
        renderers.register(
            NodeKind::Paragraph,
            500,
            recorder("late", WalkStatus::SkipChildren, &log),
        );
        renderers.register(
            NodeKind::Paragraph,
            100,
            recorder("early", WalkStatus::PassThrough, &log),
        );
        renderers.register(
            NodeKind::Paragraph,
            100,
            recorder("early-second", WalkStatus::PassThrough, &log),
        );

        let doc = Document::parse("text\n", Options::empty());
        let node = doc.nodes(NodeKind::Paragraph).next().unwrap();
        let mut out = String::new();
        let handled = renderers.enter(&node, &mut out).unwrap();

        assert_eq!(handled, Some((2, WalkStatus::SkipChildren)));
        assert_eq!(
            *log.borrow(),
            vec!["enter early", "enter early-second", "enter late"]
        );
    }

    #[test]
    fn test_other_kinds_are_not_consulted() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut renderers = NodeRenderers::default();
        renderers.register(
            NodeKind::Table,
            1,
            recorder("table", WalkStatus::SkipChildren, &log),
        );

        let doc = Document::parse("text\n", Options::empty());
        let node = doc.nodes(NodeKind::Paragraph).next().unwrap();
        let mut out = String::new();

        assert_eq!(renderers.enter(&node, &mut out).unwrap(), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_leave_targets_handling_renderer() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut renderers = NodeRenderers::default();
        renderers.register(
            NodeKind::Paragraph,
            1,
            recorder("first", WalkStatus::PassThrough, &log),
        );
        renderers.register(
            NodeKind::Paragraph,
            2,
            recorder("second", WalkStatus::Continue, &log),
        );

        let doc = Document::parse("text\n", Options::empty());
        let node = doc.nodes(NodeKind::Paragraph).next().unwrap();
        let mut out = String::new();
        let (slot, _) = renderers.enter(&node, &mut out).unwrap().unwrap();
        renderers.leave(slot, &node, &mut out).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["enter first", "enter second", "leave second"]
        );
    }
}
