//! Render error type.

use crate::document::NodeKind;

/// Error returned when rendering a document fails.
///
/// Parsing never fails; only a registered node renderer can abort rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A node renderer failed.
    #[error("failed to render {kind}: {source}")]
    Node {
        /// Kind of the node being rendered.
        kind: NodeKind,
        /// Underlying renderer error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RenderError {
    /// Wrap a node renderer failure.
    pub fn node(kind: NodeKind, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Node {
            kind,
            source: source.into(),
        }
    }
}
