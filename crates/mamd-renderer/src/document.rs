//! Parsed markdown document and block node views.
//!
//! A [`Document`] keeps the full event sequence of one source buffer together
//! with the byte range every event covers. Start events are paired with their
//! end events at parse time, so a block node can be addressed by the index of
//! its start event and its children are the events in between.

use std::fmt;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag};

/// Block node kinds exposed to [`NodeRenderer`](crate::NodeRenderer)s.
///
/// Headings are not exposed: heading ids are generated by the core renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    BlockQuote,
    FencedCodeBlock,
    IndentedCodeBlock,
    List,
    Table,
    HtmlBlock,
}

impl NodeKind {
    /// Node kind of a start tag, or `None` for tags that are not exposed.
    #[must_use]
    pub fn of(tag: &Tag<'_>) -> Option<Self> {
        match tag {
            Tag::Paragraph => Some(Self::Paragraph),
            Tag::BlockQuote(_) => Some(Self::BlockQuote),
            Tag::CodeBlock(CodeBlockKind::Fenced(_)) => Some(Self::FencedCodeBlock),
            Tag::CodeBlock(CodeBlockKind::Indented) => Some(Self::IndentedCodeBlock),
            Tag::List(_) => Some(Self::List),
            Tag::Table(_) => Some(Self::Table),
            Tag::HtmlBlock => Some(Self::HtmlBlock),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Paragraph => "paragraph",
            Self::BlockQuote => "block quote",
            Self::FencedCodeBlock => "fenced code block",
            Self::IndentedCodeBlock => "indented code block",
            Self::List => "list",
            Self::Table => "table",
            Self::HtmlBlock => "html block",
        };
        f.write_str(name)
    }
}

/// Parsed markdown document.
///
/// Immutable once parsed; rendering only reads it.
pub struct Document<'a> {
    source: &'a str,
    events: Vec<(Event<'a>, Range<usize>)>,
    /// Index of the matching end event for every start event.
    ends: Vec<Option<usize>>,
}

impl<'a> Document<'a> {
    /// Parse a markdown source buffer.
    ///
    /// Parsing is total: every input produces a document.
    #[must_use]
    pub fn parse(source: &'a str, options: Options) -> Self {
        let events: Vec<_> = Parser::new_ext(source, options)
            .into_offset_iter()
            .collect();

        let mut ends = vec![None; events.len()];
        let mut open = Vec::new();
        for (index, (event, _)) in events.iter().enumerate() {
            match event {
                Event::Start(_) => open.push(index),
                Event::End(_) => {
                    if let Some(start) = open.pop() {
                        ends[start] = Some(index);
                    }
                }
                _ => {}
            }
        }

        Self {
            source,
            events,
            ends,
        }
    }

    /// The source buffer this document was parsed from.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// All events with their source byte ranges.
    #[must_use]
    pub fn events(&self) -> &[(Event<'a>, Range<usize>)] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the document has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Block node starting at event `index`.
    ///
    /// Returns `None` if the event is not the start of an exposed block node.
    #[must_use]
    pub fn node_at(&self, index: usize) -> Option<Node<'_, 'a>> {
        let (Event::Start(tag), _) = self.events.get(index)? else {
            return None;
        };
        let kind = NodeKind::of(tag)?;
        let end = self.ends[index]?;
        Some(Node {
            document: self,
            tag,
            start: index,
            end,
            kind,
        })
    }

    /// All block nodes of the given kind, in document order.
    pub fn nodes(&self, kind: NodeKind) -> impl Iterator<Item = Node<'_, 'a>> + '_ {
        (0..self.events.len())
            .filter_map(|index| self.node_at(index))
            .filter(move |node| node.kind == kind)
    }
}

/// View of one block node of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'d, 'a> {
    document: &'d Document<'a>,
    tag: &'d Tag<'a>,
    start: usize,
    end: usize,
    kind: NodeKind,
}

impl<'d, 'a> Node<'d, 'a> {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Index of the start event.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Index of the matching end event.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Byte range of the whole node in the source buffer.
    #[must_use]
    pub fn source_range(&self) -> Range<usize> {
        self.document.events[self.start].1.clone()
    }

    /// Source text of the whole node, including markers.
    #[must_use]
    pub fn source(&self) -> &'a str {
        &self.document.source[self.source_range()]
    }

    /// Child events between the start and end markers.
    #[must_use]
    pub fn children(&self) -> &'d [(Event<'a>, Range<usize>)] {
        &self.document.events[self.start + 1..self.end]
    }

    /// Code block view, if this node is a fenced or indented code block.
    #[must_use]
    pub fn code_block(&self) -> Option<CodeBlock<'d, 'a>> {
        let Tag::CodeBlock(kind) = self.tag else {
            return None;
        };
        let info: &str = match kind {
            CodeBlockKind::Fenced(info) => &**info,
            CodeBlockKind::Indented => "",
        };
        let language = info.split_whitespace().next();

        let segments = self
            .children()
            .iter()
            .filter_map(|(event, range)| match event {
                Event::Text(text) => Some((range.clone(), text)),
                _ => None,
            })
            .collect();

        Some(CodeBlock {
            source: self.document.source,
            info,
            language,
            segments,
        })
    }
}

/// Code block content as line spans into the source buffer.
pub struct CodeBlock<'d, 'a> {
    source: &'a str,
    info: &'d str,
    language: Option<&'d str>,
    segments: Vec<(Range<usize>, &'d CowStr<'a>)>,
}

impl<'d> CodeBlock<'d, '_> {
    /// First word of the fence info string.
    #[must_use]
    pub fn language(&self) -> Option<&'d str> {
        self.language
    }

    /// Full fence info string (empty for indented blocks).
    #[must_use]
    pub fn info(&self) -> &'d str {
        self.info
    }

    /// Source byte ranges of the code lines, in document order.
    #[must_use]
    pub fn lines(&self) -> Vec<Range<usize>> {
        self.segments.iter().map(|(range, _)| range.clone()).collect()
    }

    /// Code text of the block, whitespace preserved.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(
            self.segments.iter().map(|(range, _)| range.len()).sum(),
        );
        for (_, segment) in &self.segments {
            text.push_str(segment);
        }
        text
    }

    /// Source text covered by the line spans.
    #[must_use]
    pub fn source_text(&self) -> String {
        self.segments
            .iter()
            .map(|(range, _)| &self.source[range.clone()])
            .collect()
    }
}
