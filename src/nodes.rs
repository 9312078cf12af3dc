//! The document tree: every block and inline kind this crate knows how to
//! parse and render, plus the small bits of per-node bookkeeping the block
//! builder needs while a node is still open.

use std::cell::RefCell;

use crate::arena_tree::Node;

/// A node in the document tree. Owned by the arena passed to
/// [`crate::parse_document`]; never constructed directly.
pub type AstNode<'a> = Node<'a, RefCell<Ast>>;

/// Per-node state. `value` is the node's kind and its rendered-relevant
/// payload; the rest is bookkeeping the block builder mutates only while
/// this node is the deepest open container on its branch.
#[derive(Debug, Clone)]
pub struct Ast {
    pub value: NodeValue,

    /// Raw, not-yet-inline-parsed text accumulated for this node, if it's a
    /// leaf block that `accepts_lines()`.
    pub content: String,

    /// 1-based line this node's first line was read from. Internal
    /// bookkeeping only; never rendered (non-goal: sourcepos for warnings).
    pub start_line: u32,

    /// Whether this node is still open for continuation lines.
    pub open: bool,

    /// Whether the line immediately preceding the current one was blank,
    /// while this node was the tip. Feeds list-tightness computation.
    pub last_line_blank: bool,
}

pub fn make_block(value: NodeValue, start_line: u32) -> Ast {
    Ast {
        value,
        content: String::new(),
        start_line,
        open: true,
        last_line_blank: false,
    }
}

/// A node's kind and payload. Block kinds can (mostly) contain further
/// blocks; inline kinds are produced only by the inline parser and are
/// children exclusively of [`NodeValue::Heading`] or [`NodeValue::Paragraph`]
/// nodes once inline parsing has run.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// The root of every document.
    Document,
    BlockQuote,
    List(NodeList),
    Item(NodeList),
    Heading(NodeHeading),
    Paragraph,
    CodeBlock(NodeCodeBlock),
    HtmlBlock(NodeHtmlBlock),
    ThematicBreak,

    /// Transient: absorbed into the document's link-reference registry at
    /// paragraph finalization and never appears in a finished tree.
    LinkReferenceDefinition(NodeLink),

    Text(String),
    Code(NodeCode),
    Emph,
    Strong,
    Link(NodeLink),
    Image(NodeLink),
    HtmlInline(String),
    LineBreak,
    SoftBreak,
}

impl NodeValue {
    /// Block kinds that may directly contain further block children.
    pub fn block(&self) -> bool {
        matches!(
            self,
            NodeValue::Document
                | NodeValue::BlockQuote
                | NodeValue::List(..)
                | NodeValue::Item(..)
                | NodeValue::Heading(..)
                | NodeValue::Paragraph
                | NodeValue::CodeBlock(..)
                | NodeValue::HtmlBlock(..)
                | NodeValue::ThematicBreak
                | NodeValue::LinkReferenceDefinition(..)
        )
    }

    /// Leaf blocks that accumulate raw text lines rather than block
    /// children.
    pub fn accepts_lines(&self) -> bool {
        matches!(
            self,
            NodeValue::Paragraph | NodeValue::Heading(..) | NodeValue::CodeBlock(..)
        )
    }

    pub fn contains_inlines(&self) -> bool {
        matches!(self, NodeValue::Paragraph | NodeValue::Heading(..))
    }

    pub fn text(&mut self) -> Option<&mut String> {
        match *self {
            NodeValue::Text(ref mut t)
            | NodeValue::HtmlInline(ref mut t)
            | NodeValue::Code(NodeCode { literal: ref mut t }) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDelimType {
    Period,
    Paren,
}

/// Shared by [`NodeValue::List`] (the list itself) and [`NodeValue::Item`]
/// (each item, which additionally uses `padding` to strip continuation
/// lines' leading whitespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeList {
    pub list_type: ListType,
    /// Columns of whitespace before the marker.
    pub marker_offset: usize,
    /// Columns consumed by the marker plus the whitespace following it;
    /// subtracted from every continuation line of this item.
    pub padding: usize,
    pub start: usize,
    pub delimiter: ListDelimType,
    pub bullet_char: u8,
    /// Computed once, at list finalization.
    pub tight: bool,
}

impl Default for NodeList {
    fn default() -> Self {
        NodeList {
            list_type: ListType::Bullet,
            marker_offset: 0,
            padding: 0,
            start: 1,
            delimiter: ListDelimType::Period,
            bullet_char: b'-',
            tight: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeading {
    pub level: u8,
    /// `true` for a setext (underlined) heading, `false` for ATX (`#`).
    pub setext: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeCodeBlock {
    pub fenced: bool,
    pub fence_char: u8,
    pub fence_length: usize,
    /// Columns of indentation before the opening fence; subtracted from
    /// every continuation line.
    pub fence_offset: usize,
    pub info: String,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeHtmlBlock {
    pub block_type: u8,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeLink {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeCode {
    pub literal: String,
}

/// True if `child`'s kind may be appended to `self`'s kind as a direct
/// child. Mirrors cmark's nesting matrix: containers accept other
/// containers and leaves; leaves accept nothing (their content is raw text
/// until the inline pass, which appends inline nodes directly without going
/// through this check).
pub fn can_contain_type(self_value: &NodeValue, child: &NodeValue) -> bool {
    if let NodeValue::Document = child {
        return false;
    }

    match self_value {
        NodeValue::Document | NodeValue::BlockQuote | NodeValue::Item(..) => {
            child.block() && !matches!(child, NodeValue::Item(..))
        }
        NodeValue::List(..) => matches!(child, NodeValue::Item(..)),
        _ => false,
    }
}
