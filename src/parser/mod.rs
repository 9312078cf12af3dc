//! The block-structure builder (§4.2): consumes input lines one at a time,
//! maintains the open-container stack, and emits a finalized [`Document`]
//! tree. Inline parsing (emphasis, links, code spans, ...) is deferred
//! until every block is closed; see [`inlines`].
//!
//! [`Document`]: crate::nodes::NodeValue::Document

mod inlines;
pub mod options;

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use typed_arena::Arena;

use crate::arena_tree::Node;
use crate::line_scanner::LineScanner;
use crate::nodes::{
    self, make_block, AstNode, ListDelimType, ListType, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeList, NodeValue,
};
use crate::scanners;
use crate::strings;

pub use options::Options;

const TAB_STOP: usize = 4;
const CODE_INDENT: usize = 4;

/// Quadratic-blowup guard: an implausibly deep run of nested list markers
/// on one line stops opening further lists rather than recursing forever.
const MAX_LIST_DEPTH: usize = 100;

/// The link-reference registry (§4.3): case-folded label to destination
/// and title, first-write-wins. Populated as paragraphs are finalized;
/// queried by the inline parser for reference-style links and images.
#[derive(Debug, Default)]
pub(crate) struct RefMap {
    map: FxHashMap<String, (String, String)>,
}

impl RefMap {
    fn insert(&mut self, label: &str, url: String, title: String) {
        let key = strings::normalize_reference_label(label);
        self.map.entry(key).or_insert((url, title));
    }

    pub(crate) fn lookup(&self, label: &str) -> Option<(&str, &str)> {
        let key = strings::normalize_reference_label(label);
        self.map.get(&key).map(|(u, t)| (u.as_str(), t.as_str()))
    }
}

/// Parses a complete Markdown document.
///
/// Never fails: every input, however ill-formed, has a well-defined parse
/// (§7). `buffer` is consumed in full before this returns.
pub fn parse_document<'a>(
    arena: &'a Arena<AstNode<'a>>,
    buffer: &str,
    options: &Options,
) -> &'a AstNode<'a> {
    let root: &'a AstNode<'a> =
        arena.alloc(Node::new(RefCell::new(make_block(NodeValue::Document, 0))));
    let mut parser = Parser::new(arena, root, options);

    let mut scanner = LineScanner::new(buffer);
    while let Some(line) = scanner.next_line() {
        parser.incorporate_line(line.as_bytes());
    }
    parser.finish()
}

struct Parser<'a, 'o> {
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
    current: &'a AstNode<'a>,
    line_number: u32,
    offset: usize,
    column: usize,
    first_nonspace: usize,
    first_nonspace_column: usize,
    indent: usize,
    blank: bool,
    partially_consumed_tab: bool,
    /// Set when phase 2 fully disposed of the current line itself (ATX
    /// heading, thematic break, setext upgrade) so [`Parser::incorporate_line`]
    /// must not also hand it to [`Parser::add_text_to_tip`].
    line_consumed: bool,
    refmap: RefMap,
    options: &'o Options,
}

impl<'a, 'o> Parser<'a, 'o> {
    fn new(arena: &'a Arena<AstNode<'a>>, root: &'a AstNode<'a>, options: &'o Options) -> Self {
        Parser {
            arena,
            root,
            current: root,
            line_number: 0,
            offset: 0,
            column: 0,
            first_nonspace: 0,
            first_nonspace_column: 0,
            indent: 0,
            blank: false,
            partially_consumed_tab: false,
            line_consumed: false,
            refmap: RefMap::default(),
            options,
        }
    }

    // ---- column/offset bookkeeping -------------------------------------

    /// Scans forward from `self.offset`, expanding tabs to the next
    /// multiple of [`TAB_STOP`] for column-counting purposes, and records
    /// where the first non-space-or-tab byte is.
    fn find_first_nonspace(&mut self, line: &[u8]) {
        self.first_nonspace = self.offset;
        self.first_nonspace_column = self.column;
        let mut i = self.first_nonspace;
        let mut cols = self.first_nonspace_column;
        loop {
            match line.get(i) {
                Some(b' ') => {
                    cols += 1;
                    i += 1;
                }
                Some(b'\t') => {
                    cols += TAB_STOP - (cols % TAB_STOP);
                    i += 1;
                }
                _ => break,
            }
        }
        self.first_nonspace = i;
        self.first_nonspace_column = cols;
        self.indent = self.first_nonspace_column - self.column;
        self.blank = matches!(line.get(i), None | Some(b'\n') | Some(b'\r'));
    }

    /// Advances `self.offset`/`self.column` by `count` columns (tabs
    /// expand) if `columns`, or `count` raw bytes otherwise.
    fn advance_offset(&mut self, line: &[u8], mut count: usize, columns: bool) {
        while count > 0 {
            match line.get(self.offset) {
                Some(b'\t') => {
                    let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
                    if columns {
                        let advance = chars_to_tab.min(count);
                        self.partially_consumed_tab = chars_to_tab > count;
                        self.column += advance;
                        if !self.partially_consumed_tab {
                            self.offset += 1;
                        }
                        count -= advance;
                    } else {
                        self.column += chars_to_tab;
                        self.offset += 1;
                        count -= 1;
                    }
                }
                Some(_) => {
                    self.offset += 1;
                    self.column += 1;
                    count -= 1;
                }
                None => break,
            }
        }
    }

    // ---- tree mutation ---------------------------------------------------

    fn add_child(&mut self, mut parent: &'a AstNode<'a>, value: NodeValue) -> &'a AstNode<'a> {
        while !nodes::can_contain_type(&parent.data.borrow().value, &value) {
            parent = self.finalize(parent);
        }
        let child = self
            .arena
            .alloc(Node::new(RefCell::new(make_block(value, self.line_number))));
        parent.append(child);
        self.current = child;
        child
    }

    /// Closes `node` (running its per-kind finalizer) and returns its
    /// parent. `node` must not be the root.
    fn finalize(&mut self, node: &'a AstNode<'a>) -> &'a AstNode<'a> {
        let parent = node.parent().expect("root is never finalized");

        {
            let mut ast = node.data.borrow_mut();
            ast.open = false;
        }

        let kind = node.data.borrow().value.clone();
        match kind {
            NodeValue::Paragraph => self.finalize_paragraph(node),
            NodeValue::CodeBlock(_) => self.finalize_code_block(node),
            NodeValue::HtmlBlock(_) => self.finalize_html_block(node),
            NodeValue::List(_) => self.finalize_list(node),
            _ => {}
        }

        if self.current.same_node(node) {
            self.current = parent;
        }

        parent
    }

    /// Closes every open descendant of `container`, deepest first, until
    /// `self.current` is `container`. Invariant 1: the open stack is
    /// always a root-to-leaf path, so `container` is guaranteed to be an
    /// ancestor of (or equal to) `self.current`.
    fn close_unmatched_blocks(&mut self, container: &'a AstNode<'a>) {
        while !self.current.same_node(container) {
            let parent = self.current.parent().expect("container is an ancestor");
            self.finalize(self.current);
            self.current = parent;
        }
    }

    fn finalize_paragraph(&mut self, node: &'a AstNode<'a>) {
        loop {
            let first_line = {
                let ast = node.data.borrow();
                if ast.content.is_empty() {
                    return;
                }
                ast.content.clone()
            };
            match try_parse_reference_definition(&first_line) {
                Some((consumed, label, url, title)) => {
                    self.refmap.insert(&label, url, title);
                    let mut ast = node.data.borrow_mut();
                    ast.content.drain(..consumed);
                }
                None => break,
            }
        }
        let mut ast = node.data.borrow_mut();
        strings::trim(&mut ast.content);
        if ast.content.is_empty() {
            drop(ast);
            node.detach();
        }
    }

    fn finalize_code_block(&mut self, node: &'a AstNode<'a>) {
        let mut ast = node.data.borrow_mut();
        let content = std::mem::take(&mut ast.content);
        if let NodeValue::CodeBlock(ref mut ncb) = ast.value {
            ncb.literal = content;
            if !ncb.fenced {
                strings::remove_trailing_blank_lines(&mut ncb.literal);
                if !ncb.literal.is_empty() {
                    ncb.literal.push('\n');
                }
            }
        }
    }

    fn finalize_html_block(&mut self, node: &'a AstNode<'a>) {
        let mut ast = node.data.borrow_mut();
        let content = std::mem::take(&mut ast.content);
        if let NodeValue::HtmlBlock(ref mut nhb) = ast.value {
            nhb.literal = content;
        }
    }

    fn finalize_list(&mut self, node: &'a AstNode<'a>) {
        let tight = list_is_tight(node);
        let mut ast = node.data.borrow_mut();
        if let NodeValue::List(ref mut nl) = ast.value {
            nl.tight = tight;
        }
    }

    // ---- line-at-a-time driver -------------------------------------------

    fn incorporate_line(&mut self, line: &[u8]) {
        self.line_number += 1;
        self.offset = 0;
        self.column = 0;
        self.blank = false;
        self.partially_consumed_tab = false;

        let (container, all_matched) = self.check_open_blocks(line);

        if !all_matched && matches!(self.current.data.borrow().value, NodeValue::Paragraph) {
            self.offset = 0;
            self.column = 0;
            self.find_first_nonspace(line);
            if !self.blank && !self.line_opens_interrupting_block(line) {
                self.add_line(self.current, line);
                return;
            }
        }

        self.close_unmatched_blocks(container);

        let container_kind = container.data.borrow().value.clone();
        let leaf_kind = match container_kind {
            NodeValue::CodeBlock(ref ncb) if ncb.fenced => Some(true),
            NodeValue::CodeBlock(_) => Some(false),
            NodeValue::HtmlBlock(_) => None,
            _ => {
                self.line_consumed = false;
                let tip = self.open_new_blocks(container, line);
                if !self.line_consumed {
                    self.add_text_to_tip(tip, line);
                }
                return;
            }
        };

        match leaf_kind {
            Some(true) => self.continue_fenced_code(container, line),
            Some(false) => self.continue_indented_code(container, line),
            None => self.continue_html_block(container, line),
        }
    }

    fn finish(mut self) -> &'a AstNode<'a> {
        let root = self.root;
        self.close_unmatched_blocks(root);
        self.finalize_document();
        root
    }

    fn finalize_document(&mut self) {
        // Finalize every still-open node bottom-up (there should only be
        // the root left open by now, but walking defensively costs
        // nothing and protects the invariant if it's ever violated).
        let mut open: Vec<&'a AstNode<'a>> = self
            .root
            .descendants()
            .filter(|n| n.data.borrow().open && !n.same_node(self.root))
            .collect();
        while let Some(node) = open.pop() {
            self.finalize(node);
        }
        {
            let mut ast = self.root.data.borrow_mut();
            ast.open = false;
        }

        inlines::process_inlines(self.arena, self.root, &self.refmap, self.options);
    }

    // ---- phase 1: continue existing containers ---------------------------

    fn check_open_blocks(&mut self, line: &[u8]) -> (&'a AstNode<'a>, bool) {
        let mut container = self.root;
        let mut all_matched = true;

        loop {
            let child = match last_open_child(container) {
                Some(c) => c,
                None => break,
            };

            self.find_first_nonspace(line);

            let matched = match child.data.borrow().value.clone() {
                NodeValue::BlockQuote => self.try_continue_blockquote(line),
                NodeValue::Item(ref nl) => self.try_continue_item(line, nl, child),
                NodeValue::List(_) => true,
                NodeValue::CodeBlock(ref ncb) if ncb.fenced => true,
                NodeValue::CodeBlock(_) => self.blank || self.indent >= CODE_INDENT,
                NodeValue::HtmlBlock(ref nhb) => match nhb.block_type {
                    6 | 7 => !self.blank,
                    _ => true,
                },
                NodeValue::Paragraph => !self.blank,
                _ => false,
            };

            if !matched {
                all_matched = false;
                break;
            }
            container = child;
        }

        (container, all_matched)
    }

    fn try_continue_blockquote(&mut self, line: &[u8]) -> bool {
        if self.indent >= 4 || line.get(self.first_nonspace) != Some(&b'>') {
            return false;
        }
        self.advance_offset(line, self.indent, true);
        self.advance_offset(line, 1, false);
        if matches!(line.get(self.offset), Some(b' ') | Some(b'\t')) {
            self.advance_offset(line, 1, true);
        }
        true
    }

    fn try_continue_item(&mut self, line: &[u8], nl: &NodeList, item: &'a AstNode<'a>) -> bool {
        let required = nl.marker_offset + nl.padding;
        if self.blank {
            let empty_and_already_blank = {
                let ast = item.data.borrow();
                ast.content.is_empty() && item.first_child().is_none() && ast.last_line_blank
            };
            return !empty_and_already_blank;
        }
        if self.indent >= required {
            self.advance_offset(line, required, true);
            true
        } else {
            false
        }
    }

    /// Tests, against the raw (un-stripped) line, whether it would open a
    /// block capable of interrupting a paragraph. Used only to decide
    /// lazy-continuation eligibility (§4.2): a non-interrupting line
    /// continues a nested paragraph even across a missing container
    /// prefix.
    fn line_opens_interrupting_block(&mut self, line: &[u8]) -> bool {
        let rest = &line[self.first_nonspace..];
        if self.indent >= CODE_INDENT {
            return false;
        }
        if scanners::thematic_break(rest).is_some() {
            return true;
        }
        if scanners::atx_heading_start(rest).is_some() {
            return true;
        }
        if scanners::open_code_fence(rest).is_some() {
            return true;
        }
        if let Some(cond) = scanners::html_block_start(rest) {
            return cond != 7;
        }
        if rest.first() == Some(&b'>') {
            return true;
        }
        if scanners::list_bullet_marker(rest).is_some() {
            return !list_item_looks_empty(rest, 1);
        }
        if let Some((start, _, marker_len)) = scanners::list_ordered_marker(rest) {
            return start == 1 && !list_item_looks_empty(rest, marker_len);
        }
        false
    }

    // ---- phase 2: open new blocks -----------------------------------------

    fn open_new_blocks(&mut self, mut container: &'a AstNode<'a>, line: &[u8]) -> &'a AstNode<'a> {
        let mut depth = 0;
        loop {
            self.find_first_nonspace(line);
            let container_is_paragraph = matches!(container.data.borrow().value, NodeValue::Paragraph);

            if self.indent >= CODE_INDENT && !container_is_paragraph && !self.blank {
                self.advance_offset(line, CODE_INDENT, true);
                container = self.add_child(
                    container,
                    NodeValue::CodeBlock(NodeCodeBlock {
                        fenced: false,
                        ..Default::default()
                    }),
                );
                break;
            }

            if self.blank || self.indent >= CODE_INDENT {
                break;
            }

            let rest = &line[self.first_nonspace..];

            if rest.first() == Some(&b'>') {
                self.advance_offset(line, self.indent, true);
                self.advance_offset(line, 1, false);
                if matches!(line.get(self.offset), Some(b' ') | Some(b'\t')) {
                    self.advance_offset(line, 1, true);
                }
                container = self.add_child(container, NodeValue::BlockQuote);
                depth += 1;
                if depth > MAX_LIST_DEPTH {
                    break;
                }
                continue;
            }

            if let Some(consumed) = scanners::atx_heading_start(rest) {
                self.advance_offset(line, self.indent + consumed, true);
                let level = rest[..consumed].iter().take_while(|&&b| b == b'#').count() as u8;
                let mut content = String::from_utf8_lossy(&line[self.offset..]).into_owned();
                strings::trim(&mut content);
                strings::chop_trailing_hashtags(&mut content);
                let heading = self.add_child(
                    container,
                    NodeValue::Heading(NodeHeading { level, setext: false }),
                );
                heading.data.borrow_mut().content = content;
                self.finalize(heading);
                container = heading.parent().unwrap();
                self.advance_offset(line, line.len() - self.offset, false);
                self.line_consumed = true;
                break;
            }

            if let Some(fence_length) = scanners::open_code_fence(rest) {
                let fence_char = rest[0];
                let fence_offset = self.indent;
                self.advance_offset(line, self.indent + fence_length, true);
                let mut info = String::from_utf8_lossy(&line[self.offset..]).into_owned();
                strings::trim(&mut info);
                let info = strings::unescape(&crate::entity::unescape_html(&info));
                container = self.add_child(
                    container,
                    NodeValue::CodeBlock(NodeCodeBlock {
                        fenced: true,
                        fence_char,
                        fence_length,
                        fence_offset,
                        info,
                        literal: String::new(),
                    }),
                );
                self.advance_offset(line, line.len() - self.offset, false);
                break;
            }

            if let Some(block_type) = scanners::html_block_start(rest) {
                if block_type != 7 || !container_is_paragraph {
                    container = self.add_child(
                        container,
                        NodeValue::HtmlBlock(NodeHtmlBlock {
                            block_type: block_type as u8,
                            literal: String::new(),
                        }),
                    );
                    break;
                }
            }

            if container_is_paragraph {
                if let Some(setext) = scanners::setext_heading_line(rest) {
                    self.advance_offset(line, line.len() - self.offset, false);
                    let level = match setext {
                        scanners::SetextChar::Equals => 1,
                        scanners::SetextChar::Hyphen => 2,
                    };
                    let mut ast = container.data.borrow_mut();
                    strings::trim(&mut ast.content);
                    ast.value = NodeValue::Heading(NodeHeading { level, setext: true });
                    ast.open = false;
                    drop(ast);
                    let parent = container.parent().unwrap();
                    if self.current.same_node(container) {
                        self.current = parent;
                    }
                    container = parent;
                    self.line_consumed = true;
                    break;
                }
            }

            if scanners::thematic_break(rest).is_some() {
                self.advance_offset(line, line.len() - self.offset, false);
                let tb = self.add_child(container, NodeValue::ThematicBreak);
                self.finalize(tb);
                container = tb.parent().unwrap();
                self.line_consumed = true;
                break;
            }

            if let Some(new_container) =
                self.try_open_list(container, line, rest, container_is_paragraph)
            {
                container = new_container;
                depth += 1;
                if depth > MAX_LIST_DEPTH {
                    break;
                }
                continue;
            }

            break;
        }

        container
    }

    fn try_open_list(
        &mut self,
        container: &'a AstNode<'a>,
        line: &[u8],
        rest: &[u8],
        container_is_paragraph: bool,
    ) -> Option<&'a AstNode<'a>> {
        let (list_type, bullet_char, start, delimiter, marker_len) =
            if let Some((c, len)) = scanners::list_bullet_marker(rest) {
                (ListType::Bullet, c, 1u32, ListDelimType::Period, len)
            } else if let Some((start, delim, len)) = scanners::list_ordered_marker(rest) {
                if container_is_paragraph && start != 1 {
                    return None;
                }
                let delimiter = if delim == b')' { ListDelimType::Paren } else { ListDelimType::Period };
                (ListType::Ordered, delim, start, delimiter, len)
            } else {
                return None;
            };

        if container_is_paragraph && list_item_looks_empty(rest, marker_len) {
            return None;
        }

        let after_marker = &rest[marker_len..];
        let blank_item = strings::is_blank(std::str::from_utf8(after_marker).unwrap_or(""));
        if !blank_item && !matches!(after_marker.first(), Some(b' ') | Some(b'\t')) {
            // Marker not followed by whitespace (and not at end of line):
            // not a list marker at all.
            return None;
        }
        let spaces_after = if blank_item {
            1
        } else {
            scanners::spacechars(after_marker).unwrap_or(0).min(4).max(1)
        };

        let marker_offset = self.indent;
        self.advance_offset(line, self.indent + marker_len, true);
        let padding = if blank_item {
            marker_len + 1
        } else {
            marker_len + spaces_after
        };
        if !blank_item {
            self.advance_offset(line, spaces_after, true);
        }

        let list_value = NodeList {
            list_type,
            marker_offset,
            padding,
            start: start as usize,
            delimiter,
            bullet_char,
            tight: false,
        };

        // The previous sibling item (if any) was already finalized by
        // `close_unmatched_blocks` before phase 2 ran; reuse its list as
        // long as the marker still matches, regardless of open/closed.
        let last_child = container.last_child();
        let needs_new_list = match last_child.map(|c| c.data.borrow().value.clone()) {
            Some(NodeValue::List(ref existing)) => !lists_match(existing, &list_value),
            _ => true,
        };

        let list_node = if needs_new_list {
            self.add_child(container, NodeValue::List(list_value))
        } else {
            last_child.unwrap()
        };

        Some(self.add_child(list_node, NodeValue::Item(list_value)))
    }

    // ---- leaf content accumulation -----------------------------------------

    fn add_text_to_tip(&mut self, tip: &'a AstNode<'a>, line: &[u8]) {
        let kind = tip.data.borrow().value.clone();
        match kind {
            NodeValue::HtmlBlock(_) => {
                self.add_line(tip, line);
                self.check_html_block_end(tip);
            }
            NodeValue::CodeBlock(_) => self.add_line(tip, line),
            NodeValue::Paragraph => {
                if self.blank {
                    tip.data.borrow_mut().last_line_blank = true;
                } else {
                    self.add_line(tip, line);
                }
            }
            _ => {
                if self.blank {
                    tip.data.borrow_mut().last_line_blank = true;
                } else {
                    let para = self.add_child(tip, NodeValue::Paragraph);
                    self.add_line(para, line);
                }
            }
        }
    }

    fn continue_fenced_code(&mut self, container: &'a AstNode<'a>, line: &[u8]) {
        self.offset = 0;
        self.column = 0;
        self.find_first_nonspace(line);
        let (fence_char, fence_length, fence_offset) = {
            let ast = container.data.borrow();
            match ast.value {
                NodeValue::CodeBlock(ref ncb) => (ncb.fence_char, ncb.fence_length, ncb.fence_offset),
                _ => unreachable!(),
            }
        };

        if self.indent < CODE_INDENT
            && scanners::close_code_fence(&line[self.first_nonspace..], fence_char, fence_length)
        {
            self.finalize(container);
            return;
        }

        let strip = self.indent.min(fence_offset);
        self.advance_offset(line, strip, true);
        self.add_line(container, line);
    }

    fn continue_indented_code(&mut self, container: &'a AstNode<'a>, line: &[u8]) {
        self.offset = 0;
        self.column = 0;
        self.find_first_nonspace(line);
        if self.blank {
            self.add_line_literal(container, "\n");
        } else {
            self.advance_offset(line, CODE_INDENT, true);
            self.add_line(container, line);
        }
    }

    fn continue_html_block(&mut self, container: &'a AstNode<'a>, line: &[u8]) {
        self.offset = 0;
        self.column = 0;
        self.find_first_nonspace(line);
        let block_type = match container.data.borrow().value {
            NodeValue::HtmlBlock(ref nhb) => nhb.block_type,
            _ => unreachable!(),
        };
        if block_type == 6 || block_type == 7 {
            if self.blank {
                self.finalize(container);
                return;
            }
        }
        self.add_line(container, line);
        self.check_html_block_end(container);
    }

    fn check_html_block_end(&mut self, node: &'a AstNode<'a>) {
        let (block_type, ends) = {
            let ast = node.data.borrow();
            match ast.value {
                NodeValue::HtmlBlock(ref nhb) => {
                    let last_line = ast.content.lines().last().unwrap_or("");
                    let bytes = last_line.as_bytes();
                    let ends = match nhb.block_type {
                        1 => scanners::html_block_end_1(bytes),
                        2 => scanners::html_block_end_2(bytes),
                        3 => scanners::html_block_end_3(bytes),
                        4 => scanners::html_block_end_4(bytes),
                        5 => scanners::html_block_end_5(bytes),
                        _ => false,
                    };
                    (nhb.block_type, ends)
                }
                _ => unreachable!(),
            }
        };
        if (1..=5).contains(&block_type) && ends {
            self.finalize(node);
        }
    }

    fn add_line(&mut self, node: &'a AstNode<'a>, line: &[u8]) {
        let text = String::from_utf8_lossy(&line[self.offset..]);
        let mut ast = node.data.borrow_mut();
        ast.content.push_str(&text);
        ast.last_line_blank = false;
    }

    fn add_line_literal(&mut self, node: &'a AstNode<'a>, text: &str) {
        let mut ast = node.data.borrow_mut();
        ast.content.push_str(text);
    }
}

fn last_open_child<'a>(node: &'a AstNode<'a>) -> Option<&'a AstNode<'a>> {
    node.last_child().filter(|c| c.data.borrow().open)
}

fn lists_match(a: &NodeList, b: &NodeList) -> bool {
    a.list_type == b.list_type && a.delimiter == b.delimiter && a.bullet_char == b.bullet_char
}

/// Whether a freshly recognized list item has no content following the
/// marker on this line, which bars it from interrupting a paragraph.
fn list_item_looks_empty(rest: &[u8], marker_len: usize) -> bool {
    rest.get(marker_len)
        .map_or(true, |&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        && strings::is_blank(std::str::from_utf8(&rest[marker_len..]).unwrap_or(""))
}

/// Finds and strips a leading link reference definition from `content`
/// (§4.3), returning how many bytes were consumed along with the parsed
/// label, URL, and title. Tries again in a loop from the caller so a
/// paragraph with several leading reference definitions absorbs them all.
fn try_parse_reference_definition(content: &str) -> Option<(usize, String, String, String)> {
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let label_len = scanners::link_label(&bytes[i..])?;
    let label_raw = &content[i..i + label_len];
    let label = &label_raw[1..label_raw.len() - 1];
    if strings::normalize_reference_label(label).is_empty() {
        return None;
    }
    i += label_len;
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i += 1;
    i += scanners::spacechars(&bytes[i..]).unwrap_or(0);
    if matches!(bytes.get(i), None | Some(b'\n')) {
        i += skip_one_newline(&bytes[i..]);
        i += leading_spaces(&bytes[i..]);
    }

    let dest_len = scanners::link_destination(&bytes[i..])?;
    let destination = strings::clean_url(&content[i..i + dest_len]);
    i += dest_len;

    let after_dest = i;
    let spaces_before_title = scanners::spacechars(&bytes[i..]).unwrap_or(0);

    let mut title = String::new();
    let mut title_end = i;
    if spaces_before_title > 0 {
        let mut j = i + spaces_before_title;
        if let Some(title_len) = scanners::link_title(&bytes[j..]) {
            let candidate_end = j + title_len;
            let rest_len = skip_to_line_end(&bytes[candidate_end..]);
            if strings::is_blank(&content[candidate_end..candidate_end + rest_len]) {
                title = strings::clean_title(&content[j..j + title_len]);
                title_end = candidate_end + rest_len;
                j = title_end;
                let _ = j;
            }
        }
    }

    if title.is_empty() {
        let rest_len = skip_to_line_end(&bytes[after_dest..]);
        if !strings::is_blank(&content[after_dest..after_dest + rest_len]) {
            return None;
        }
        title_end = after_dest + rest_len;
    }

    let mut end = title_end;
    end += skip_one_newline(&bytes[end..]);

    Some((end, label.to_string(), destination, title))
}

fn leading_spaces(bytes: &[u8]) -> usize {
    scanners::spacechars(bytes).unwrap_or(0)
}

fn skip_one_newline(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b'\n') => 1,
        _ => 0,
    }
}

fn skip_to_line_end(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == b'\n').map_or(bytes.len(), |i| i + 1)
}

/// List tightness (§4.2): loose if any item is followed by a blank line
/// before the next item, or any item directly contains two block children
/// separated by a blank line. Computed once, at finalization.
fn list_is_tight(list: &AstNode) -> bool {
    for item in list.children() {
        let item_had_blank_after = item.data.borrow().last_line_blank;
        let is_last_item = item.next_sibling().is_none();
        if item_had_blank_after && !is_last_item {
            return false;
        }
        let mut children = item.children().peekable();
        while let Some(child) = children.next() {
            if children.peek().is_some() && child.data.borrow().last_line_blank {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use typed_arena::Arena;

    fn doc<'a>(arena: &'a Arena<AstNode<'a>>, src: &str) -> &'a AstNode<'a> {
        parse_document(arena, src, &Options::default())
    }

    #[test]
    fn simple_paragraph_and_blockquote() {
        let arena = Arena::new();
        let root = doc(&arena, "hello\n\n> quoted\n");
        let mut children = root.children();
        assert!(matches!(children.next().unwrap().data.borrow().value, NodeValue::Paragraph));
        assert!(matches!(children.next().unwrap().data.borrow().value, NodeValue::BlockQuote));
    }

    #[test]
    fn reference_definition_is_absorbed() {
        let arena = Arena::new();
        let root = doc(&arena, "[foo]: /url \"title\"\n\ntext\n");
        assert_eq!(root.children().count(), 1);
    }

    #[test]
    fn tight_list_detected() {
        let arena = Arena::new();
        let root = doc(&arena, "- a\n- b\n");
        let list = root.first_child().unwrap();
        match list.data.borrow().value {
            NodeValue::List(ref nl) => assert!(nl.tight),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn loose_list_detected() {
        let arena = Arena::new();
        let root = doc(&arena, "- a\n\n- b\n");
        let list = root.first_child().unwrap();
        match list.data.borrow().value {
            NodeValue::List(ref nl) => assert!(!nl.tight),
            _ => panic!("expected list"),
        }
    }
}
