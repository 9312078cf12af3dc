//! The inline parser (§4.5): walks a leaf block's raw text once, building a
//! flat run of text/code/break/autolink nodes plus a delimiter stack (for
//! `*`/`_` runs) and a bracket stack (for `[`/`![`). Two backtracking passes
//! resolve the recursive parts of the grammar afterward: "look for link or
//! image" (§6.3, triggered on `]`) and "process emphasis" (§6.5, the
//! delimiter-stack algorithm with its rule-of-3 `openers_bottom` cache).

use std::cell::RefCell;
use std::collections::HashMap;

use typed_arena::Arena;
use unicode_categories::UnicodeCategories;

use crate::character_set::character_set;
use crate::ctype::ispunct;
use crate::entity;
use crate::nodes::{Ast, AstNode, NodeCode, NodeLink, NodeValue};
use crate::parser::options::Options;
use crate::scanners;
use crate::strings;

use super::RefMap;

const SPECIAL_BYTES: [bool; 256] = character_set!(b"\n\\`&<*_[]!");

/// Parses every [`Paragraph`][NodeValue::Paragraph] and
/// [`Heading`][NodeValue::Heading] node's raw `content` into inline
/// children, then leaves `content` empty (the block builder's job with it is
/// done).
///
/// Targets are collected into a `Vec` up front rather than mutated while
/// `root.descendants()` is still live: that iterator reads sibling/child
/// pointers lazily as it walks, and appending a paragraph's own inline
/// children partway through a single pass over the whole tree would have it
/// (incorrectly) descend into them.
pub(crate) fn process_inlines<'a>(
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
    refmap: &RefMap,
    _options: &Options,
) {
    // Pure CommonMark's inline grammar has no renderer-configurable
    // behavior; `Options` only changes how the resulting tree is rendered.
    let targets: Vec<&'a AstNode<'a>> = root
        .descendants()
        .filter(|n| n.data.borrow().value.contains_inlines())
        .collect();

    for node in targets {
        let content = std::mem::take(&mut node.data.borrow_mut().content);
        let mut subject = Subject {
            arena,
            input: &content,
            pos: 0,
            refmap,
            delimiters: Vec::new(),
            brackets: Vec::new(),
        };
        subject.parse_into(node);
    }
}

/// One entry in the `*`/`_` delimiter stack. `node` is the `Text` node
/// holding the literal delimiter run; its string length doubles as the
/// delimiter's remaining count, truncated from either end as "process
/// emphasis" consumes it.
struct Delimiter<'a> {
    node: &'a AstNode<'a>,
    delim_char: u8,
    can_open: bool,
    can_close: bool,
}

/// One entry in the `[`/`![` bracket stack, open until a matching `]` is
/// found (or parsing ends, leaving it a literal bracket forever).
struct Bracket<'a> {
    /// The `Text` node holding the literal `"["` or `"!["`.
    node: &'a AstNode<'a>,
    /// Index into `delimiters` at the time this bracket opened; bounds how
    /// far back "process emphasis" may look when this bracket's content is
    /// resolved.
    previous_delimiter: isize,
    /// Byte offset into `input` of the first character of this bracket's
    /// label/content, for the shortcut- and collapsed-reference fallback.
    text_start: usize,
    image: bool,
    /// A successful link match deactivates every *other* open non-image
    /// bracket (no links inside links); a deactivated bracket that's later
    /// closed always falls back to literal text.
    active: bool,
    /// Set once something else opens while this bracket is the innermost
    /// open one. A bracket with a nested bracket inside it never falls back
    /// to a shortcut/collapsed reference match (the label would be
    /// ambiguous).
    bracket_after: bool,
}

struct Subject<'a, 'i, 'r> {
    arena: &'a Arena<AstNode<'a>>,
    input: &'i str,
    pos: usize,
    refmap: &'r RefMap,
    delimiters: Vec<Delimiter<'a>>,
    brackets: Vec<Bracket<'a>>,
}

impl<'a, 'i, 'r> Subject<'a, 'i, 'r> {
    fn parse_into(&mut self, parent: &'a AstNode<'a>) {
        loop {
            let start = self.pos;
            match self.find_special_char() {
                Some(pos) => {
                    if pos > start {
                        self.push_str(parent, &self.input[start..pos]);
                    }
                    self.pos = pos;
                }
                None => {
                    if start < self.input.len() {
                        self.push_str(parent, &self.input[start..]);
                    }
                    self.pos = self.input.len();
                    break;
                }
            }

            match self.input.as_bytes()[self.pos] {
                b'\n' => self.handle_newline(parent),
                b'\\' => self.handle_backslash(parent),
                b'`' => self.handle_backticks(parent),
                b'&' => self.handle_entity(parent),
                b'<' => self.handle_pointy_brace(parent),
                c @ (b'*' | b'_') => self.handle_delim(c, parent),
                b'[' => self.handle_open_bracket(parent, false),
                b'!' => {
                    if self.input.as_bytes().get(self.pos + 1) == Some(&b'[') {
                        self.handle_open_bracket(parent, true);
                    } else {
                        self.push_str(parent, "!");
                        self.pos += 1;
                    }
                }
                b']' => self.handle_close_bracket(parent),
                _ => unreachable!("SPECIAL_BYTES admits only the bytes matched above"),
            }
        }

        self.process_emphasis(-1);
    }

    fn find_special_char(&self) -> Option<usize> {
        let bytes = self.input.as_bytes();
        (self.pos..bytes.len()).find(|&i| SPECIAL_BYTES[bytes[i] as usize])
    }

    // ---- node construction/appending ---------------------------------

    fn make_inline(&self, value: NodeValue) -> &'a AstNode<'a> {
        self.arena.alloc(AstNode::new(RefCell::new(Ast {
            value,
            content: String::new(),
            start_line: 0,
            open: false,
            last_line_blank: false,
        })))
    }

    /// Appends `s` as plain text, extending the previous sibling if it's
    /// also a bare `Text` node rather than allocating a new one.
    fn push_str(&mut self, parent: &'a AstNode<'a>, s: &str) {
        if s.is_empty() {
            return;
        }
        if let Some(last) = parent.last_child() {
            let mut ast = last.data.borrow_mut();
            if let NodeValue::Text(ref mut t) = ast.value {
                t.push_str(s);
                return;
            }
        }
        let node = self.make_inline(NodeValue::Text(s.to_owned()));
        parent.append(node);
    }

    /// Appends `s` as its own `Text` node, never merged with a neighbor.
    /// Used for delimiter runs and bracket markers, which later passes
    /// address and truncate by node identity.
    fn push_delim_text(&mut self, parent: &'a AstNode<'a>, s: &str) -> &'a AstNode<'a> {
        let node = self.make_inline(NodeValue::Text(s.to_owned()));
        parent.append(node);
        node
    }

    fn rtrim_last_text(&mut self, parent: &'a AstNode<'a>) {
        if let Some(last) = parent.last_child() {
            let mut ast = last.data.borrow_mut();
            if let NodeValue::Text(ref mut s) = ast.value {
                while s.ends_with(' ') || s.ends_with('\t') {
                    s.pop();
                }
            }
        }
    }

    // ---- simple one-character dispatches ------------------------------

    fn handle_newline(&mut self, parent: &'a AstNode<'a>) {
        let nlpos = self.pos;
        let bytes = self.input.as_bytes();
        let hard = nlpos >= 2 && bytes[nlpos - 2] == b' ' && bytes[nlpos - 1] == b' ';
        self.rtrim_last_text(parent);
        self.pos = nlpos + 1;
        self.pos += scanners::spacechars(&bytes[self.pos..]).unwrap_or(0);
        let value = if hard { NodeValue::LineBreak } else { NodeValue::SoftBreak };
        parent.append(self.make_inline(value));
    }

    fn handle_backslash(&mut self, parent: &'a AstNode<'a>) {
        self.pos += 1;
        let bytes = self.input.as_bytes();
        match bytes.get(self.pos) {
            Some(b'\n') => {
                self.pos += 1;
                self.pos += scanners::spacechars(&bytes[self.pos..]).unwrap_or(0);
                parent.append(self.make_inline(NodeValue::LineBreak));
            }
            Some(&c) if ispunct(c) => {
                self.push_str(parent, &self.input[self.pos..self.pos + 1]);
                self.pos += 1;
            }
            _ => self.push_str(parent, "\\"),
        }
    }

    fn handle_entity(&mut self, parent: &'a AstNode<'a>) {
        self.pos += 1;
        match entity::unescape(&self.input[self.pos..]) {
            Some((text, consumed)) => {
                self.push_str(parent, &text);
                self.pos += consumed;
            }
            None => self.push_str(parent, "&"),
        }
    }

    fn handle_backticks(&mut self, parent: &'a AstNode<'a>) {
        let bytes = self.input.as_bytes();
        let open_start = self.pos;
        let mut i = open_start;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let opener_len = i - open_start;

        let mut j = i;
        loop {
            while j < bytes.len() && bytes[j] != b'`' {
                j += 1;
            }
            if j >= bytes.len() {
                self.push_str(parent, &self.input[open_start..i]);
                self.pos = i;
                return;
            }
            let close_start = j;
            while j < bytes.len() && bytes[j] == b'`' {
                j += 1;
            }
            if j - close_start == opener_len {
                let code = strings::normalize_code(&self.input[i..close_start]);
                parent.append(self.make_inline(NodeValue::Code(NodeCode { literal: code })));
                self.pos = j;
                return;
            }
        }
    }

    fn handle_pointy_brace(&mut self, parent: &'a AstNode<'a>) {
        let bytes = self.input.as_bytes();
        let rest = &bytes[self.pos + 1..];

        if let Some(len) = scanners::autolink_uri(rest) {
            let content = self.input[self.pos + 1..self.pos + 1 + len].to_owned();
            self.push_autolink(parent, content.clone(), content);
            self.pos += len + 2;
            return;
        }
        if let Some(len) = scanners::autolink_email(rest) {
            let content = self.input[self.pos + 1..self.pos + 1 + len].to_owned();
            let url = format!("mailto:{}", content);
            self.push_autolink(parent, url, content);
            self.pos += len + 2;
            return;
        }
        if let Some(len) = scanners::html_tag(&bytes[self.pos..]) {
            let text = self.input[self.pos..self.pos + len].to_owned();
            parent.append(self.make_inline(NodeValue::HtmlInline(text)));
            self.pos += len;
            return;
        }

        self.push_str(parent, "<");
        self.pos += 1;
    }

    fn push_autolink(&mut self, parent: &'a AstNode<'a>, url: String, text: String) {
        let link = self.make_inline(NodeValue::Link(NodeLink { url, title: String::new() }));
        link.append(self.make_inline(NodeValue::Text(text)));
        parent.append(link);
    }

    // ---- emphasis ------------------------------------------------------

    fn scan_delims(&self, c: u8) -> (usize, bool, bool) {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start;
        while i < bytes.len() && bytes[i] == c {
            i += 1;
        }
        let numdelims = i - start;

        let before = if start == 0 { ' ' } else { char_before(self.input, start) };
        let after = if i >= bytes.len() { ' ' } else { char_at(self.input, i) };

        let before_ws = before.is_whitespace();
        let after_ws = after.is_whitespace();
        let before_punct = is_punct_char(before);
        let after_punct = is_punct_char(after);

        let left_flanking = !after_ws && !(after_punct && !before_ws && !before_punct);
        let right_flanking = !before_ws && !(before_punct && !after_ws && !after_punct);

        let (can_open, can_close) = if c == b'_' {
            (
                left_flanking && (!right_flanking || before_punct),
                right_flanking && (!left_flanking || after_punct),
            )
        } else {
            (left_flanking, right_flanking)
        };

        (numdelims, can_open, can_close)
    }

    fn handle_delim(&mut self, c: u8, parent: &'a AstNode<'a>) {
        let (numdelims, can_open, can_close) = self.scan_delims(c);
        let start = self.pos;
        self.pos += numdelims;
        let node = self.push_delim_text(parent, &self.input[start..self.pos]);
        if can_open || can_close {
            self.delimiters.push(Delimiter { node, delim_char: c, can_open, can_close });
        }
    }

    /// The pass-2 half of §6.5: resolves every matchable delimiter pair
    /// above `stack_bottom` into `Emph`/`Strong` wrappers. An opener/closer
    /// pair where either side also carries the opposite role is rejected
    /// under the "rule of 3" (odd_match) unless their summed length is not
    /// a multiple of 3, or both lengths are; rejected candidates are
    /// skipped in favor of an earlier opener. The `openers_bottom` cache,
    /// keyed on delimiter char and length mod 3, means a delimiter length
    /// already found to have no matching opener is never rescanned.
    fn process_emphasis(&mut self, stack_bottom: isize) {
        let mut openers_bottom: HashMap<(u8, usize), isize> = HashMap::new();
        let mut closer_idx = stack_bottom + 1;

        while (closer_idx as usize) < self.delimiters.len() {
            let closer_char = self.delimiters[closer_idx as usize].delim_char;
            if !self.delimiters[closer_idx as usize].can_close {
                closer_idx += 1;
                continue;
            }

            let closer_len = delim_len(self.delimiters[closer_idx as usize].node);
            let closer_can_open = self.delimiters[closer_idx as usize].can_open;
            let closer_rem3 = closer_len % 3;
            let bottom = *openers_bottom.get(&(closer_char, closer_rem3)).unwrap_or(&stack_bottom);

            let mut opener_idx = closer_idx - 1;
            let mut opener_found = false;
            while opener_idx > bottom {
                let d = &self.delimiters[opener_idx as usize];
                if d.delim_char == closer_char && d.can_open {
                    let opener_len = delim_len(d.node);
                    // Rule of 3 (§6.5): if either delimiter can play the
                    // opposite role too, a match is allowed only when the
                    // summed length isn't a multiple of 3, or both lengths
                    // are.
                    let odd_match = (closer_can_open || d.can_close)
                        && (opener_len + closer_len) % 3 == 0
                        && !(opener_len % 3 == 0 && closer_len % 3 == 0);
                    if !odd_match {
                        opener_found = true;
                        break;
                    }
                }
                opener_idx -= 1;
            }

            if !opener_found {
                openers_bottom.insert((closer_char, closer_rem3), closer_idx - 1);
                if !self.delimiters[closer_idx as usize].can_open {
                    self.delimiters.remove(closer_idx as usize);
                }
                closer_idx += 1;
                continue;
            }

            let opener_node = self.delimiters[opener_idx as usize].node;
            let closer_node = self.delimiters[closer_idx as usize].node;
            self.insert_emph(opener_node, closer_node);

            let opener_now_empty = delim_len(opener_node) == 0;
            let closer_now_empty = delim_len(closer_node) == 0;

            let mut i = closer_idx - 1;
            while i > opener_idx {
                self.delimiters.remove(i as usize);
                i -= 1;
            }
            closer_idx = opener_idx + 1;

            if opener_now_empty {
                self.delimiters.remove(opener_idx as usize);
                closer_idx -= 1;
            }
            if closer_now_empty {
                self.delimiters.remove(closer_idx as usize);
            }
            // Otherwise the same (partially consumed) closer is
            // reconsidered as a closer against an earlier opener.
        }

        self.delimiters.truncate((stack_bottom + 1).max(0) as usize);
    }

    /// Wraps everything between `opener_node` and `closer_node` in a new
    /// `Emph`/`Strong` node, consuming one delimiter from each end (two, if
    /// both sides have at least two characters left), detaching either node
    /// if it's now empty.
    fn insert_emph(&mut self, opener_node: &'a AstNode<'a>, closer_node: &'a AstNode<'a>) {
        let opener_num = delim_len(opener_node);
        let closer_num = delim_len(closer_node);
        let use_delims = if opener_num >= 2 && closer_num >= 2 { 2 } else { 1 };

        {
            let mut ast = opener_node.data.borrow_mut();
            if let NodeValue::Text(ref mut s) = ast.value {
                let new_len = s.len() - use_delims;
                s.truncate(new_len);
            }
        }
        {
            let mut ast = closer_node.data.borrow_mut();
            if let NodeValue::Text(ref mut s) = ast.value {
                s.drain(..use_delims);
            }
        }

        let value = if use_delims == 1 { NodeValue::Emph } else { NodeValue::Strong };
        let emph = self.make_inline(value);
        opener_node.insert_after(emph);

        let mut child = emph.next_sibling();
        while let Some(c) = child {
            if c.same_node(closer_node) {
                break;
            }
            let next = c.next_sibling();
            emph.append(c);
            child = next;
        }

        if delim_len(opener_node) == 0 {
            opener_node.detach();
        }
        if delim_len(closer_node) == 0 {
            closer_node.detach();
        }
    }

    // ---- links and images ----------------------------------------------

    fn handle_open_bracket(&mut self, parent: &'a AstNode<'a>, is_image: bool) {
        let marker = if is_image { "![" } else { "[" };
        self.pos += marker.len();
        let node = self.push_delim_text(parent, marker);
        if let Some(last) = self.brackets.last_mut() {
            last.bracket_after = true;
        }
        self.brackets.push(Bracket {
            node,
            previous_delimiter: self.delimiters.len() as isize - 1,
            text_start: self.pos,
            image: is_image,
            active: true,
            bracket_after: false,
        });
    }

    fn handle_close_bracket(&mut self, parent: &'a AstNode<'a>) {
        self.pos += 1;
        let bracket = match self.brackets.pop() {
            Some(b) => b,
            None => {
                self.push_str(parent, "]");
                return;
            }
        };

        if !bracket.active {
            self.push_str(parent, "]");
            return;
        }

        let initial_pos = self.pos;
        let mut result = self.try_inline_link();
        if result.is_none() {
            self.pos = initial_pos;
            result = self.try_reference_link(&bracket, initial_pos);
            if result.is_none() {
                self.pos = initial_pos;
            }
        }

        match result {
            Some((url, title)) => {
                self.close_bracket_match(&bracket, url, title);
                if !bracket.image {
                    for b in self.brackets.iter_mut() {
                        if !b.image {
                            b.active = false;
                        }
                    }
                }
            }
            None => self.push_str(parent, "]"),
        }
    }

    /// The `(destination "title")` form, immediately following `]`.
    fn try_inline_link(&mut self) -> Option<(String, String)> {
        let bytes = self.input.as_bytes();
        if bytes.get(self.pos) != Some(&b'(') {
            return None;
        }
        let save = self.pos;
        let mut p = self.pos + 1;
        p += scanners::spacechars(&bytes[p..]).unwrap_or(0);

        let (destination, mut p) = if bytes.get(p) == Some(&b')') {
            (String::new(), p)
        } else {
            match scanners::link_destination(&bytes[p..]) {
                Some(n) => (strings::clean_url(&self.input[p..p + n]), p + n),
                None => {
                    self.pos = save;
                    return None;
                }
            }
        };

        let mut title = String::new();
        let sp = scanners::spacechars(&bytes[p..]).unwrap_or(0);
        if sp > 0 {
            let after_space = p + sp;
            if let Some(tlen) = scanners::link_title(&bytes[after_space..]) {
                title = strings::clean_title(&self.input[after_space..after_space + tlen]);
                p = after_space + tlen;
            }
        }
        p += scanners::spacechars(&bytes[p..]).unwrap_or(0);

        if bytes.get(p) == Some(&b')') {
            self.pos = p + 1;
            Some((destination, title))
        } else {
            self.pos = save;
            None
        }
    }

    /// The full (`[label]`), collapsed (`[]`), and shortcut (nothing)
    /// reference forms.
    fn try_reference_link(&mut self, bracket: &Bracket<'a>, closer_pos: usize) -> Option<(String, String)> {
        let bytes = self.input.as_bytes();
        let mut label = None;

        if bytes.get(self.pos) == Some(&b'[') {
            if let Some(n) = scanners::link_label(&bytes[self.pos..]) {
                let raw = &self.input[self.pos + 1..self.pos + n - 1];
                label = Some(raw.to_owned());
                self.pos += n;
            } else if bytes.get(self.pos + 1) == Some(&b']') {
                self.pos += 2; // collapsed `[]`
            } else {
                // An unescaped `[` that never closes as a label invalidates
                // this reference entirely; it doesn't fall back to shortcut.
                return None;
            }
        }

        if label.is_none() {
            if bracket.bracket_after {
                return None;
            }
            let text = &self.input[bracket.text_start..closer_pos - 1];
            if strings::trim_slice(text).is_empty() {
                return None;
            }
            label = Some(text.to_owned());
        }

        self.refmap
            .lookup(label.as_deref().unwrap())
            .map(|(u, t)| (u.to_owned(), t.to_owned()))
    }

    fn close_bracket_match(&mut self, bracket: &Bracket<'a>, url: String, title: String) {
        self.process_emphasis(bracket.previous_delimiter);

        let value = if bracket.image {
            NodeValue::Image(NodeLink { url, title })
        } else {
            NodeValue::Link(NodeLink { url, title })
        };
        let wrap = self.make_inline(value);
        bracket.node.insert_after(wrap);

        let mut child = wrap.next_sibling();
        while let Some(c) = child {
            let next = c.next_sibling();
            wrap.append(c);
            child = next;
        }
        bracket.node.detach();
    }
}

fn char_at(s: &str, byte_pos: usize) -> char {
    s[byte_pos..].chars().next().unwrap()
}

fn char_before(s: &str, byte_pos: usize) -> char {
    s[..byte_pos].chars().next_back().unwrap()
}

fn is_punct_char(c: char) -> bool {
    c.is_punctuation() || c.is_symbol()
}

fn delim_len(node: &AstNode) -> usize {
    match node.data.borrow().value {
        NodeValue::Text(ref s) => s.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use crate::{markdown_to_html, Options};
    use pretty_assertions::assert_eq;

    fn html(src: &str) -> String {
        markdown_to_html(src, &Options::default())
    }

    #[test]
    fn emphasis_and_strong() {
        assert_eq!(html("a *b* c\n"), "<p>a <em>b</em> c</p>\n");
        assert_eq!(html("a **b** c\n"), "<p>a <strong>b</strong> c</p>\n");
        assert_eq!(html("a ***b*** c\n"), "<p>a <em><strong>b</strong></em> c</p>\n");
    }

    #[test]
    fn underscore_emphasis_respects_flanking() {
        assert_eq!(html("foo_bar_\n"), "<p>foo_bar_</p>\n");
        assert_eq!(html("_foo_ bar\n"), "<p><em>foo</em> bar</p>\n");
    }

    #[test]
    fn nested_emphasis_rule_of_three() {
        assert_eq!(html("**foo*bar*baz**\n"), "<p><strong>foo<em>bar</em>baz</strong></p>\n");
    }

    #[test]
    fn rule_of_three_rejects_odd_length_match() {
        // `**`(2) closing against `*`(1) sums to 3, a multiple of 3, and
        // neither side's length is itself a multiple of 3: the match is
        // forbidden, so the outer `**...**` must bind to the final `**`
        // instead of greedily consuming the first `*c*`.
        assert_eq!(
            html("a**b*c*d**e\n"),
            "<p>a<strong>b<em>c</em>d</strong>e</p>\n"
        );
    }

    #[test]
    fn code_spans_normalize_whitespace() {
        assert_eq!(html("`foo`\n"), "<p><code>foo</code></p>\n");
        assert_eq!(html("`` foo ` bar ``\n"), "<p><code>foo ` bar</code></p>\n");
        assert_eq!(html("`  `` `\n"), "<p><code> `` </code></p>\n");
    }

    #[test]
    fn unmatched_backticks_are_literal() {
        assert_eq!(html("``foo`\n"), "<p>``foo`</p>\n");
    }

    #[test]
    fn inline_link() {
        assert_eq!(
            html("[link](/uri \"title\")\n"),
            "<p><a href=\"/uri\" title=\"title\">link</a></p>\n"
        );
        assert_eq!(html("[link]()\n"), "<p><a href=\"\">link</a></p>\n");
    }

    #[test]
    fn reference_link_forms() {
        let full = "[foo][bar]\n\n[bar]: /url \"title\"\n";
        assert_eq!(html(full), "<p><a href=\"/url\" title=\"title\">foo</a></p>\n");

        let shortcut = "[foo]\n\n[foo]: /url\n";
        assert_eq!(html(shortcut), "<p><a href=\"/url\">foo</a></p>\n");

        let collapsed = "[foo][]\n\n[foo]: /url\n";
        assert_eq!(html(collapsed), "<p><a href=\"/url\">foo</a></p>\n");
    }

    #[test]
    fn no_links_inside_links() {
        assert_eq!(html("[a [b](/b) c](/a)\n"), "<p>[a <a href=\"/b\">b</a> c](/a)</p>\n");
    }

    #[test]
    fn image() {
        assert_eq!(
            html("![alt](/img.png \"t\")\n"),
            "<p><img src=\"/img.png\" alt=\"alt\" title=\"t\" /></p>\n"
        );
    }

    #[test]
    fn image_alt_text_is_plain_even_with_inline_markup() {
        assert_eq!(
            html("![foo *bar*](/u)\n"),
            "<p><img src=\"/u\" alt=\"foo bar\" /></p>\n"
        );
        assert_eq!(
            html("![foo `bar`](/u)\n"),
            "<p><img src=\"/u\" alt=\"foo bar\" /></p>\n"
        );
        assert_eq!(
            html("![a [b](/b) c](/u)\n"),
            "<p><img src=\"/u\" alt=\"a b c\" /></p>\n"
        );
    }

    #[test]
    fn autolinks() {
        assert_eq!(
            html("<https://example.com>\n"),
            "<p><a href=\"https://example.com\">https://example.com</a></p>\n"
        );
        assert_eq!(
            html("<foo@bar.com>\n"),
            "<p><a href=\"mailto:foo@bar.com\">foo@bar.com</a></p>\n"
        );
    }

    #[test]
    fn raw_html_inline_is_escaped_by_default() {
        assert_eq!(html("a <span>b</span> c\n"), "<p>a &lt;span&gt;b&lt;/span&gt; c</p>\n");
    }

    #[test]
    fn backslash_escapes() {
        assert_eq!(html("\\*not emphasized\\*\n"), "<p>*not emphasized*</p>\n");
        assert_eq!(html("\\# not a heading\n"), "<p># not a heading</p>\n");
    }

    #[test]
    fn entity_references() {
        assert_eq!(html("&amp; &#35; &#x22;\n"), "<p>&amp; # &quot;</p>\n");
    }

    #[test]
    fn hard_and_soft_breaks() {
        assert_eq!(html("a  \nb\n"), "<p>a<br />\nb</p>\n");
        assert_eq!(html("a\\\nb\n"), "<p>a<br />\nb</p>\n");
        assert_eq!(html("a\nb\n"), "<p>a\nb</p>\n");
    }
}
