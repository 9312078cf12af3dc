//! Renders a parsed document tree to HTML.
//!
//! Walks the arena tree depth-first, writing each node's opening tag on
//! entry and its closing tag on exit, the way a SAX-style visitor would.
//! Block elements always begin on their own line in the output; inline
//! elements never insert a line break the source didn't ask for.

pub mod context;

use std::fmt::{self, Write};

use crate::character_set::character_set;
use crate::nodes::{AstNode, ListType, NodeList, NodeValue};
use crate::parser::options::Options;
use crate::scanners;

pub use self::context::Context;

/// Renders `root` and everything beneath it to `output` as HTML.
pub fn format_document<'a>(
    root: &'a AstNode<'a>,
    options: &Options,
    output: &mut dyn Write,
) -> fmt::Result {
    let mut context = Context::new(output, options);
    format_node(&mut context, root)
}

fn format_node<'a>(context: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    if context.is_plain() {
        return format_node_plain(context, node);
    }
    render_open(context, node)?;
    for child in node.children() {
        format_node(context, child)?;
    }
    render_close(context, node)
}

/// Renders `node` as it should appear inside an image's `alt` attribute
/// (§4.6): only the text content survives — no tags, no nested attributes
/// — with line breaks collapsed to a single space.
fn format_node_plain<'a>(context: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    match node.data.borrow().value {
        NodeValue::Text(ref literal) => context.escape(literal)?,
        NodeValue::Code(ref code) => context.escape(&code.literal)?,
        NodeValue::HtmlInline(ref literal) => context.escape(literal)?,
        NodeValue::LineBreak | NodeValue::SoftBreak => context.write_str(" ")?,
        _ => {}
    }
    for child in node.children() {
        format_node_plain(context, child)?;
    }
    Ok(())
}

fn render_open<'a>(context: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    match node.data.borrow().value {
        NodeValue::Document => (),
        NodeValue::BlockQuote => {
            context.cr()?;
            context.write_str("<blockquote>\n")?;
        }
        NodeValue::List(ref nl) => render_list_open(context, nl)?,
        NodeValue::Item(_) => {
            context.cr()?;
            context.write_str("<li>")?;
        }
        NodeValue::Heading(ref nch) => {
            context.cr()?;
            write!(context, "<h{}>", nch.level)?;
        }
        NodeValue::Paragraph => {
            if !paragraph_is_tight(node) {
                context.cr()?;
                context.write_str("<p>")?;
            }
        }
        NodeValue::CodeBlock(ref ncb) => {
            context.cr()?;

            let first_tag = ncb.info.split(' ').next().unwrap_or("");
            if first_tag.is_empty() {
                context.write_str("<pre><code>")?;
            } else if context.options.github_pre_lang {
                context.write_str("<pre lang=\"")?;
                context.escape(first_tag)?;
                context.write_str("\"><code>")?;
            } else {
                context.write_str("<pre><code class=\"language-")?;
                context.escape(first_tag)?;
                context.write_str("\">")?;
            }
            context.escape(&ncb.literal)?;
            context.write_str("</code></pre>\n")?;
        }
        NodeValue::HtmlBlock(ref nhb) => {
            context.cr()?;
            if context.options.unsafe_ {
                context.write_str(&nhb.literal)?;
            } else {
                context.write_str("<!-- raw HTML omitted -->")?;
            }
            context.cr()?;
        }
        NodeValue::ThematicBreak => {
            context.cr()?;
            context.write_str("<hr />\n")?;
        }
        NodeValue::LinkReferenceDefinition(_) => (),
        NodeValue::Text(ref literal) => context.escape(literal)?,
        NodeValue::Code(ref code) => {
            context.write_str("<code>")?;
            context.escape(&code.literal)?;
            context.write_str("</code>")?;
        }
        NodeValue::Emph => context.write_str("<em>")?,
        NodeValue::Strong => context.write_str("<strong>")?,
        NodeValue::Link(ref nl) => {
            context.write_str("<a href=\"")?;
            if context.options.unsafe_ || !scanners::dangerous_url(&nl.url) {
                context.escape_href(&nl.url)?;
            }
            if !nl.title.is_empty() {
                context.write_str("\" title=\"")?;
                context.escape(&nl.title)?;
            }
            context.write_str("\">")?;
        }
        NodeValue::Image(ref nl) => {
            context.write_str("<img src=\"")?;
            if context.options.unsafe_ || !scanners::dangerous_url(&nl.url) {
                context.escape_href(&nl.url)?;
            }
            context.write_str("\" alt=\"")?;
            context.set_plain(true);
        }
        NodeValue::HtmlInline(ref literal) => {
            if context.options.unsafe_ {
                context.write_str(literal)?;
            } else {
                context.write_str("&lt;")?;
                context.escape(&literal[1..])?;
            }
        }
        NodeValue::LineBreak => context.write_str("<br />\n")?,
        NodeValue::SoftBreak => {
            if context.options.hardbreaks {
                context.write_str("<br />\n")?;
            } else {
                context.write_str("\n")?;
            }
        }
    }

    Ok(())
}

fn render_close<'a>(context: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    match node.data.borrow().value {
        NodeValue::Document
        | NodeValue::LinkReferenceDefinition(_)
        | NodeValue::CodeBlock(_)
        | NodeValue::ThematicBreak
        | NodeValue::Text(_)
        | NodeValue::Code(_)
        | NodeValue::HtmlInline(_)
        | NodeValue::LineBreak
        | NodeValue::SoftBreak => (),
        NodeValue::BlockQuote => {
            context.cr()?;
            context.write_str("</blockquote>\n")?;
        }
        NodeValue::List(ref nl) => render_list_close(context, nl)?,
        NodeValue::Item(_) => context.write_str("</li>\n")?,
        NodeValue::Heading(ref nch) => writeln!(context, "</h{}>", nch.level)?,
        NodeValue::Paragraph => {
            if !paragraph_is_tight(node) {
                context.write_str("</p>\n")?;
            }
        }
        NodeValue::HtmlBlock(_) => (),
        NodeValue::Emph => context.write_str("</em>")?,
        NodeValue::Strong => context.write_str("</strong>")?,
        NodeValue::Link(_) => context.write_str("</a>")?,
        NodeValue::Image(ref nl) => {
            context.set_plain(false);
            if !nl.title.is_empty() {
                context.write_str("\" title=\"")?;
                context.escape(&nl.title)?;
            }
            context.write_str("\" />")?;
        }
    }

    Ok(())
}

/// A paragraph renders without `<p>` tags when its grandparent list item is
/// part of a tight list.
fn paragraph_is_tight<'a>(node: &'a AstNode<'a>) -> bool {
    node.parent()
        .and_then(|n| n.parent())
        .map_or(false, |n| match n.data.borrow().value {
            NodeValue::List(ref nl) => nl.tight,
            _ => false,
        })
}

fn render_list_open(context: &mut Context, nl: &NodeList) -> fmt::Result {
    context.cr()?;
    match nl.list_type {
        ListType::Bullet => context.write_str("<ul>\n")?,
        ListType::Ordered => {
            if nl.start == 1 {
                context.write_str("<ol>\n")?;
            } else {
                writeln!(context, "<ol start=\"{}\">", nl.start)?;
            }
        }
    }
    Ok(())
}

fn render_list_close(context: &mut Context, nl: &NodeList) -> fmt::Result {
    match nl.list_type {
        ListType::Bullet => context.write_str("</ul>\n")?,
        ListType::Ordered => context.write_str("</ol>\n")?,
    }
    Ok(())
}

const HREF_SAFE: [bool; 256] = character_set!(
    b"-_.+!*'(),%#@?=;:/,+$~abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789&"
);

/// Escapes `"`, `&`, `<` and `>` for use in text content or attribute
/// values.
pub fn escape(output: &mut dyn Write, buffer: &str) -> fmt::Result {
    let bytes = buffer.as_bytes();
    let mut offset = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let replacement = match byte {
            b'"' => Some("&quot;"),
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'>' => Some("&gt;"),
            _ => None,
        };

        if let Some(replacement) = replacement {
            output.write_str(&buffer[offset..i])?;
            output.write_str(replacement)?;
            offset = i + 1;
        }
    }

    output.write_str(&buffer[offset..])
}

/// Escapes a URL for use in an `href`/`src` attribute. Bytes outside the
/// conservative safe set are percent-encoded; `%` itself is treated as safe
/// so an already-percent-encoded URL isn't double-encoded.
pub fn escape_href(output: &mut dyn Write, buffer: &str) -> fmt::Result {
    let bytes = buffer.as_bytes();
    let mut offset = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if byte == b'&' {
            output.write_str(&buffer[offset..i])?;
            output.write_str("&amp;")?;
            offset = i + 1;
        } else if !HREF_SAFE[byte as usize] {
            output.write_str(&buffer[offset..i])?;
            write!(output, "%{:02X}", byte)?;
            offset = i + 1;
        }
    }

    output.write_str(&buffer[offset..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escapes_ampersand_only_once() {
        let mut out = String::new();
        escape(&mut out, "Smith & Co. <tags> \"quoted\"").unwrap();
        assert_eq!(out, "Smith &amp; Co. &lt;tags&gt; &quot;quoted&quot;");
    }

    #[test]
    fn escape_href_preserves_existing_percent_encoding() {
        let mut out = String::new();
        escape_href(&mut out, "/a%20b?x=1&y=2").unwrap();
        assert_eq!(out, "/a%20b?x=1&amp;y=2");
    }

    #[test]
    fn escape_href_encodes_unsafe_bytes() {
        let mut out = String::new();
        escape_href(&mut out, "/a b").unwrap();
        assert_eq!(out, "/a%20b");
    }
}
