//! A CommonMark 0.29 Markdown parser and HTML renderer.
//!
//! The two entry points that matter are [`parse_document`], which turns a
//! Markdown string into a [`nodes::AstNode`] tree, and [`format_document`],
//! which walks that tree and writes HTML. Everything else in this crate
//! (the scanners, the block builder, the inline delimiter-stack algorithm,
//! the entity table) exists to make those two functions correct.
//!
//! ```
//! use marktree::{parse_document, format_document, Options};
//! use typed_arena::Arena;
//!
//! let arena = Arena::new();
//! let options = Options::default();
//! let root = parse_document(&arena, "Hello *world*.\n", &options);
//! let mut output = String::new();
//! format_document(root, &options, &mut output).unwrap();
//! assert_eq!(output, "<p>Hello <em>world</em>.</p>\n");
//! ```

#![allow(clippy::too_many_arguments)]

mod arena_tree;
mod character_set;
mod ctype;
mod entity;
mod error;
mod html;
mod line_scanner;
mod nodes;
mod parser;
mod scanners;
mod strings;

#[cfg(test)]
mod tests;

use std::io::{Read, Write as IoWrite};

use typed_arena::Arena;

pub use error::Error;
pub use html::format_document;
pub use nodes::{AstNode, NodeValue};
pub use parser::options::Options;
pub use parser::parse_document;

/// Parses `buffer` and renders it straight to an HTML string.
///
/// Convenience wrapper around [`parse_document`] and [`format_document`]
/// for callers who don't need to inspect or mutate the tree in between.
///
/// ```
/// # use marktree::{markdown_to_html, Options};
/// assert_eq!(
///     markdown_to_html("# Hi\n", &Options::default()),
///     "<h1>Hi</h1>\n"
/// );
/// ```
pub fn markdown_to_html(source: &str, options: &Options) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, source, options);
    let mut output = String::new();
    format_document(root, options, &mut output).expect("String writer is infallible");
    output
}

/// Reads UTF-8 Markdown from `reader` in full and parses it.
///
/// The only way this fails is a reader error or invalid UTF-8; the parse
/// itself is infallible once the bytes are in hand (§7: Markdown has no
/// syntax errors).
pub fn parse_document_from_reader<'a, R: Read>(
    arena: &'a Arena<AstNode<'a>>,
    reader: &mut R,
    options: &Options,
) -> Result<&'a AstNode<'a>, Error> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    Ok(parse_document(arena, &buffer, options))
}

/// Renders `root` to `writer` as HTML, propagating I/O failures.
pub fn render_document_to_writer<'a, W: IoWrite>(
    root: &'a AstNode<'a>,
    options: &Options,
    writer: &mut W,
) -> Result<(), Error> {
    let mut output = String::new();
    format_document(root, options, &mut output)
        .map_err(|_| Error::InternalInvariantViolation("format_document wrote invalid UTF-8"))?;
    writer.write_all(output.as_bytes())?;
    Ok(())
}
