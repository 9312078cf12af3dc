use crate::html;
use crate::parser::options::Options;

use std::cell::Cell;
use std::fmt::{self, Write};

/// Threaded through every node-rendering call. Output is appended through
/// this struct's [`Write`] impl so helpers can use `write!`/`writeln!`
/// directly.
pub struct Context<'o> {
    output: &'o mut dyn Write,
    last_was_lf: Cell<bool>,
    plain: Cell<bool>,

    /// The [`Options`] in effect for this render.
    pub options: &'o Options,
}

impl<'o> Context<'o> {
    pub(super) fn new(output: &'o mut dyn Write, options: &'o Options) -> Self {
        Context {
            output,
            last_was_lf: Cell::new(true),
            plain: Cell::new(false),
            options,
        }
    }

    /// Whether rendering is currently inside a "plain" subtree (image alt
    /// text): markup-producing nodes contribute only their escaped text,
    /// never their own tags.
    pub(super) fn is_plain(&self) -> bool {
        self.plain.get()
    }

    pub(super) fn set_plain(&self, plain: bool) {
        self.plain.set(plain);
    }

    /// Writes a newline unless the output is already at the start of a
    /// line. Used between block elements, which always begin on their own
    /// line in the rendered HTML.
    pub fn cr(&mut self) -> fmt::Result {
        if !self.last_was_lf.get() {
            self.write_str("\n")?;
        }
        Ok(())
    }

    /// Convenience wrapper for [`html::escape`].
    pub fn escape(&mut self, buffer: &str) -> fmt::Result {
        html::escape(self, buffer)
    }

    /// Convenience wrapper for [`html::escape_href`].
    pub fn escape_href(&mut self, buffer: &str) -> fmt::Result {
        html::escape_href(self, buffer)
    }
}

impl<'o> Write for Context<'o> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(last) = s.as_bytes().last() {
            self.last_was_lf.set(*last == b'\n');
        }
        self.output.write_str(s)
    }
}

impl<'o> fmt::Debug for Context<'o> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("<marktree::html::Context>")
    }
}
