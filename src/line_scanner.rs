//! Splits input into newline-terminated lines and lets the block builder
//! push a line back when it decides, after the fact, that the line
//! actually belongs to whichever container it hands it back to.
//!
//! `\r\n` is normalized to `\n`; a final line with no trailing newline gets
//! one synthesized so every line the builder sees ends in `\n`.

pub struct LineScanner<'a> {
    rest: &'a str,
    pushed_back: Vec<String>,
}

impl<'a> LineScanner<'a> {
    pub fn new(input: &'a str) -> Self {
        LineScanner {
            rest: input,
            pushed_back: Vec::new(),
        }
    }

    /// Returns the next line, `\n`-terminated, or `None` at end of input.
    pub fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.pushed_back.pop() {
            return Some(line);
        }

        if self.rest.is_empty() {
            return None;
        }

        let (line, remainder) = match self.rest.find('\n') {
            Some(idx) => (&self.rest[..=idx], &self.rest[idx + 1..]),
            None => (self.rest, ""),
        };
        self.rest = remainder;

        let body = line.strip_suffix("\r\n").or_else(|| line.strip_suffix('\n')).unwrap_or(line);
        let mut owned = body.to_string();
        owned.push('\n');
        Some(owned)
    }

    /// Un-consumes `line`, so the next call to [`next_line`] returns it
    /// again. May be called more than once to push back several lines;
    /// they come back out in LIFO order.
    pub fn push_back(&mut self, line: String) {
        self.pushed_back.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_and_retains_newlines() {
        let mut s = LineScanner::new("a\nb\n");
        assert_eq!(s.next_line().as_deref(), Some("a\n"));
        assert_eq!(s.next_line().as_deref(), Some("b\n"));
        assert_eq!(s.next_line(), None);
    }

    #[test]
    fn normalizes_crlf() {
        let mut s = LineScanner::new("a\r\nb\r\n");
        assert_eq!(s.next_line().as_deref(), Some("a\n"));
        assert_eq!(s.next_line().as_deref(), Some("b\n"));
    }

    #[test]
    fn synthesizes_trailing_newline() {
        let mut s = LineScanner::new("a\nb");
        assert_eq!(s.next_line().as_deref(), Some("a\n"));
        assert_eq!(s.next_line().as_deref(), Some("b\n"));
        assert_eq!(s.next_line(), None);
    }

    #[test]
    fn push_back_is_lifo() {
        let mut s = LineScanner::new("a\nb\nc\n");
        let first = s.next_line().unwrap();
        let second = s.next_line().unwrap();
        s.push_back(second.clone());
        s.push_back(first.clone());
        assert_eq!(s.next_line().unwrap(), first);
        assert_eq!(s.next_line().unwrap(), second);
        assert_eq!(s.next_line().unwrap(), "c\n");
    }
}
