//! Stateless block- and inline-opener recognizers.
//!
//! Every scanner here is a pure function over a `&[u8]` slice (one input
//! line, or the inline cursor's remaining text) returning the length of the
//! match, or `None`. None of them allocate; the caller is responsible for
//! slicing out and owning whatever text the match covers. This mirrors the
//! teacher's hand-rolled (pre-`pest`) scanner style, reaching for `jetscii`
//! for the one-byte-class searches worth the SIMD lookup table.

use crate::ctype::isspace;
use jetscii::ascii_chars;

/// `***`, `---`, `___`, optionally interleaved with spaces/tabs, 3 or more
/// of the same character, nothing else but line end.
pub fn thematic_break(line: &[u8]) -> Option<usize> {
    let c = *line.first()?;
    if c != b'*' && c != b'-' && c != b'_' {
        return None;
    }
    let mut count = 0;
    let mut i = 0;
    while i < line.len() {
        match line[i] {
            ch if ch == c => count += 1,
            b' ' | b'\t' => {}
            b'\r' | b'\n' => break,
            _ => return None,
        }
        i += 1;
    }
    if count >= 3 {
        Some(i)
    } else {
        None
    }
}

/// `#`{1,6} followed by a space, tab, or line end. Returns the length of
/// the opening run plus the one separator character, if any (the caller
/// strips it and any trailing closing sequence itself).
pub fn atx_heading_start(line: &[u8]) -> Option<usize> {
    if line.first() != Some(&b'#') {
        return None;
    }
    let mut level = 0;
    while level < line.len() && level < 6 && line[level] == b'#' {
        level += 1;
    }
    if level < line.len() && line[level] == b'#' {
        // a 7th consecutive `#`: not a heading.
        return None;
    }
    match line.get(level) {
        None => Some(level),
        Some(b' ') | Some(b'\t') => Some(level + 1),
        Some(b'\r') | Some(b'\n') => Some(level),
        _ => None,
    }
}

pub enum SetextChar {
    Equals,
    Hyphen,
}

/// A line consisting only of `=` or only of `-`, optionally followed by
/// trailing spaces/tabs.
pub fn setext_heading_line(line: &[u8]) -> Option<SetextChar> {
    let c = *line.first()?;
    if c != b'=' && c != b'-' {
        return None;
    }
    let mut i = 0;
    while i < line.len() && line[i] == c {
        i += 1;
    }
    while i < line.len() && (line[i] == b' ' || line[i] == b'\t') {
        i += 1;
    }
    let ok = matches!(line.get(i), None | Some(b'\r') | Some(b'\n'));
    if !ok {
        return None;
    }
    Some(if c == b'=' {
        SetextChar::Equals
    } else {
        SetextChar::Hyphen
    })
}

/// 3+ backticks or 3+ tildes at the start of the line. Returns the fence
/// length; the caller reads the info string from the rest of the line.
pub fn open_code_fence(line: &[u8]) -> Option<usize> {
    let c = *line.first()?;
    if c != b'`' && c != b'~' {
        return None;
    }
    let mut i = 0;
    while i < line.len() && line[i] == c {
        i += 1;
    }
    if i >= 3 {
        Some(i)
    } else {
        None
    }
}

/// A closing fence: same character as the opener, at least as long, with
/// only trailing spaces/tabs following (0-3 leading spaces already stripped
/// by the caller per the container-continuation indent budget).
pub fn close_code_fence(line: &[u8], fence_char: u8, fence_length: usize) -> bool {
    let mut i = 0;
    while i < line.len() && line[i] == fence_char {
        i += 1;
    }
    if i < fence_length {
        return false;
    }
    line[i..]
        .iter()
        .all(|&b| b == b' ' || b == b'\t' || b == b'\r' || b == b'\n')
}

/// HTML-block start conditions 1-7 (CommonMark 4.6). Returns the matched
/// condition number.
pub fn html_block_start(line: &[u8]) -> Option<usize> {
    if line.first() != Some(&b'<') {
        return None;
    }

    let starts_with_ci = |tag: &[u8]| -> bool {
        line.len() >= tag.len()
            && line[..tag.len()]
                .iter()
                .zip(tag)
                .all(|(&a, &b)| a.to_ascii_lowercase() == b)
    };

    const COND1: &[&[u8]] = &[b"<script", b"<pre", b"<style", b"<textarea"];
    for tag in COND1 {
        if starts_with_ci(tag) {
            let after = line.get(tag.len()).copied();
            if after.is_none()
                || matches!(
                    after,
                    Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'>')
                )
            {
                return Some(1);
            }
        }
    }

    if line.starts_with(b"<!--") {
        return Some(2);
    }
    if line.starts_with(b"<?") {
        return Some(3);
    }
    if line.len() >= 3 && line[1] == b'!' && line[2].is_ascii_alphabetic() {
        return Some(4);
    }
    if line.starts_with(b"<![CDATA[") {
        return Some(5);
    }

    if line.get(1) == Some(&b'/') || line.get(1).map_or(false, u8::is_ascii_alphabetic) {
        if let Some(end) = html_tag_name_end(line) {
            let name_start = if line.get(1) == Some(&b'/') { 2 } else { 1 };
            let name = &line[name_start..end];
            if is_html_block_tag_6(name) {
                let after = line.get(end).copied();
                let closes_self = after == Some(b'/') && line.get(end + 1) == Some(&b'>');
                if after.is_none()
                    || matches!(
                        after,
                        Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'>')
                    )
                    || closes_self
                {
                    return Some(6);
                }
            }
        }
    }

    if html_block_start_7(line).is_some() {
        return Some(7);
    }

    None
}

/// Start condition 7: a complete open or close tag, and nothing but
/// whitespace for the rest of the line; may not interrupt a paragraph.
pub fn html_block_start_7(line: &[u8]) -> Option<usize> {
    let (end, _is_close) = scan_complete_tag(line)?;
    let rest = &line[end..];
    if rest
        .iter()
        .all(|&b| b == b' ' || b == b'\t' || b == b'\r' || b == b'\n')
    {
        Some(7)
    } else {
        None
    }
}

fn html_tag_name_end(line: &[u8]) -> Option<usize> {
    let start = if line.get(1) == Some(&b'/') { 2 } else { 1 };
    if !line.get(start).map_or(false, u8::is_ascii_alphabetic) {
        return None;
    }
    let mut i = start + 1;
    while i < line.len() && (line[i].is_ascii_alphanumeric() || line[i] == b'-') {
        i += 1;
    }
    Some(i)
}

const BLOCK_TAGS_6: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

fn is_html_block_tag_6(name: &[u8]) -> bool {
    std::str::from_utf8(name)
        .map(|s| {
            let lower = s.to_ascii_lowercase();
            BLOCK_TAGS_6.binary_search(&lower.as_str()).is_ok()
        })
        .unwrap_or(false)
}

/// End condition for start type 1 (script/pre/style/textarea): a line
/// containing the matching closing tag, case-insensitively.
pub fn html_block_end_1(line: &[u8]) -> bool {
    ci_contains(line, b"</script>")
        || ci_contains(line, b"</pre>")
        || ci_contains(line, b"</style>")
        || ci_contains(line, b"</textarea>")
}

pub fn html_block_end_2(line: &[u8]) -> bool {
    contains(line, b"-->")
}

pub fn html_block_end_3(line: &[u8]) -> bool {
    contains(line, b"?>")
}

pub fn html_block_end_4(line: &[u8]) -> bool {
    ascii_chars!('>').find(line).is_some()
}

pub fn html_block_end_5(line: &[u8]) -> bool {
    contains(line, b"]]>")
}

fn contains(hay: &[u8], needle: &[u8]) -> bool {
    hay.windows(needle.len()).any(|w| w == needle)
}

fn ci_contains(hay: &[u8], needle: &[u8]) -> bool {
    if needle.len() > hay.len() {
        return false;
    }
    hay.windows(needle.len())
        .any(|w| w.iter().zip(needle).all(|(&a, &b)| a.to_ascii_lowercase() == b))
}

/// A run of spaces and/or tabs at the cursor.
pub fn spacechars(line: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < line.len() && matches!(line[i], b' ' | b'\t' | b'\r' | b'\n') {
        i += 1;
    }
    if i > 0 {
        Some(i)
    } else {
        None
    }
}

/// A link title: `"..."`, `'...'`, or `(...)`, possibly spanning one line
/// ending, with backslash-escapes respected. Returns the length of the
/// title including its delimiters.
pub fn link_title(line: &[u8]) -> Option<usize> {
    let open = *line.first()?;
    let close = match open {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };

    let mut i = 1;
    let mut nest = 0usize;
    while i < line.len() {
        match line[i] {
            b'\\' if i + 1 < line.len() && crate::ctype::ispunct(line[i + 1]) => i += 2,
            b'(' if open == b'(' => {
                nest += 1;
                i += 1;
            }
            c if c == close => {
                if open == b'(' {
                    if nest == 0 {
                        return Some(i + 1);
                    }
                    nest -= 1;
                    i += 1;
                } else {
                    return Some(i + 1);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// A URI autolink scheme: 2-32 ASCII letters/digits/`+`/`.`/`-`, first
/// character a letter, immediately followed by `:`.
pub fn scheme(line: &[u8]) -> Option<usize> {
    if line.is_empty() || !line[0].is_ascii_alphabetic() {
        return None;
    }
    let mut i = 1;
    while i < line.len()
        && i < 32
        && matches!(line[i], b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'+' | b'.' | b'-')
    {
        i += 1;
    }
    if (2..=32).contains(&i) && line.get(i) == Some(&b':') {
        Some(i + 1)
    } else {
        None
    }
}

/// `scheme:rest` where `rest` contains no ASCII control characters, `<`,
/// `>`, or whitespace, up to the first `>`.
pub fn autolink_uri(line: &[u8]) -> Option<usize> {
    let scheme_len = scheme(line)?;
    let mut i = scheme_len;
    while i < line.len() {
        match line[i] {
            b'>' => return Some(i),
            b'<' => return None,
            c if c < 0x20 || isspace(c) => return None,
            _ => i += 1,
        }
    }
    None
}

/// The email autolink grammar from CommonMark 6.9: a restricted local-part,
/// `@`, and a dot-separated run of label groups, up to the first `>`.
pub fn autolink_email(line: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < line.len() && is_email_local_char(line[i]) {
        i += 1;
    }
    if i == 0 || line.get(i) != Some(&b'@') {
        return None;
    }
    i += 1;

    loop {
        let label_start = i;
        let mut j = i;
        while j < line.len() && is_label_char(line[j]) {
            j += 1;
        }
        if j == label_start || !line[label_start].is_ascii_alphanumeric() {
            return None;
        }
        if line[j - 1] == b'-' {
            return None;
        }
        i = j;
        if line.get(i) == Some(&b'.') {
            i += 1;
            continue;
        }
        break;
    }

    if line.get(i) == Some(&b'>') {
        Some(i)
    } else {
        None
    }
}

fn is_email_local_char(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            b'.' | b'!'
                | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'/'
                | b'='
                | b'?'
                | b'^'
                | b'_'
                | b'`'
                | b'{'
                | b'|'
                | b'}'
                | b'~'
                | b'-'
        )
}

fn is_label_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-'
}

/// A raw HTML tag (open, close, comment, processing instruction,
/// declaration, or CDATA section) starting at the cursor. Returns its
/// length, `<` through `>` inclusive.
pub fn html_tag(line: &[u8]) -> Option<usize> {
    if line.first() != Some(&b'<') {
        return None;
    }

    if line.starts_with(b"<!--") {
        return scan_comment(line);
    }
    if line.starts_with(b"<?") {
        return find(line, b"?>").map(|end| end + 2);
    }
    if line.starts_with(b"<![CDATA[") {
        return find(line, b"]]>").map(|end| end + 3);
    }
    if line.len() > 2 && line[1] == b'!' && line[2].is_ascii_alphabetic() {
        return find(line, b">").map(|end| end + 1);
    }

    scan_complete_tag(line).map(|(end, _)| end)
}

/// Scans an open or close tag (no processing instructions/comments/etc.),
/// returning its end offset and whether it was a closing tag.
fn scan_complete_tag(line: &[u8]) -> Option<(usize, bool)> {
    if line.first() != Some(&b'<') {
        return None;
    }
    let is_close = line.get(1) == Some(&b'/');
    let name_start = if is_close { 2 } else { 1 };
    if !line.get(name_start).map_or(false, u8::is_ascii_alphabetic) {
        return None;
    }
    let mut i = name_start + 1;
    while i < line.len() && (line[i].is_ascii_alphanumeric() || line[i] == b'-') {
        i += 1;
    }

    if is_close {
        while i < line.len() && isspace(line[i]) {
            i += 1;
        }
        return if line.get(i) == Some(&b'>') {
            Some((i + 1, true))
        } else {
            None
        };
    }

    loop {
        let mut ws = 0;
        while i < line.len() && isspace(line[i]) {
            i += 1;
            ws += 1;
        }
        match line.get(i) {
            Some(b'/') if line.get(i + 1) == Some(&b'>') => return Some((i + 2, false)),
            Some(b'>') => return Some((i + 1, false)),
            Some(c) if ws > 0 && (c.is_ascii_alphabetic() || matches!(c, b'_' | b':')) => {
                i += 1;
                while i < line.len()
                    && (line[i].is_ascii_alphanumeric() || matches!(line[i], b'_' | b'.' | b':' | b'-'))
                {
                    i += 1;
                }
                let mut k = i;
                while k < line.len() && isspace(line[k]) {
                    k += 1;
                }
                if line.get(k) == Some(&b'=') {
                    k += 1;
                    while k < line.len() && isspace(line[k]) {
                        k += 1;
                    }
                    match line.get(k) {
                        Some(&q @ (b'"' | b'\'')) => {
                            let val_start = k + 1;
                            let end = line[val_start..].iter().position(|&b| b == q)?;
                            i = val_start + end + 1;
                        }
                        Some(_) => {
                            let val_start = k;
                            let mut e = val_start;
                            while e < line.len()
                                && !isspace(line[e])
                                && line[e] != b'>'
                                && line[e] != b'<'
                                && line[e] != b'='
                            {
                                e += 1;
                            }
                            if e == val_start {
                                return None;
                            }
                            i = e;
                        }
                        None => return None,
                    }
                } else {
                    i = k;
                }
            }
            _ => return None,
        }
    }
}

fn scan_comment(line: &[u8]) -> Option<usize> {
    // Text must not start with `>` or `->`, end with `-`, or contain `--`.
    let inner = &line[4..];
    if inner.first() == Some(&b'>') || inner.starts_with(b"->") {
        return None;
    }
    let mut i = 0;
    while i + 1 < inner.len() {
        if inner[i] == b'-' && inner[i + 1] == b'-' {
            return if inner[i..].starts_with(b"-->") {
                Some(4 + i + 3)
            } else {
                None
            };
        }
        i += 1;
    }
    None
}

fn find(hay: &[u8], needle: &[u8]) -> Option<usize> {
    hay.windows(needle.len()).position(|w| w == needle)
}

/// A bullet list marker: `-`, `+`, or `*`, not itself ambiguous with a
/// thematic break (the caller tries thematic break first). Returns the
/// marker character and the length consumed (1).
pub fn list_bullet_marker(line: &[u8]) -> Option<(u8, usize)> {
    match line.first() {
        Some(&c @ (b'-' | b'+' | b'*')) => Some((c, 1)),
        _ => None,
    }
}

/// An ordered list marker: 1-9 ASCII digits, then `.` or `)`. Returns the
/// start number, the delimiter byte, and the length consumed.
pub fn list_ordered_marker(line: &[u8]) -> Option<(u32, u8, usize)> {
    let mut i = 0;
    while i < line.len() && i < 9 && line[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return None;
    }
    match line.get(i) {
        Some(&c @ (b'.' | b')')) => {
            let start: u32 = std::str::from_utf8(&line[..i]).unwrap().parse().unwrap_or(0);
            Some((start, c, i + 1))
        }
        _ => None,
    }
}

/// A link destination: either `<...>` (no unescaped `<`, `>`, or newline
/// inside) or a bare destination (balanced parentheses, ends at the first
/// unescaped whitespace or unbalanced `)`). Returns the length consumed;
/// the caller resolves escapes/entities via [`crate::strings::clean_url`].
pub fn link_destination(line: &[u8]) -> Option<usize> {
    if line.first() == Some(&b'<') {
        let mut i = 1;
        while i < line.len() {
            match line[i] {
                b'\\' if i + 1 < line.len() && crate::ctype::ispunct(line[i + 1]) => i += 2,
                b'>' => return Some(i + 1),
                b'<' | b'\n' => return None,
                _ => i += 1,
            }
        }
        return None;
    }

    let mut i = 0;
    let mut nest = 0usize;
    while i < line.len() {
        match line[i] {
            b'\\' if i + 1 < line.len() && crate::ctype::ispunct(line[i + 1]) => i += 2,
            b'(' => {
                nest += 1;
                i += 1;
            }
            b')' => {
                if nest == 0 {
                    break;
                }
                nest -= 1;
                i += 1;
            }
            c if isspace(c) || c < 0x20 => break,
            _ => i += 1,
        }
    }
    if i == 0 || nest > 0 {
        None
    } else {
        Some(i)
    }
}

/// A link label: `[...]`, at most 999 characters inside the brackets, no
/// unescaped `[` or `]`. Returns the length consumed including both
/// brackets.
pub fn link_label(line: &[u8]) -> Option<usize> {
    if line.first() != Some(&b'[') {
        return None;
    }
    let mut i = 1;
    let mut len = 0;
    while i < line.len() {
        match line[i] {
            b'\\' if i + 1 < line.len() && crate::ctype::ispunct(line[i + 1]) => {
                i += 2;
                len += 2;
            }
            b'[' => return None,
            b']' => return if len == 0 { None } else { Some(i + 1) },
            _ => {
                i += 1;
                len += 1;
            }
        }
        if len > 999 {
            return None;
        }
    }
    None
}

/// Whether a link destination is on the unsafe list (`javascript:`,
/// `vbscript:`, `file:`, `data:` other than a small image whitelist). Only
/// consulted when rendering is not in `unsafe_` mode.
pub fn dangerous_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("file:")
    {
        return true;
    }
    if let Some(rest) = lower.strip_prefix("data:") {
        let _ = rest;
        const SAFE: &[&str] = &[
            "data:image/png",
            "data:image/gif",
            "data:image/jpeg",
            "data:image/webp",
        ];
        return !SAFE.iter().any(|s| lower.starts_with(s));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn thematic_breaks() {
        assert_eq!(thematic_break(b"***\n"), Some(4));
        assert_eq!(thematic_break(b"- - -\n"), Some(6));
        assert_eq!(thematic_break(b"**\n"), None);
        assert_eq!(thematic_break(b"+++\n"), None);
    }

    #[test]
    fn atx() {
        assert_eq!(atx_heading_start(b"# foo\n"), Some(2));
        assert_eq!(atx_heading_start(b"###### foo\n"), Some(7));
        assert_eq!(atx_heading_start(b"####### foo\n"), None);
        assert_eq!(atx_heading_start(b"#foo\n"), None);
        assert_eq!(atx_heading_start(b"#\n"), Some(1));
    }

    #[test]
    fn fences() {
        assert_eq!(open_code_fence(b"```rust\n"), Some(3));
        assert_eq!(open_code_fence(b"``\n"), None);
        assert!(close_code_fence(b"```\n", b'`', 3));
        assert!(!close_code_fence(b"``\n", b'`', 3));
    }

    #[test]
    fn email_autolink() {
        assert_eq!(autolink_email(b"foo@bar.com>"), Some(11));
        assert_eq!(autolink_email(b"foo@bar->baz>"), None);
    }

    #[test]
    fn uri_autolink() {
        assert_eq!(autolink_uri(b"https://example.com>"), Some(19));
        assert_eq!(autolink_uri(b"https://a b>"), None);
    }

    #[test]
    fn dangerous() {
        assert!(dangerous_url("javascript:alert(1)"));
        assert!(!dangerous_url("https://example.com"));
        assert!(!dangerous_url("data:image/png;base64,aaaa"));
        assert!(dangerous_url("data:text/html,aaaa"));
    }

    #[test]
    fn comments() {
        assert_eq!(html_tag(b"<!-- hi -->\n"), Some(11));
        assert_eq!(html_tag(b"<!-->\n"), None);
        assert_eq!(html_tag(b"<!--->\n"), None);
        assert_eq!(html_tag(b"<!-- a--b -->\n"), None);
    }
}
