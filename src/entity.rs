//! HTML5 named-entity lookup and the shared numeric/named entity decoder.
//!
//! The named-entity table (~2125 entries covering both the 1- and
//! 2-codepoint forms) is generated at build time from the canonical WHATWG
//! JSON source by `build.rs` and embedded as a sorted static array; see
//! [`entitydata::TRANSLATED_ENTITIES`].

use crate::ctype::isdigit;
use std::char;

include!(concat!(env!("OUT_DIR"), "/entitydata.rs"));

pub const ENTITY_MIN_LENGTH: usize = 2;
pub const ENTITY_MAX_LENGTH: usize = 31;

fn isxdigit(ch: u8) -> bool {
    ch.is_ascii_hexdigit()
}

/// Attempts to decode a single entity (named, decimal, or hex) starting
/// just after the `&`. Returns the decoded text and the number of bytes of
/// `text` consumed, including the trailing `;`.
pub fn unescape(text: &str) -> Option<(String, usize)> {
    let bytes = text.as_bytes();

    if bytes.len() >= 3 && bytes[0] == b'#' {
        let mut codepoint: u32 = 0;
        let mut i;

        let num_digits = if bytes.len() > 1 && isdigit(bytes[1]) {
            i = 1;
            while i < bytes.len() && isdigit(bytes[i]) && i < 1 + 8 {
                codepoint = codepoint.saturating_mul(10) + (bytes[i] - b'0') as u32;
                codepoint = codepoint.min(0x11_0000);
                i += 1;
            }
            i - 1
        } else if bytes.len() > 2 && (bytes[1] == b'x' || bytes[1] == b'X') {
            i = 2;
            while i < bytes.len() && isxdigit(bytes[i]) && i < 2 + 6 {
                let d = bytes[i];
                let v = if d.is_ascii_digit() {
                    (d - b'0') as u32
                } else {
                    ((d | 0x20) - b'a') as u32 + 10
                };
                codepoint = codepoint.saturating_mul(16) + v;
                codepoint = codepoint.min(0x11_0000);
                i += 1;
            }
            i - 2
        } else {
            0
        };

        if (1..=7).contains(&num_digits) && i < bytes.len() && bytes[i] == b';' {
            if codepoint == 0 || (0xD800..=0xDFFF).contains(&codepoint) || codepoint >= 0x110000 {
                codepoint = 0xFFFD;
            }
            let ch = char::from_u32(codepoint).unwrap_or('\u{FFFD}');
            return Some((ch.to_string(), i + 1));
        }
    }

    let size = text.len().min(ENTITY_MAX_LENGTH);
    for (i, &b) in bytes.iter().enumerate().take(size).skip(ENTITY_MIN_LENGTH) {
        if b == b' ' {
            return None;
        }
        if b == b';' {
            return lookup(&text[..i]).map(|e| (e.to_owned(), i + 1));
        }
    }

    None
}

fn lookup(name: &str) -> Option<&'static str> {
    entitydata::TRANSLATED_ENTITIES
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|idx| entitydata::TRANSLATED_ENTITIES[idx].1)
}

/// Resolves every `&...;` entity reference in `src`, leaving unrecognized
/// `&` sequences untouched.
pub fn unescape_html(src: &str) -> String {
    let bytes = src.as_bytes();
    let size = bytes.len();
    let mut i = 0;
    let mut v = String::with_capacity(size);

    while i < size {
        let org = i;
        while i < size && bytes[i] != b'&' {
            i += 1;
        }

        if i > org {
            if org == 0 && i >= size {
                return src.to_owned();
            }
            v.push_str(&src[org..i]);
        }

        if i >= size {
            return v;
        }

        i += 1;
        match unescape(&src[i..]) {
            Some((text, consumed)) => {
                v.push_str(&text);
                i += consumed;
            }
            None => v.push('&'),
        }
    }

    v
}
