//! Integration tests driving the crate exclusively through its public API
//! (`markdown_to_html`/`parse_document`/`format_document`). The block
//! builder and inline parser each carry their own focused unit tests
//! alongside the code they exercise; these check the pieces fit together
//! end to end, plus the renderer-facing `Options` knobs and safety
//! defaults.

use crate::{format_document, markdown_to_html, parse_document, Options};
use pretty_assertions::assert_eq;
use typed_arena::Arena;

fn html(src: &str) -> String {
    markdown_to_html(src, &Options::default())
}

#[test]
fn headings_paragraphs_and_blockquotes() {
    let src = "# Title\n\nSome *text* here.\n\n> A quote.\n";
    assert_eq!(
        html(src),
        concat!(
            "<h1>Title</h1>\n",
            "<p>Some <em>text</em> here.</p>\n",
            "<blockquote>\n<p>A quote.</p>\n</blockquote>\n",
        )
    );
}

#[test]
fn setext_heading() {
    assert_eq!(html("Title\n=====\n"), "<h1>Title</h1>\n");
    assert_eq!(html("Subtitle\n--------\n"), "<h2>Subtitle</h2>\n");
}

#[test]
fn thematic_break() {
    assert_eq!(html("---\n"), "<hr />\n");
    assert_eq!(html("a\n\n***\n\nb\n"), "<p>a</p>\n<hr />\n<p>b</p>\n");
}

#[test]
fn fenced_code_block_with_info_string() {
    assert_eq!(
        html("```rust\nfn main() {}\n```\n"),
        "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
    );
}

#[test]
fn indented_code_block() {
    assert_eq!(html("    code\n    here\n"), "<pre><code>code\nhere\n</code></pre>\n");
}

#[test]
fn tight_and_loose_lists() {
    assert_eq!(
        html("- a\n- b\n- c\n"),
        "<ul>\n<li>a</li>\n<li>b</li>\n<li>c</li>\n</ul>\n"
    );
    assert_eq!(
        html("- a\n\n- b\n"),
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
    );
}

#[test]
fn ordered_list_with_start() {
    assert_eq!(
        html("3. a\n4. b\n"),
        "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n"
    );
}

#[test]
fn nested_blockquote_and_list() {
    let src = "> - a\n> - b\n";
    assert_eq!(
        html(src),
        "<blockquote>\n<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n</blockquote>\n"
    );
}

#[test]
fn link_reference_definition_is_not_rendered_as_a_paragraph() {
    assert_eq!(html("[foo]: /url\n\n[foo]\n"), "<p><a href=\"/url\">foo</a></p>\n");
}

#[test]
fn html_block_passthrough_and_escaping() {
    let mut unsafe_opts = Options::default();
    unsafe_opts.unsafe_ = true;
    assert_eq!(
        markdown_to_html("<div>\n  hi\n</div>\n", &unsafe_opts),
        "<div>\n  hi\n</div>\n"
    );
    assert_eq!(html("<div>\n  hi\n</div>\n"), "<!-- raw HTML omitted -->\n");
}

#[test]
fn dangerous_link_destinations_are_stripped_by_default() {
    assert_eq!(
        html("[x](javascript:alert(1))\n"),
        "<p><a href=\"\">x</a></p>\n"
    );

    let mut unsafe_opts = Options::default();
    unsafe_opts.unsafe_ = true;
    assert_eq!(
        markdown_to_html("[x](javascript:alert(1))\n", &unsafe_opts),
        "<p><a href=\"javascript:alert(1)\">x</a></p>\n"
    );
}

#[test]
fn hardbreaks_option_upgrades_every_soft_break() {
    let mut opts = Options::default();
    opts.hardbreaks = true;
    assert_eq!(markdown_to_html("a\nb\n", &opts), "<p>a<br />\nb</p>\n");
}

#[test]
fn github_pre_lang_option_changes_fence_rendering() {
    let mut opts = Options::default();
    opts.github_pre_lang = true;
    assert_eq!(
        markdown_to_html("```rust\ncode\n```\n", &opts),
        "<pre lang=\"rust\"><code>code\n</code></pre>\n"
    );
}

#[test]
fn empty_document_renders_nothing() {
    assert_eq!(html(""), "");
    assert_eq!(html("\n"), "");
}

#[test]
fn whitespace_only_document_renders_nothing() {
    assert_eq!(html("   \n\t\n"), "");
}

#[test]
fn backslash_at_end_of_line_is_a_hard_break() {
    assert_eq!(html("line one\\\nline two\n"), "<p>line one<br />\nline two</p>\n");
}

#[test]
fn parse_document_tree_can_be_inspected_before_rendering() {
    use crate::NodeValue;

    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "# Title\n\nBody text.\n", &options);

    let mut kinds = Vec::new();
    for child in root.children() {
        match child.data.borrow().value {
            NodeValue::Heading(_) => kinds.push("heading"),
            NodeValue::Paragraph => kinds.push("paragraph"),
            _ => kinds.push("other"),
        }
    }
    assert_eq!(kinds, vec!["heading", "paragraph"]);

    let mut output = String::new();
    format_document(root, &options, &mut output).unwrap();
    assert_eq!(output, "<h1>Title</h1>\n<p>Body text.</p>\n");
}

#[test]
fn lazy_continuation_of_a_blockquote_paragraph() {
    assert_eq!(
        html("> line one\nline two\n"),
        "<blockquote>\n<p>line one\nline two</p>\n</blockquote>\n"
    );
}

#[test]
fn interrupting_paragraph_with_a_heading() {
    assert_eq!(
        html("A paragraph\n# heading\n"),
        "<p>A paragraph</p>\n<h1>heading</h1>\n"
    );
}
