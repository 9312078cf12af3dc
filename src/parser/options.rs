//! The knobs this crate actually exposes.
//!
//! The teacher this crate is drawn from splits its options into an
//! `extension`/`parse`/`render` trio because most of its surface area is
//! optional GFM extensions. None of those extensions live here, so the
//! three-way split collapses: everything left is a renderer behavior, and
//! renderer behavior is all `Options` has.
//!
//! Parse-time constants (tab stop, max list nesting) are not configurable;
//! they're part of the algorithm, not the API. See [`crate::parser::TAB_STOP`]
//! and [`crate::parser::MAX_LIST_DEPTH`].

/// Render-time behavior. Constructed with [`Options::default`] and mutated
/// field-by-field; there is no builder, matching the teacher's plain-struct
/// `RenderOptions`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Render every soft line break as a hard line break (`<br />`).
    ///
    /// ```
    /// # use marktree::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.hardbreaks = true;
    /// assert_eq!(markdown_to_html("a\nb\n", &options), "<p>a<br />\nb</p>\n");
    /// ```
    pub hardbreaks: bool,

    /// Allow raw HTML and unsafe link destinations (`javascript:`, `data:`
    /// other than a safe image whitelist, etc.) through verbatim. When
    /// `false` (the default, matching `cmark`'s safe mode), raw HTML blocks
    /// and inline tags are escaped and dangerous URLs are replaced with the
    /// empty string.
    pub unsafe_: bool,

    /// Use `<pre lang="LANG">` with the info string's first token as a
    /// `lang` attribute instead of `<code class="language-LANG">`. Two
    /// legitimate renderer conventions for the same information; off by
    /// default to match the CommonMark reference form of
    /// `<pre><code class="language-LANG">`.
    pub github_pre_lang: bool,
}
