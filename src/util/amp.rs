//! Locate AMP-specific markup in HTML documents.
//!
//! This module uses [`regex`] under the hood. Matching is done on the
//! serialized text so that extracted fragments are byte-exact substrings of
//! the document.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `<style amp-custom ...>...</style>` and captures its content.
static AMP_CUSTOM_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*?\samp-custom(?:[\s=/][^>]*)?>(.*?)</style\s*>")
        .expect("pattern must be valid")
});

/// Matches `<noscript><style amp-boilerplate>...</style></noscript>`.
static NOSCRIPT_BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<noscript\b[^>]*>\s*<style\b[^>]*?\samp-boilerplate\b[^>]*>.*?</style\s*>\s*</noscript\s*>",
    )
    .expect("pattern must be valid")
});

/// Matches `<style amp-boilerplate>...</style>`.
static STYLE_BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*?\samp-boilerplate\b[^>]*>.*?</style\s*>")
        .expect("pattern must be valid")
});

/// The content of a `<style amp-custom>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleBlock<'a> {
    /// Text between the opening and the closing tags.
    content: &'a str,

    /// Byte range of the content within the document.
    range: Range<usize>,
}

impl<'a> StyleBlock<'a> {
    /// Return the raw CSS text.
    pub fn content(&self) -> &'a str {
        self.content
    }

    /// Return the byte range of the CSS text within the document.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Return the size of the CSS text in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the element has no content at all.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check if the content is only made of whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Return a copy of `document` where this block's content is replaced.
    ///
    /// `document` must be the document this block was found in.
    pub fn replace(&self, document: &str, content: &str) -> String {
        debug_assert_eq!(&document[self.range()], self.content);

        let mut output =
            String::with_capacity(document.len() - self.content.len() + content.len());
        output.push_str(&document[..self.range.start]);
        output.push_str(content);
        output.push_str(&document[self.range.end..]);
        output
    }
}

/// Find the first `<style amp-custom>` element of a document.
///
/// Plain `<style>` elements and `<style amp-boilerplate>` elements are not
/// matched.
pub fn find_amp_custom_css(document: &str) -> Option<StyleBlock<'_>> {
    AMP_CUSTOM_STYLE
        .captures(document)
        .and_then(|captures| captures.get(1))
        .map(|content| StyleBlock {
            content: content.as_str(),
            range: content.range(),
        })
}

/// Return the CSS text of the first `<style amp-custom>` element, if any.
pub fn extract_amp_custom_css(document: &str) -> Option<&str> {
    find_amp_custom_css(document).map(|block| block.content())
}

/// Kind of AMP boilerplate fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoilerplateKind {
    /// `<noscript><style amp-boilerplate>...</style></noscript>`.
    Noscript,
    /// Standalone `<style amp-boilerplate>...</style>`.
    Style,
}

impl BoilerplateKind {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Noscript => &*NOSCRIPT_BOILERPLATE,
            Self::Style => &*STYLE_BOILERPLATE,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Noscript => "noscript",
            Self::Style => "style",
        }
    }
}

/// Return the first boilerplate fragment of given kind.
pub fn find_boilerplate(document: &str, kind: BoilerplateKind) -> Option<&str> {
    kind.pattern().find(document).map(|m| m.as_str())
}

/// A boilerplate fragment swapped out of a document.
#[derive(Debug)]
struct Fragment {
    /// Text standing in for the fragment.
    placeholder: String,

    /// Original text of the fragment.
    original: String,
}

/// A document whose boilerplate fragments are replaced by placeholders.
#[derive(Debug)]
pub struct ProtectedDocument {
    /// Document text containing placeholders.
    text: String,

    /// Fragments in extraction order.
    fragments: Vec<Fragment>,
}

impl ProtectedDocument {
    /// Swap the boilerplate fragments of a document out for placeholders.
    ///
    /// The `<noscript>` fragment contains a `<style amp-boilerplate>` element
    /// itself, so it is taken first. The standalone style fragment is then
    /// searched in what remains.
    ///
    /// Only the first match of each kind is protected, even when it sits in an
    /// HTML comment. A minifier that drops comments then loses the
    /// placeholder, and [`Self::restore`] reports it.
    pub fn new(document: &str) -> Self {
        let mut text = document.to_owned();
        let mut fragments = Vec::new();

        for kind in [BoilerplateKind::Noscript, BoilerplateKind::Style] {
            let Some(found) = kind.pattern().find(&text) else {
                continue;
            };

            let range = found.range();
            let original = found.as_str().to_owned();
            let placeholder = unique_placeholder(document, kind, fragments.len());

            text.replace_range(range, &placeholder);
            fragments.push(Fragment {
                placeholder,
                original,
            });
        }

        Self { text, fragments }
    }

    /// Return the document text with placeholders.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Return the number of protected fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if no fragment was found.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Put the original fragments back into a transformed text.
    ///
    /// Returns `None` if a placeholder is missing or duplicated in `text`.
    pub fn restore(&self, text: &str) -> Option<String> {
        let mut output = text.to_owned();
        for fragment in &self.fragments {
            if output.matches(&fragment.placeholder).count() != 1 {
                return None;
            }
            output = output.replacen(&fragment.placeholder, &fragment.original, 1);
        }
        Some(output)
    }
}

/// Generate a placeholder that does not occur in the document.
///
/// Placeholders are void `<meta>` elements, so that minifiers collapse the
/// whitespace around them as they do around any other tag in `<head>`.
fn unique_placeholder(document: &str, kind: BoilerplateKind, index: usize) -> String {
    (0usize..)
        .map(|salt| format!("<meta ampsite-boilerplate={}-{index}-{salt}>", kind.label()))
        .find(|placeholder| !document.contains(placeholder.as_str()))
        .expect("range is unbounded")
}
