//! Minify HTML code.
//!
//! This module uses [`minify_html`] and [`lol_html`] under the hood.

use std::string::FromUtf8Error;

use lol_html::errors::RewritingError;
use minify_html::{minify, Cfg};
use thiserror::Error;

use crate::util::amp::ProtectedDocument;

/// Attribute values that browsers assume when the attribute is absent.
///
/// Each entry is `(element, attribute, value)`; values compare
/// case-insensitively.
const REDUNDANT_ATTRIBUTES: [(&str, &str, &str); 9] = [
    ("area", "shape", "rect"),
    ("form", "method", "get"),
    ("input", "type", "text"),
    ("link", "media", "all"),
    ("link", "type", "text/css"),
    ("script", "language", "javascript"),
    ("script", "type", "text/javascript"),
    ("style", "media", "all"),
    ("style", "type", "text/css"),
];

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum MinifyHtmlError {
    /// Error converting a string in UTF-8.
    #[error(transparent)]
    FromUtf8(#[from] FromUtf8Error),
    /// Error rewriting HTML.
    #[error(transparent)]
    LolHtmlRewriting(#[from] RewritingError),
    /// A boilerplate placeholder was altered by the minifier.
    #[error("boilerplate markup did not survive minification")]
    LostBoilerplate,
}

/// HTML minifier that leaves AMP boilerplate untouched.
pub struct HtmlMinifier {
    /// Configuration.
    cfg: Cfg,
}

impl HtmlMinifier {
    /// Create a HTML minifier.
    ///
    /// Inline CSS and JavaScript are not touched: the stylesheet is handled by
    /// the CSS budget stage, and script bodies are kept as they are.
    pub fn new() -> Self {
        Self {
            cfg: Cfg {
                keep_closing_tags: true,
                keep_html_and_head_opening_tags: true,
                keep_comments: false,
                minify_css: false,
                minify_js: false,
                ..Cfg::spec_compliant()
            },
        }
    }

    /// Minify a HTML string.
    ///
    /// Boilerplate fragments are swapped for placeholders, the rest of the
    /// document is minified, and the fragments are put back verbatim.
    pub fn minify(&self, input: impl AsRef<str>) -> Result<String, MinifyHtmlError> {
        let protected = ProtectedDocument::new(input.as_ref());
        let output = canonicalize_attributes(protected.text())?;
        let output = self.minify_html_only(output)?;
        protected
            .restore(&output)
            .ok_or(MinifyHtmlError::LostBoilerplate)
    }

    /// Minify a HTML string, without protecting boilerplate nor reordering
    /// attributes.
    pub fn minify_html_only(&self, input: impl AsRef<str>) -> Result<String, MinifyHtmlError> {
        let input = input.as_ref();
        let output = minify(input.as_bytes(), &self.cfg);
        Ok(String::from_utf8(output)?)
    }
}

impl Default for HtmlMinifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove redundant attributes and sort the remaining ones by name.
///
/// Elements whose attributes are already canonical are left byte-for-byte
/// unchanged. [`HtmlMinifier::minify`] may move attributes again when it
/// picks their quoting, so its output has a deterministic order rather than a
/// sorted one.
pub fn canonicalize_attributes(input: impl AsRef<str>) -> Result<String, MinifyHtmlError> {
    let input = input.as_ref();

    Ok(lol_html::rewrite_str(
        input,
        lol_html::RewriteStrSettings {
            element_content_handlers: vec![lol_html::element!("*", |element| {
                let tag_name = element.tag_name();

                let attributes: Vec<(String, String)> = element
                    .attributes()
                    .iter()
                    .map(|attribute| (attribute.name(), attribute.value()))
                    .collect();

                let mut canonical: Vec<(String, String)> = attributes
                    .iter()
                    .filter(|(name, value)| !is_redundant(&tag_name, name, value))
                    .cloned()
                    .collect();

                canonical.sort_by(|(a, _), (b, _)| a.cmp(b));

                if canonical == attributes {
                    return Ok(());
                }

                for (name, _) in &attributes {
                    element.remove_attribute(name);
                }

                for (name, value) in &canonical {
                    element.set_attribute(name, value)?;
                }

                Ok(())
            })],
            ..lol_html::RewriteStrSettings::default()
        },
    )?)
}

/// Check if an attribute value is the one browsers assume by default.
fn is_redundant(tag_name: &str, name: &str, value: &str) -> bool {
    REDUNDANT_ATTRIBUTES.iter().any(|(t, n, v)| {
        *t == tag_name && *n == name && value.trim().eq_ignore_ascii_case(v)
    })
}

#[cfg(test)]
mod tests {
    use super::{canonicalize_attributes, HtmlMinifier, MinifyHtmlError};

    const INPUT: &str = concat!(
        "<html>\n",                                  //
        "  <head>\n",                                //
        "    <!-- Site header -->\n",                //
        "    <style amp-custom>\n",                  //
        "      body {\n",                            //
        "        color: black;\n",                   //
        "      }\n",                                 //
        "    </style>\n",                            //
        "  </head>\n",                               //
        "  <body>\n",                                //
        "    <div>baz</div>\n",                      //
        "    <p>Hello <b>world</b> !</p>\n",         //
        "  </body>\n",                               //
        "</html>\n"
    );

    #[test]
    fn minify_html() {
        let minifier = HtmlMinifier::new();
        let result = minifier.minify(INPUT).unwrap();

        // Should remove comments
        assert!(!result.contains("Site header"));
        // Should not minify `<style>`
        assert!(result.contains(" color: black;\n"));
        // Should minify HTML
        assert!(result.contains("<div>baz</div>"));
        assert!(!result.contains(" <div>baz</div>"));
        // Should keep spaces around inline elements
        assert!(result.contains("Hello <b>world</b> !"));
        // Should keep opening tags
        assert!(result.contains("<html>"));
        assert!(result.contains("<head>"));
        assert!(result.len() < INPUT.len());
    }

    #[test]
    fn sort_attributes() {
        let result = canonicalize_attributes(r#"<a title="t" href="/x" class="c">link</a>"#)
            .unwrap();

        let class = result.find("class").unwrap();
        let href = result.find("href").unwrap();
        let title = result.find("title").unwrap();

        assert!(class < href && href < title, "{result}");
    }

    #[test]
    fn deterministic_attribute_order() {
        let minifier = HtmlMinifier::new();

        let a = minifier
            .minify(r#"<a title='say "hi"' href="/x" class=c>link</a>"#)
            .unwrap();
        let b = minifier
            .minify(r#"<a class="c" title='say "hi"' href='/x'>link</a>"#)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(minifier.minify(&a).unwrap(), a);
        assert!(a.contains("class=c"), "{a}");
        assert!(a.contains("href=/x"), "{a}");
        assert!(a.contains("say"), "{a}");
    }

    #[test]
    fn collapse_whitespace_around_boilerplate() {
        const INPUT: &str = concat!(
            "<html><head>\n",
            "  <meta charset=utf-8>\n",
            "  <style amp-boilerplate>a{}</style>\n",
            "  <noscript><style amp-boilerplate>b{}</style></noscript>\n",
            "  <title>x</title>\n",
            "</head><body>\n",
            "  <p>a</p>\n",
            "</body></html>",
        );

        let result = HtmlMinifier::new().minify(INPUT).unwrap();

        assert!(
            result.contains(concat!(
                "<head><meta charset=utf-8><style amp-boilerplate>a{}</style>",
                "<noscript><style amp-boilerplate>b{}</style></noscript>",
                "<title>x</title></head>",
            )),
            "{result}"
        );
        assert!(!result.contains('\n'), "{result}");
        assert!(!result.contains("> <"), "{result}");
    }

    #[test]
    fn lose_commented_boilerplate() {
        const INPUT: &str = concat!(
            "<html><head>\n",
            "<!-- old: <style amp-boilerplate>x</style> -->\n",
            "  <style amp-boilerplate>body{a:b}</style>\n",
            "</head><body></body></html>",
        );

        let error = HtmlMinifier::new().minify(INPUT).unwrap_err();

        assert!(matches!(error, MinifyHtmlError::LostBoilerplate), "{error:?}");
    }

    #[test]
    fn remove_redundant_attributes() {
        let result =
            canonicalize_attributes(r#"<form method="GET" action="/s"><input type="text" name="q"></form>"#)
                .unwrap();

        assert!(!result.contains("method"));
        assert!(!result.contains("type"));
        assert!(result.contains(r#"action="/s""#));
        assert!(result.contains(r#"name="q""#));
    }

    #[test]
    fn keep_canonical_elements() {
        const INPUT: &str = r#"<a class='x'  href=y>z</a>"#;
        assert_eq!(canonicalize_attributes(INPUT).unwrap(), INPUT);
    }

    #[test]
    fn collapse_boolean_attributes() {
        let minifier = HtmlMinifier::new();
        let result = minifier
            .minify(r#"<input disabled="disabled" name="q">"#)
            .unwrap();

        assert!(result.contains("disabled"));
        assert!(!result.contains(r#"disabled="disabled""#));
    }

    #[test]
    fn keep_binding_attributes() {
        let minifier = HtmlMinifier::new();
        let result = minifier
            .minify(r#"<p class="b"  [class]="visible ? 'a' : 'b'">text</p>"#)
            .unwrap();

        assert!(result.contains("[class]="));
        assert!(result.contains("visible ? 'a' : 'b'"));
    }

    #[test]
    fn idempotent() {
        let minifier = HtmlMinifier::new();
        let once = minifier.minify(INPUT).unwrap();
        let twice = minifier.minify(&once).unwrap();
        assert_eq!(once, twice);
    }
}
