//! Minify HTML pages without breaking AMP boilerplate.
//!
//! Minification is an optimization: when it fails, the page is written as
//! rendered.

use std::path::Path;

use super::Page;
use crate::{
    config::{BuildMode, Config},
    util::{
        minify::html::HtmlMinifier,
        path::PathExt,
        pipeline::{Receiver, Sender},
    },
};

/// HTML minifier that falls back to the original document on failure.
pub struct SafeHtmlMinifier {
    /// Underlying minifier.
    minifier: HtmlMinifier,

    /// Build mode.
    mode: BuildMode,
}

impl SafeHtmlMinifier {
    /// Create a minifier for given build mode.
    pub fn new(mode: BuildMode) -> Self {
        Self {
            minifier: HtmlMinifier::new(),
            mode,
        }
    }

    /// Minify a document written to `output_path`.
    ///
    /// The document is returned unchanged outside production mode, when
    /// `output_path` does not end with `.html`, or when minification fails.
    pub fn minify(&self, document: &str, output_path: impl AsRef<Path>) -> String {
        let output_path = output_path.as_ref();

        if !self.mode.is_production() || !output_path.is_html() {
            return document.to_owned();
        }

        match self.minifier.minify(document) {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(
                    "Skipping HTML minification of {:?}: {}",
                    output_path,
                    error
                );
                document.to_owned()
            },
        }
    }
}

/// Minify a document, keeping AMP boilerplate intact.
///
/// See [`SafeHtmlMinifier::minify`].
pub fn minify_html_safely(
    document: &str,
    output_path: impl AsRef<Path>,
    mode: BuildMode,
) -> String {
    SafeHtmlMinifier::new(mode).minify(document, output_path)
}

/// Minify every page.
pub fn run(config: &Config, page_rx: Receiver<Page>, page_tx: Sender<Page>) {
    let minifier = SafeHtmlMinifier::new(config.mode);

    for page in page_rx {
        let content = minifier.minify(&page.content, &page.output_path);
        page_tx.send(Page { content, ..page }).unwrap();
    }
}
