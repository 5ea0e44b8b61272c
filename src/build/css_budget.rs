//! Enforce the inline CSS budget of AMP pages.
//!
//! AMP refuses documents whose `<style amp-custom>` stylesheet is larger than
//! 75 KB. This stage minifies that stylesheet and stops the build when the
//! minified size is still above the limit.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Page;
use crate::{
    config::Config,
    util::{
        amp::find_amp_custom_css,
        minify::css::{CssMinifier, MinifyCssError},
        path::PathExt,
        pipeline::{Receiver, Sender},
        targets::BrowserTargetSet,
    },
};

/// Maximum size of an AMP inline stylesheet, in bytes.
pub const MAX_CSS_SIZE_BYTES: usize = 75 * 1024;

/// Inline stylesheet larger than the budget.
#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "inline CSS{} is {size} bytes ({} KB), which exceeds the AMP limit of {limit} bytes ({} KB); \
     remove unused styles, split critical and non-critical CSS, or simplify selectors",
    page_context(.page),
    kilobytes(.size),
    kilobytes(.limit)
)]
pub struct CssBudgetExceeded {
    /// Size of the minified stylesheet, in bytes.
    pub size: usize,
    /// Maximum size, in bytes.
    pub limit: usize,
    /// Page the stylesheet belongs to.
    pub page: Option<PathBuf>,
}

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum CssBudgetError {
    /// The stylesheet is too large.
    #[error(transparent)]
    Exceeded(#[from] CssBudgetExceeded),
    /// The stylesheet could not be minified, so its size cannot be verified.
    #[error("failed to minify inline CSS{}", page_context(.page))]
    Minify {
        /// Source error.
        source: MinifyCssError,
        /// Page the stylesheet belongs to.
        page: Option<PathBuf>,
    },
}

impl CssBudgetError {
    /// Attach the page being processed to the error.
    pub fn with_page(self, path: impl AsRef<Path>) -> Self {
        let page = Some(path.as_ref().to_path_buf());
        match self {
            Self::Exceeded(error) => Self::Exceeded(CssBudgetExceeded { page, ..error }),
            Self::Minify { source, .. } => Self::Minify { source, page },
        }
    }
}

/// Format the page part of error messages.
fn page_context(page: &Option<PathBuf>) -> String {
    page.as_ref()
        .map(|path| format!(" of {path:?}"))
        .unwrap_or_default()
}

/// Format a size in kilobytes.
fn kilobytes(bytes: &usize) -> String {
    format!("{:.1}", *bytes as f64 / 1024.0)
}

/// Minifies inline stylesheets and checks their size.
#[derive(Clone, Debug)]
pub struct CssGuard {
    /// Stylesheet minifier.
    minifier: CssMinifier,

    /// Maximum size, in bytes.
    max_bytes: usize,
}

impl CssGuard {
    /// Create a guard for given browser targets and size limit.
    pub fn new(targets: &BrowserTargetSet, max_bytes: usize) -> Self {
        Self {
            minifier: CssMinifier::new(targets),
            max_bytes,
        }
    }

    /// Return the size limit, in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Minify a stylesheet and check its size.
    ///
    /// Returns the minified stylesheet. A stylesheet of exactly `max_bytes`
    /// bytes passes.
    pub fn check(&self, css: &str) -> Result<String, CssBudgetError> {
        let minified = self
            .minifier
            .minify(css)
            .map_err(|source| CssBudgetError::Minify { source, page: None })?;

        // UTF-8 length, not character count
        let size = minified.len();

        if size > self.max_bytes {
            return Err(CssBudgetExceeded {
                size,
                limit: self.max_bytes,
                page: None,
            }
            .into());
        }

        Ok(minified)
    }

    /// Replace the inline stylesheet of a document by its minified version.
    ///
    /// A document without `<style amp-custom>` is returned unchanged.
    pub fn enforce(&self, document: &str) -> Result<String, CssBudgetError> {
        let Some(block) = find_amp_custom_css(document) else {
            return Ok(document.to_owned());
        };

        let minified = self.check(block.content())?;

        tracing::debug!(
            "Inline CSS: {} bytes minified to {} bytes (limit {} bytes)",
            block.len(),
            minified.len(),
            self.max_bytes
        );

        Ok(block.replace(document, &minified))
    }
}

impl Default for CssGuard {
    fn default() -> Self {
        Self::new(BrowserTargetSet::default_set(), MAX_CSS_SIZE_BYTES)
    }
}

/// Enforce the inline CSS budget of a page.
///
/// Only `.html` outputs are checked; other documents are returned unchanged.
/// The default browser targets are used, and `max_bytes` defaults to
/// [`MAX_CSS_SIZE_BYTES`].
pub fn enforce_css_budget(
    document: &str,
    output_path: impl AsRef<Path>,
    max_bytes: Option<usize>,
) -> Result<String, CssBudgetError> {
    let output_path = output_path.as_ref();

    if !output_path.is_html() {
        return Ok(document.to_owned());
    }

    CssGuard::new(
        BrowserTargetSet::default_set(),
        max_bytes.unwrap_or(MAX_CSS_SIZE_BYTES),
    )
    .enforce(document)
    .map_err(|error| error.with_page(output_path))
}

/// Enforce the inline CSS budget of every page.
///
/// The first page over budget stops the stage.
pub fn run(
    config: &Config,
    page_rx: Receiver<Page>,
    page_tx: Sender<Page>,
) -> Result<(), CssBudgetError> {
    let guard = CssGuard::new(&config.browsers, config.max_css_bytes);

    for page in page_rx {
        if !page.output_path.is_html() {
            page_tx.send(page).unwrap();
            continue;
        }

        let content = guard
            .enforce(&page.content)
            .map_err(|error| error.with_page(&page.output_path))?;

        if let Some(block) = find_amp_custom_css(&content) {
            tracing::info!(
                "{:?}: inline CSS {} / {} bytes",
                page.output_path,
                block.len(),
                guard.max_bytes()
            );
        }

        page_tx.send(Page { content, ..page }).unwrap();
    }

    Ok(())
}
