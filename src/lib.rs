//! A build transform chain for AMP sites.
//!
//! Ampsite takes rendered pages and prepares them for publication: it
//! compiles the site stylesheet into `<style amp-custom>`, enforces the AMP
//! inline CSS budget, and minifies HTML without touching the AMP boilerplate.
//!
//! Ampsite can be used as both a CLI and a library.

#![warn(missing_docs)]

pub mod build;
pub mod cli;
pub mod config;
pub mod util;

pub use build::{
    build, check,
    css_budget::{enforce_css_budget, CssBudgetError, CssBudgetExceeded, MAX_CSS_SIZE_BYTES},
    minify_html::minify_html_safely,
};
pub use config::{BuildMode, Config};
pub use util::{amp::extract_amp_custom_css, targets::BROWSERSLIST_QUERY};
