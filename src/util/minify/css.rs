//! Minify CSS code.
//!
//! This module uses [`lightningcss`] under the hood.

use std::sync::{Arc, RwLock};

use lightningcss::{
    stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet},
    targets::Targets,
};
use thiserror::Error;

use crate::util::targets::BrowserTargetSet;

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum MinifyCssError {
    /// Minifier error.
    #[error("{0}")]
    Minify(String),
    /// Parser error.
    #[error("{0}")]
    Parser(String),
    /// Printer error.
    #[error("{0}")]
    Printer(String),
}

/// CSS minifier.
///
/// Invalid rules and declarations are dropped instead of failing the whole
/// stylesheet. Vendor prefixes are added or removed according to the browser
/// targets.
#[derive(Clone, Debug)]
pub struct CssMinifier {
    /// Resolved browser targets.
    targets: Targets,
}

impl CssMinifier {
    /// Create a CSS minifier for given browser targets.
    pub fn new(targets: &BrowserTargetSet) -> Self {
        Self {
            targets: targets.targets(),
        }
    }

    /// Minify a CSS string.
    pub fn minify(&self, input: impl AsRef<str>) -> Result<String, MinifyCssError> {
        let input = input.as_ref();

        let warnings = Arc::new(RwLock::new(Vec::new()));

        let parser_options = ParserOptions {
            error_recovery: true,
            warnings: Some(Arc::clone(&warnings)),
            ..ParserOptions::default()
        };

        let mut style_sheet = StyleSheet::parse(input, parser_options)
            .map_err(|source| MinifyCssError::Parser(source.to_string()))?;

        if let Ok(warnings) = warnings.read() {
            for warning in warnings.iter() {
                tracing::warn!("Ignoring invalid CSS: {}", warning);
            }
        }

        let minify_options = MinifyOptions {
            targets: self.targets,
            ..MinifyOptions::default()
        };

        style_sheet
            .minify(minify_options)
            .map_err(|source| MinifyCssError::Minify(source.to_string()))?;

        let printer_options = PrinterOptions {
            minify: true,
            targets: self.targets,
            ..PrinterOptions::default()
        };

        let result = style_sheet
            .to_css(printer_options)
            .map_err(|source| MinifyCssError::Printer(source.to_string()))?;

        Ok(result.code)
    }
}

impl Default for CssMinifier {
    fn default() -> Self {
        Self::new(BrowserTargetSet::default_set())
    }
}

/// Minify a CSS string for the default browser targets.
pub fn minify_css(input: impl AsRef<str>) -> Result<String, MinifyCssError> {
    CssMinifier::default().minify(input)
}

#[cfg(test)]
mod tests {
    use super::{minify_css, CssMinifier};
    use crate::util::targets::BrowserTargetSet;

    #[test]
    fn minify() {
        // Length: 25
        const INPUT: &str = concat!(
            ".foo {\n",          //
            "  color: black;\n", //
            "}\n"
        );

        let result = minify_css(INPUT).unwrap();

        assert!(result.contains(".foo"));
        assert!(result.contains("color:"));
        // Expected: 16
        assert!(result.len() <= 18);
    }

    #[test]
    fn minify_exact() {
        let result = minify_css("body {  color:  red;  }").unwrap();
        assert_eq!(result, "body{color:red}");
    }

    #[test]
    fn idempotent() {
        const INPUT: &str = concat!(
            "/* Header */\n",                               //
            ".header {\n",                                  //
            "  margin: 0px 0px 0px 0px;\n",                 //
            "  background-color: #ffffff;\n",               //
            "}\n",                                          //
            "@media (max-width: 600px) {\n",                //
            "  .header { padding: 1em; }\n",                //
            "}\n",                                          //
            ".nav a:hover, .nav a:focus { color: #333; }\n" //
        );

        let once = minify_css(INPUT).unwrap();
        let twice = minify_css(&once).unwrap();

        assert_eq!(once, twice);
        assert!(!once.contains("Header"));
    }

    #[test]
    fn recover_from_invalid_rules() {
        const INPUT: &str = "a { color: red; } :::bad { color: green; } b { color: blue; }";

        let result = minify_css(INPUT).unwrap();

        assert!(result.contains("color:red"));
        assert!(!result.contains("bad"));
    }

    #[test]
    fn prefixes_follow_targets() {
        const INPUT: &str = ".a { user-select: none; }";

        let old = BrowserTargetSet::new(["safari 13"]).unwrap();
        let result = CssMinifier::new(&old).minify(INPUT).unwrap();
        assert!(result.contains("-webkit-user-select:none"));

        let modern = BrowserTargetSet::new(["last 1 Chrome version"]).unwrap();
        let result = CssMinifier::new(&modern).minify(INPUT).unwrap();
        assert!(!result.contains("-webkit-"));
    }
}
