//! Compile the site stylesheet into pages.
//!
//! This module uses [`grass`] under the hood. The stylesheet is compiled once
//! per build and inserted into every page whose `<style amp-custom>` element
//! is empty.

use std::path::PathBuf;

use thiserror::Error;

use super::Page;
use crate::{
    config::Config,
    util::{
        amp::find_amp_custom_css,
        compile::scss::{CompileScssError, ScssCompiler},
        pipeline::{Receiver, Sender},
    },
};

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum ScssError {
    /// Compilation error.
    #[error("failed to compile stylesheet {path:?}")]
    Compile {
        /// Source error.
        source: CompileScssError,
        /// Stylesheet path.
        path: PathBuf,
    },
}

/// Compile the configured stylesheet, if any.
pub fn compile_stylesheet(config: &Config) -> Result<Option<String>, ScssError> {
    let Some(path) = &config.stylesheet else {
        return Ok(None);
    };

    let mut compiler = ScssCompiler::new();

    if let Some(dir) = path.parent() {
        compiler = compiler.load_path(dir);
    }

    let css = compiler
        .compile_file(path)
        .map_err(|source| ScssError::Compile {
            source,
            path: path.to_owned(),
        })?;

    tracing::info!("Compiled {:?} ({} bytes)", path, css.len());

    Ok(Some(css))
}

/// Insert CSS into the `<style amp-custom>` element of a document.
///
/// Returns `None` if the document has no such element, or if the element
/// already has content.
pub fn inline_stylesheet(document: &str, css: &str) -> Option<String> {
    find_amp_custom_css(document)
        .filter(|block| block.is_blank())
        .map(|block| block.replace(document, css))
}

/// Inline the compiled stylesheet into every page.
pub fn run(
    config: &Config,
    page_rx: Receiver<Page>,
    page_tx: Sender<Page>,
) -> Result<(), ScssError> {
    let stylesheet = compile_stylesheet(config)?;

    for page in page_rx {
        let page = match stylesheet
            .as_deref()
            .and_then(|css| inline_stylesheet(&page.content, css))
        {
            Some(content) => {
                tracing::debug!("Inlined stylesheet into {:?}", page.output_path);
                Page { content, ..page }
            },
            None => page,
        };

        page_tx.send(page).unwrap();
    }

    Ok(())
}
