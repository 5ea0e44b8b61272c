//! Compile SCSS code.
//!
//! This module uses [`grass`] under the hood.

use std::path::Path;

use grass::{Options, OutputStyle};
use thiserror::Error;

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum CompileScssError {
    /// Grass error.
    #[error(transparent)]
    Grass(#[from] Box<grass::Error>),
}

/// SCSS compiler.
pub struct ScssCompiler<'o> {
    options: Options<'o>,
}

impl ScssCompiler<'_> {
    /// Create a SCSS compiler.
    pub fn new() -> Self {
        Self {
            options: Options::default().style(OutputStyle::Expanded),
        }
    }

    /// Add a directory where `@use` and `@import` rules look for files.
    pub fn load_path(self, path: impl AsRef<Path>) -> Self {
        Self {
            options: self.options.load_path(path.as_ref()),
        }
    }

    /// Compile a SCSS string to CSS.
    pub fn compile(&self, input: impl AsRef<str>) -> Result<String, CompileScssError> {
        Ok(grass::from_string(input.as_ref(), &self.options)?)
    }

    /// Compile a SCSS file to CSS.
    ///
    /// The directory of the file is searched for imports.
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<String, CompileScssError> {
        Ok(grass::from_path(path.as_ref(), &self.options)?)
    }
}

impl Default for ScssCompiler<'_> {
    fn default() -> Self {
        Self::new()
    }
}
