//! Walk the input directory.
//!
//! This module uses [`ignore`] under the hood.

use std::path::{Path, PathBuf};

pub use ignore::DirEntry;
use ignore::WalkBuilder;
use thiserror::Error;

use super::{Entry, File, Page};
use crate::{
    config::Config,
    util::{path::PathExt, pipeline::Sender},
};

/// Extensions of stylesheet sources, which are compiled rather than copied.
const STYLESHEET_EXTENSIONS: [&str; 2] = ["sass", "scss"];

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum InputError {
    /// Ignore error.
    #[error(transparent)]
    Ignore(#[from] ignore::Error),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Provides a file path to the context of an existing error.
    #[error("file `{path}`")]
    WithFile {
        /// Source error.
        source: Box<Self>,
        /// File path.
        path: PathBuf,
    },
}

/// A directory walker.
///
/// This walker creates a recursive directory iterator that filters hidden files
/// and paths specified in `.gitignore` files.
#[derive(Debug)]
pub struct DirWalker {
    /// Builds a recursive directory iterator.
    builder: WalkBuilder,
}

impl DirWalker {
    /// Create a directory walker.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let mut builder = WalkBuilder::new(dir);

        builder
            .hidden(true)
            .git_ignore(true)
            .ignore(false)
            .parents(false)
            .git_global(false)
            .git_exclude(false)
            .require_git(false)
            .sort_by_file_path(|a, b| a.cmp(b));

        Self { builder }
    }

    /// Register a predicate to filter directories and files during the walk.
    pub fn filter_entry<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&DirEntry) -> bool + Send + Sync + 'static,
    {
        self.builder.filter_entry(predicate);
        self
    }

    /// Return an iterator that yields files, in path order.
    pub fn walk(&self) -> impl Iterator<Item = Result<DirEntry, InputError>> {
        self.builder
            .build()
            .filter(|result| {
                result.as_ref().map_or(true, |entry| {
                    entry
                        .file_type()
                        .is_some_and(|file_type| file_type.is_file())
                })
            })
            .map(|result| result.map_err(Into::into))
    }
}

/// Create a walker for the input directory of given configuration.
///
/// Files and directories starting with `_`, the configuration file, the
/// output directory, ignored paths and stylesheet sources are skipped.
pub fn input_walker(config: &Config) -> DirWalker {
    let mut ignore_paths: Vec<PathBuf> = config.ignore_paths.iter().cloned().collect();

    if let Some(config_path) = &config.config_path {
        ignore_paths.push(config_path.to_owned());
    }

    ignore_paths.push(config.output_dir.to_owned());

    DirWalker::new(&config.input_dir).filter_entry(move |entry| {
        let path = entry.path();

        let is_stylesheet = path.extension().is_some_and(|extension| {
            STYLESHEET_EXTENSIONS
                .iter()
                .any(|candidate| extension == *candidate)
        });

        entry
            .file_name()
            .to_str()
            .is_some_and(|file_name| !file_name.starts_with('_'))
            && !is_stylesheet
            && !ignore_paths.iter().any(|ignored| path.starts_with(ignored))
    })
}

/// Create an [`Entry`] from a walked file.
///
/// HTML files are read as pages, other files are copied as they are.
fn create_entry(config: &Config, entry: DirEntry) -> Result<Entry, InputError> {
    let input_path = entry.into_path();

    let err_with_file = |source| InputError::WithFile {
        source: Box::new(source),
        path: input_path.to_owned(),
    };

    // `strip_prefix()` should not fail since `input_dir` is the canonical base path
    let output_path = input_path
        .strip_prefix(&config.input_dir)
        .expect("entry path must be descendant of `input_dir`")
        .to_path_buf();

    if !output_path.is_html() {
        return Ok(Entry::File(File {
            input_path,
            output_path,
        }));
    }

    let content = std::fs::read_to_string(&input_path)
        .map_err(Into::into)
        .map_err(err_with_file)?;

    Ok(Entry::Page(Page {
        input_path,
        output_path,
        content,
    }))
}

/// Walk the input directory and send its pages and files.
pub fn run(config: &Config, entry_tx: Sender<Entry>) -> Result<(), InputError> {
    for entry in input_walker(config).walk() {
        let entry = create_entry(config, entry?)?;
        entry_tx.send(entry).unwrap();
    }
    Ok(())
}
