//! Write output files.

use std::{
    fs::{copy, create_dir_all, remove_dir_all, write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::{Entry, File, Page};
use crate::{
    config::Config,
    util::pipeline::{Receiver, Sender},
};

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum OutputError {
    /// I/O error.
    #[error("failed to write {path:?}")]
    Io {
        /// Source error.
        source: std::io::Error,
        /// Output path.
        path: PathBuf,
    },
}

/// Attach a path to an I/O error.
fn with_path(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> OutputError {
    let path = path.as_ref().to_path_buf();
    move |source| OutputError::Io { source, path }
}

/// Create the parent directory of an output file.
fn create_parent_dir(config: &Config, path: &Path) -> Result<(), OutputError> {
    assert!(path.starts_with(&config.output_dir));

    if let Some(dir) = path.parent() {
        tracing::trace!("create_dir_all({:?})", dir);
        create_dir_all(dir).map_err(with_path(dir))?;
    }

    Ok(())
}

/// Write a page.
fn write_page(config: &Config, page: &Page) -> Result<(), OutputError> {
    let path = config.output_dir.join(&page.output_path);

    create_parent_dir(config, &path)?;

    tracing::info!("Write {:?}", path);
    write(&path, &page.content).map_err(with_path(&path))
}

/// Copy a file.
fn copy_file(config: &Config, file: &File) -> Result<(), OutputError> {
    let path = config.output_dir.join(&file.output_path);

    create_parent_dir(config, &path)?;

    tracing::info!("Copy {:?} to {:?}", file.input_path, path);
    copy(&file.input_path, &path).map_err(with_path(&path))?;

    Ok(())
}

/// Write pages and copy files into a fresh output directory.
///
/// Written entries are sent back.
pub fn run(
    config: &Config,
    (page_rx, file_rx): (Receiver<Page>, Receiver<File>),
    entry_tx: Sender<Entry>,
) -> Result<(), OutputError> {
    let output_dir = &config.output_dir;

    assert!(output_dir.is_absolute());

    // Consume every entry before touching the output directory
    let pages: Vec<Page> = page_rx.into_iter().collect();
    let files: Vec<File> = file_rx.into_iter().collect();

    if output_dir.exists() {
        tracing::debug!("Clearing {:?}", output_dir);
        remove_dir_all(output_dir).map_err(with_path(output_dir))?;
    }

    create_dir_all(output_dir).map_err(with_path(output_dir))?;

    for page in pages {
        write_page(config, &page)?;
        entry_tx.send(Entry::Page(page)).unwrap();
    }

    for file in files {
        copy_file(config, &file)?;
        entry_tx.send(Entry::File(file)).unwrap();
    }

    Ok(())
}
