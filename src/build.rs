//! Build the site.

pub mod css_budget;
pub mod input;
pub mod minify_html;
pub mod output;
pub mod scss;

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use thiserror::Error;

use crate::{
    config::Config,
    util::pipeline::{Pipeline, Receiver, Sender},
};

/// List of build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Error while walking input files.
    #[error("failed to walk input files")]
    Input(#[source] self::input::InputError),
    /// Error while compiling SCSS.
    #[error("failed to compile SCSS")]
    Scss(#[source] self::scss::ScssError),
    /// Error while checking the inline CSS budget.
    #[error("failed to check inline CSS")]
    CssBudget(#[source] self::css_budget::CssBudgetError),
    /// Error while writing output files.
    #[error("failed to write output files")]
    Output(#[source] self::output::OutputError),
}

/// A page entry.
///
/// A page represents a future HTML file.
#[derive(Debug, Default)]
pub struct Page {
    /// Input file path from which the entry comes from.
    pub input_path: PathBuf,

    /// Output file path, relative to the output directory.
    pub output_path: PathBuf,

    /// Content of the entry.
    pub content: String,
}

/// A file entry.
///
/// A file is copied to the output directory as it is.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct File {
    /// Input file path from which the entry comes from.
    pub input_path: PathBuf,

    /// Output file path, relative to the output directory.
    pub output_path: PathBuf,
}

/// An entry (page or file).
#[derive(Debug)]
pub enum Entry {
    /// Page entry.
    Page(Page),
    /// File entry.
    File(File),
}

/// Summary of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of pages.
    pub pages: usize,

    /// Number of copied files.
    pub files: usize,

    /// Time spent building.
    pub duration: Duration,
}

/// Split entries into pages and files.
fn split_entries(entry_rx: Receiver<Entry>, (page_tx, file_tx): (Sender<Page>, Sender<File>)) {
    for entry in entry_rx {
        match entry {
            Entry::Page(page) => page_tx.send(page).unwrap(),
            Entry::File(file) => file_tx.send(file).unwrap(),
        }
    }
}

/// Walk input files, then run the page stages.
///
/// The CSS budget is enforced in production mode, or when `force_css_budget`
/// is set.
fn pages_and_files(
    config: &Config,
    force_css_budget: bool,
) -> Result<(Pipeline<Page>, Pipeline<File>), BuildError> {
    let (page_pipeline, file_pipeline) = Pipeline::new_try(|tx| self::input::run(config, tx))
        .map_err(BuildError::Input)?
        .fork(split_entries);

    let page_pipeline = page_pipeline
        .pipe_try(|rx, tx| self::scss::run(config, rx, tx))
        .map_err(BuildError::Scss)?;

    let page_pipeline = if force_css_budget || config.mode.is_production() {
        page_pipeline
            .pipe_try(|rx, tx| self::css_budget::run(config, rx, tx))
            .map_err(BuildError::CssBudget)?
    } else {
        tracing::debug!("Skipping inline CSS budget in {:?} mode", config.mode);
        page_pipeline
    };

    Ok((page_pipeline, file_pipeline))
}

/// Count the entries of a pipeline.
fn count_entries(entries: Pipeline<Entry>, start_time: Instant) -> BuildReport {
    let (pages, files) = entries
        .into_iter()
        .fold((0, 0), |(pages, files), entry| match entry {
            Entry::Page(_) => (pages + 1, files),
            Entry::File(_) => (pages, files + 1),
        });

    BuildReport {
        pages,
        files,
        duration: start_time.elapsed(),
    }
}

/// Build the site with given configuration.
///
/// Output files are written only once every page has passed the inline CSS
/// budget.
pub fn build(config: &Config) -> Result<BuildReport, BuildError> {
    // Check if configuration is normalized
    debug_assert!(config
        .config_path
        .as_ref()
        .map_or(true, |path| path.is_absolute()));
    debug_assert!(config.input_dir.is_absolute());
    debug_assert!(config.output_dir.is_absolute());

    let start_time = Instant::now();

    let (page_pipeline, file_pipeline) = pages_and_files(config, false)?;

    let page_pipeline = page_pipeline.pipe(|rx, tx| self::minify_html::run(config, rx, tx));

    let entries = Pipeline::merge_try((page_pipeline, file_pipeline), |rx, tx| {
        self::output::run(config, rx, tx)
    })
    .map_err(BuildError::Output)?;

    Ok(count_entries(entries, start_time))
}

/// Check the inline CSS budget of every page without writing anything.
///
/// The budget is enforced whatever the build mode.
pub fn check(config: &Config) -> Result<BuildReport, BuildError> {
    let start_time = Instant::now();

    let (page_pipeline, file_pipeline) = pages_and_files(config, true)?;

    let entries = page_pipeline
        .map(Entry::Page)
        .into_iter()
        .chain(file_pipeline.map(Entry::File))
        .collect();

    Ok(count_entries(entries, start_time))
}

#[cfg(test)]
mod tests {
    use assert_fs::{prelude::*, TempDir};

    use super::{build, check, BuildError};
    use crate::config::{BuildMode, Config};

    const PAGE: &str = concat!(
        "<!doctype html>\n",
        "<html ⚡>\n",
        "<head>\n",
        "  <style amp-boilerplate>body{visibility:hidden}</style>",
        "<noscript><style amp-boilerplate>body{visibility:visible}</style></noscript>\n",
        "  <style amp-custom>\n    body {  color:  red;  }\n  </style>\n",
        "</head>\n",
        "<body>\n  <p>Hello</p>\n</body>\n",
        "</html>\n",
    );

    fn site(pages: &[(&str, &str)]) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();

        for (path, content) in pages {
            dir.child("site").child(path).write_str(content).unwrap();
        }

        let root = dir.path().canonicalize().unwrap();

        let config = Config {
            input_dir: root.join("site"),
            output_dir: root.join("_site"),
            ..Config::default()
        };

        (dir, config)
    }

    #[test]
    fn build_production() {
        let (dir, config) = site(&[("index.html", PAGE), ("robots.txt", "User-agent: *\n")]);

        let report = build(&config).unwrap();

        assert_eq!((report.pages, report.files), (1, 1));

        dir.child("_site/index.html").assert(predicates::str::contains(
            "<style amp-custom>body{color:red}</style>",
        ));
        dir.child("_site/index.html").assert(predicates::str::contains(
            "<style amp-boilerplate>body{visibility:hidden}</style>",
        ));
        dir.child("_site/robots.txt").assert("User-agent: *\n");
    }

    #[test]
    fn build_development() {
        let (dir, config) = site(&[("index.html", PAGE)]);

        let config = Config {
            mode: BuildMode::Development,
            max_css_bytes: 1,
            ..config
        };

        build(&config).unwrap();

        dir.child("_site/index.html").assert(PAGE);
    }

    #[test]
    fn fail_over_budget_without_output() {
        let (dir, config) = site(&[("index.html", PAGE), ("about.html", PAGE)]);

        let config = Config {
            max_css_bytes: 8,
            ..config
        };

        let error = build(&config).unwrap_err();

        assert!(matches!(error, BuildError::CssBudget(_)));
        dir.child("_site").assert(predicates::path::missing());
    }

    #[test]
    fn check_forces_budget() {
        let (dir, config) = site(&[("index.html", PAGE)]);

        let config = Config {
            mode: BuildMode::Development,
            max_css_bytes: 8,
            ..config
        };

        assert!(matches!(check(&config), Err(BuildError::CssBudget(_))));

        let config = Config {
            max_css_bytes: 1024,
            ..config
        };

        let report = check(&config).unwrap();

        assert_eq!(report.pages, 1);
        dir.child("_site").assert(predicates::path::missing());
    }
}
