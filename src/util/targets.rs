//! Resolve browser compatibility targets.
//!
//! This module uses [`lightningcss`] (and its `browserslist` feature) under
//! the hood.

use lightningcss::targets::{Browsers, Targets};
use once_cell::sync::Lazy;
use thiserror::Error;

/// Browserslist queries used when none are configured.
pub const BROWSERSLIST_QUERY: [&str; 5] = [
    "last 2 Chrome versions",
    "last 2 Firefox versions",
    "last 2 Safari versions",
    "last 2 Edge versions",
    "iOS >= 14",
];

/// Compiled default target set.
static DEFAULT_TARGETS: Lazy<BrowserTargetSet> = Lazy::new(|| {
    BrowserTargetSet::new(BROWSERSLIST_QUERY).expect("default browserslist queries must resolve")
});

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum TargetsError {
    /// Browserslist failed to parse or resolve the queries.
    #[error("invalid browserslist queries {queries:?}: {message}")]
    Query {
        /// Queries that were given.
        queries: Vec<String>,
        /// Browserslist error message.
        message: String,
    },
    /// Queries resolved to no browser at all.
    #[error("browserslist queries {0:?} do not match any browser")]
    Empty(Vec<String>),
}

/// A set of browser targets.
///
/// Queries are resolved once into [`Targets`], which the CSS optimizer uses to
/// decide which vendor prefixes and syntax lowerings are required.
#[derive(Clone, Debug)]
pub struct BrowserTargetSet {
    /// Browserslist queries, as given.
    queries: Vec<String>,

    /// Resolved targets.
    targets: Targets,
}

impl BrowserTargetSet {
    /// Resolve a list of browserslist queries.
    pub fn new<I, S>(queries: I) -> Result<Self, TargetsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries: Vec<String> = queries
            .into_iter()
            .map(|query| query.as_ref().to_owned())
            .collect();

        let browsers = Browsers::from_browserslist(queries.iter().map(String::as_str))
            .map_err(|source| TargetsError::Query {
                queries: queries.clone(),
                message: source.to_string(),
            })?
            .ok_or_else(|| TargetsError::Empty(queries.clone()))?;

        Ok(Self {
            queries,
            targets: Targets::from(browsers),
        })
    }

    /// Return the target set compiled from [`BROWSERSLIST_QUERY`].
    ///
    /// The set is resolved on first use and shared afterwards.
    pub fn default_set() -> &'static Self {
        &DEFAULT_TARGETS
    }

    /// Return the browserslist queries.
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Return the resolved targets.
    pub fn targets(&self) -> Targets {
        self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowserTargetSet, BROWSERSLIST_QUERY};

    #[test]
    fn default_set() {
        let set = BrowserTargetSet::default_set();
        assert_eq!(set.queries(), BROWSERSLIST_QUERY);
        assert!(set.targets().browsers.is_some());
    }

    #[test]
    fn default_set_is_shared() {
        let a = BrowserTargetSet::default_set() as *const _;
        let b = BrowserTargetSet::default_set() as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn custom_queries() {
        let set = BrowserTargetSet::new(["last 1 Chrome version"]).unwrap();
        let browsers = set.targets().browsers.unwrap();
        assert!(browsers.chrome.is_some());
        assert!(browsers.ie.is_none());
    }

    #[test]
    fn invalid_query() {
        let result = BrowserTargetSet::new(["not a valid browserslist query"]);
        assert!(result.is_err());
    }
}
