//! Utility functions for paths.

use std::path::{Component, Path, PathBuf};

/// Extend [`std::path::Path`] with utility methods.
pub trait PathExt {
    /// Normalize the path by removing unnecessary separators and `.` and `..`
    /// components.
    ///
    /// This method calls [`normalize_path`] under the hood.
    fn normalize(&self) -> PathBuf;

    /// Check if the path designates an HTML output, i.e. ends with `.html`.
    fn is_html(&self) -> bool;
}

impl<T> PathExt for T
where
    T: AsRef<Path>,
{
    fn normalize(&self) -> PathBuf {
        self::normalize_path(self)
    }

    fn is_html(&self) -> bool {
        self.as_ref()
            .extension()
            .is_some_and(|extension| extension == "html")
    }
}

/// Normalize a path by removing unnecessary separators and `.` and `..`
/// components.
///
/// Unlike [`std::fs::canonicalize`], symbolic links are not resolved and the
/// path does not need to exist. `..` never climbs above the root.
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let mut result: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                result.push(component)
            },
            Component::ParentDir => match result.last() {
                Some(Component::Normal(_)) => {
                    result.pop();
                },
                Some(Component::Prefix(_) | Component::RootDir) => {},
                Some(Component::ParentDir) | Some(Component::CurDir) | None => {
                    result.push(component)
                },
            },
            Component::CurDir => {},
        }
    }

    if result.is_empty() {
        return PathBuf::from(Component::CurDir.as_os_str());
    }

    result.into_iter().collect()
}
