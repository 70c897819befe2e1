//! Utility functions for path manipulation

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path without touching the filesystem
///
/// Removes `.` components and resolves `..` against preceding components.
/// `..` directly under the root is dropped; leading `..` of a relative path
/// is kept. An empty result becomes `.`.
///
/// # Examples
///
/// ```
/// use pvr_extract::utils::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
/// assert_eq!(normalize_path(Path::new("")), PathBuf::from("."));
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().map(|c| c.as_os_str()).collect()
}
