//! Path utility functions for normalization.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                // Nothing to pop, or only `..` so far
                _ => result.push(component),
            },
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Resolve `path` against `base` when relative, then normalize.
///
/// For example, with base `/work/docs`, `../mpf/mpf` becomes `/work/mpf/mpf`
/// and `/srv/fixtures` is returned unchanged.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}
