//! Path manipulation and validation utilities

use crate::error::DegitError;
use anyhow::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components lexically
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep leading '..' components, they escape whatever base is used
                if matches!(components.last(), None | Some(Component::ParentDir)) {
                    components.push(component);
                } else {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Check that `path` is relative and stays inside its base once normalized
#[must_use]
pub fn is_contained(path: &str) -> bool {
    let path_obj = Path::new(path);
    if path_obj.has_root() || path_obj.is_absolute() {
        return false;
    }

    let normalized = normalize_path(path_obj);
    if normalized.as_os_str().is_empty() {
        return false;
    }

    normalized
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

/// Resolve a manifest-relative path against `root`
///
/// # Errors
///
/// Returns an error if the path is absolute or escapes `root`
pub fn resolve_within(root: &Path, path: &str) -> Result<PathBuf> {
    if path.trim().is_empty() || !is_contained(path) {
        return Err(DegitError::filesystem(format!(
            "Refusing path outside the destination: '{path}'"
        ))
        .into());
    }

    Ok(root.join(normalize_path(Path::new(path))))
}

/// Check that `target` stays inside `root` once symlinks are followed
///
/// `root` must already be canonical. The deepest ancestor of `target` that
/// exists on disk (`target` itself included) is canonicalized; components
/// below it do not exist yet and cannot redirect anywhere. A dangling
/// symlink on the way counts as outside.
#[must_use]
pub fn resolves_within(root: &Path, target: &Path) -> bool {
    target
        .ancestors()
        .find(|ancestor| fs::symlink_metadata(ancestor).is_ok())
        .and_then(|existing| fs::canonicalize(existing).ok())
        .is_some_and(|resolved| resolved.starts_with(root))
}
