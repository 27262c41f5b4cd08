//! Wrapper discovery and selective extraction of `.tar.gz` snapshots
//!
//! Archive services wrap a snapshot in a single top-level directory named
//! after the repository and ref (e.g. `widgets-2f1c9e0/`). Extraction finds
//! that directory, selects `<wrapper><sub_path>` and strips the prefix so
//! the selected subtree lands directly in the destination.

use crate::error::DegitError;
use crate::utils::path::{normalize_path, resolves_within};
use anyhow::Result;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Outcome of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Name of the discovered top-level directory
    pub wrapper: String,
    /// Number of archive entries written to the destination
    pub entries: usize,
}

fn open_archive(archive: &Path) -> Result<Archive<GzDecoder<File>>> {
    let file = File::open(archive).map_err(|e| {
        DegitError::extract(format!("Failed to open archive {}: {e}", archive.display()))
    })?;
    Ok(Archive::new(GzDecoder::new(file)))
}

fn read_error(archive: &Path, e: &std::io::Error) -> DegitError {
    DegitError::extract(format!("Failed to read archive {}: {e}", archive.display()))
}

/// Find the first top-level directory entry in the archive
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened or decoded ([`DegitError::Extract`])
/// - No entry is a single-component directory ([`DegitError::NoWrapperFound`])
pub fn find_wrapper(archive: &Path) -> Result<String> {
    let mut tar = open_archive(archive)?;
    let entries = tar.entries().map_err(|e| read_error(archive, &e))?;

    for entry in entries {
        let entry = entry.map_err(|e| read_error(archive, &e))?;
        let raw = entry.path_bytes();
        if !entry.header().entry_type().is_dir() && !raw.ends_with(b"/") {
            continue;
        }

        let raw = String::from_utf8_lossy(&raw).into_owned();
        let mut components = Path::new(&raw).components();
        if let (Some(Component::Normal(name)), None) = (components.next(), components.next()) {
            let wrapper = name.to_string_lossy().into_owned();
            debug!("Archive wrapper directory: {}", wrapper);
            return Ok(wrapper);
        }
    }

    Err(DegitError::NoWrapperFound {
        archive: archive.display().to_string(),
    }
    .into())
}

/// Number of leading components removed from selected entries
///
/// `wrapper/` strips 1, `wrapper/src/` strips 2.
#[must_use]
pub fn strip_count(selected: &str) -> usize {
    selected.split('/').count().saturating_sub(1)
}

/// Drop the first `count` components of an archive path
///
/// Returns `None` when nothing is left, or when the remainder is not a
/// plain relative path (contains `..` or a root).
#[must_use]
pub fn strip_components(raw: &str, count: usize) -> Option<PathBuf> {
    let remainder: Vec<&str> = raw
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .skip(count)
        .collect();

    if remainder.is_empty() {
        return None;
    }

    let relative: PathBuf = remainder.iter().collect();
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return None;
    }

    Some(relative)
}

/// Extract `<wrapper><sub_path>` from `archive` into `destination`
///
/// `sub_path` is a normalized sub-path (`/` for the whole tree, `/src/` for
/// a sub-directory). Entries outside the selected subtree are ignored.
///
/// # Errors
///
/// Returns an error if:
/// - Wrapper discovery fails (see [`find_wrapper`])
/// - The destination cannot be created or resolved ([`DegitError::Filesystem`])
/// - An entry cannot be read or unpacked ([`DegitError::Extract`])
pub fn extract(archive: &Path, sub_path: &str, destination: &Path) -> Result<ExtractSummary> {
    let wrapper = find_wrapper(archive)?;
    let selected = format!("{wrapper}{sub_path}");
    let strip = strip_count(&selected);
    debug!("Extracting '{}' (strip {}) into {:?}", selected, strip, destination);

    fs::create_dir_all(destination).map_err(|e| {
        DegitError::filesystem(format!(
            "Failed to create destination {}: {e}",
            destination.display()
        ))
    })?;
    let root = fs::canonicalize(destination).map_err(|e| {
        DegitError::filesystem(format!(
            "Failed to resolve destination {}: {e}",
            destination.display()
        ))
    })?;

    let mut tar = open_archive(archive)?;
    let entries = tar.entries().map_err(|e| read_error(archive, &e))?;
    let mut extracted = 0;

    for entry in entries {
        let mut entry = entry.map_err(|e| read_error(archive, &e))?;
        let entry_type = entry.header().entry_type();
        let raw = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        let member = if entry_type.is_dir() && !raw.ends_with('/') {
            format!("{raw}/")
        } else {
            raw.clone()
        };
        if !member.starts_with(&selected) {
            continue;
        }

        let Some(relative) = strip_components(&raw, strip) else {
            debug!("Skipping entry '{}'", raw);
            continue;
        };
        let target = destination.join(&relative);
        if !resolves_within(&root, &target) {
            debug!("Skipping entry '{}' that resolves outside the destination", raw);
            continue;
        }
        if entry_type.is_symlink() && !symlink_within(&entry, &relative) {
            debug!("Skipping symlink '{}' pointing outside the destination", raw);
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DegitError::filesystem(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        if entry_type.is_hard_link() {
            if link_within(&entry, &selected, strip, &root, &target)? {
                extracted += 1;
            }
            continue;
        }

        entry.unpack(&target).map_err(|e| {
            DegitError::extract(format!("Failed to unpack '{raw}' to {}: {e}", target.display()))
        })?;
        extracted += 1;
    }

    Ok(ExtractSummary {
        wrapper,
        entries: extracted,
    })
}

/// Run [`extract`] on the blocking thread pool
///
/// # Errors
///
/// Returns the error from [`extract`], or [`DegitError::Extract`] if the
/// blocking task panics or is cancelled.
pub async fn extract_in_background(
    archive: PathBuf,
    sub_path: String,
    destination: PathBuf,
) -> Result<ExtractSummary> {
    tokio::task::spawn_blocking(move || extract(&archive, &sub_path, &destination))
        .await
        .map_err(|e| DegitError::extract(format!("Extraction task failed: {e}")))?
}

/// Check that a symlink entry placed at `relative` points inside the destination
///
/// Absolute link targets are refused; relative ones are resolved lexically
/// from the directory holding the link.
fn symlink_within<R: std::io::Read>(entry: &tar::Entry<'_, R>, relative: &Path) -> bool {
    let Some(link_name) = entry
        .link_name_bytes()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    else {
        return false;
    };

    let link = Path::new(&link_name);
    if link.has_root() || link.is_absolute() {
        return false;
    }

    let base = relative.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(link))
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

/// Recreate a hard-link entry against its stripped target
///
/// Returns `false` when the link points outside the selected subtree, or
/// its source resolves outside the destination.
fn link_within<R: std::io::Read>(
    entry: &tar::Entry<'_, R>,
    selected: &str,
    strip: usize,
    root: &Path,
    target: &Path,
) -> Result<bool> {
    let Some(link_name) = entry
        .link_name_bytes()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    else {
        return Ok(false);
    };

    let Some(source) = strip_components(&link_name, strip).filter(|_| link_name.starts_with(selected))
    else {
        debug!("Skipping hard link to '{}' outside the selection", link_name);
        return Ok(false);
    };

    let source = root.join(source);
    if !resolves_within(root, &source) {
        debug!("Skipping hard link to '{}' outside the destination", link_name);
        return Ok(false);
    }

    // Replace anything an earlier entry left at the link path
    let _ = fs::remove_file(target);
    fs::hard_link(&source, target).map_err(|e| {
        DegitError::extract(format!(
            "Failed to link {} to {}: {e}",
            target.display(),
            source.display()
        ))
    })?;
    Ok(true)
}
