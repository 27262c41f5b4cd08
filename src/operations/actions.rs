//! Post-extraction actions declared in `degit.json`
//!
//! The manifest is optional. When present it is a JSON array of
//! `{"action": "remove", "files": [...]}` or `{"action": "clone", "src": "..."}`
//! objects. Entries that do not match either shape are dropped, the
//! manifest is deleted as soon as it has been read, and then the remaining
//! actions run.

use crate::error::DegitError;
use crate::events::EventSink;
use crate::utils::path::{resolve_within, resolves_within};
use anyhow::{Result, anyhow};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Manifest file name, looked up at the destination root
pub const MANIFEST_FILE: &str = "degit.json";

/// A validated manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Delete files relative to the destination root
    Remove { files: Vec<String> },

    /// Reserved; accepted and ignored
    Clone { src: String },
}

/// Counts reported after running a manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSummary {
    /// Actions that survived validation
    pub actions: usize,
    /// Paths successfully removed
    pub removed: usize,
    /// Removals that failed and were reported as warnings
    pub warnings: usize,
}

/// Validate every entry of a manifest array, dropping the ones that don't conform
///
/// Returns `None` when `manifest` is not an array.
///
/// # Errors
///
/// Returns an error only if the embedded action schema cannot be compiled
pub fn validate_actions(manifest: &Value) -> Result<Option<Vec<Action>>> {
    let Some(entries) = manifest.as_array() else {
        return Ok(None);
    };

    let schema: Value = serde_json::from_str(include_str!("../../docs/degit.schema.json"))
        .map_err(|e| anyhow!("Failed to parse embedded action schema: {e}"))?;
    let validator = jsonschema::draft7::new(&schema)
        .map_err(|e| anyhow!("Failed to compile action schema: {e}"))?;

    let actions = entries
        .iter()
        .filter(|entry| {
            let valid = validator.is_valid(entry);
            if !valid {
                debug!("Dropping manifest entry {}", entry);
            }
            valid
        })
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect();

    Ok(Some(actions))
}

/// Parse manifest text
///
/// Text that is not JSON, or JSON that is not an array, yields `None`.
///
/// # Errors
///
/// See [`validate_actions`]
pub fn parse_manifest(content: &str) -> Result<Option<Vec<Action>>> {
    match serde_json::from_str::<Value>(content) {
        Ok(manifest) => validate_actions(&manifest),
        Err(e) => {
            debug!("Ignoring {} that is not JSON: {}", MANIFEST_FILE, e);
            Ok(None)
        }
    }
}

/// Read, validate and delete the manifest at `destination`
///
/// Returns `None` when there is no usable manifest; the file is left alone
/// in that case.
///
/// # Errors
///
/// Returns an error if a valid manifest cannot be deleted
pub async fn take_manifest(destination: &Path) -> Result<Option<Vec<Action>>> {
    let path = destination.join(MANIFEST_FILE);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) => {
            debug!("No usable {:?}: {}", path, e);
            return Ok(None);
        }
    };

    let Some(actions) = parse_manifest(&content)? else {
        return Ok(None);
    };

    tokio::fs::remove_file(&path).await.map_err(|e| {
        DegitError::filesystem(format!("Failed to remove {}: {e}", path.display()))
    })?;

    Ok(Some(actions))
}

/// Run the manifest found at `destination`, if any
///
/// Actions, and the removals inside each `remove` action, run concurrently
/// and in no particular order. Individual removal failures are reported
/// through `events` as warnings.
///
/// # Errors
///
/// Returns an error if the manifest cannot be deleted after reading it
pub async fn run_actions(destination: &Path, events: &dyn EventSink) -> Result<ActionSummary> {
    let Some(actions) = take_manifest(destination).await? else {
        return Ok(ActionSummary::default());
    };

    let outcomes = join_all(
        actions
            .iter()
            .map(|action| execute_action(action, destination, events)),
    )
    .await;

    let mut summary = ActionSummary {
        actions: actions.len(),
        ..ActionSummary::default()
    };
    for (removed, warnings) in outcomes {
        summary.removed += removed;
        summary.warnings += warnings;
    }

    Ok(summary)
}

/// Execute a single action, returning `(removed, warnings)`
async fn execute_action(
    action: &Action,
    destination: &Path,
    events: &dyn EventSink,
) -> (usize, usize) {
    match action {
        Action::Remove { files } => {
            let results = join_all(
                files
                    .iter()
                    .map(|file| remove_entry(destination, file)),
            )
            .await;

            let mut removed = 0;
            let mut warnings = 0;
            for (file, result) in files.iter().zip(results) {
                match result {
                    Ok(()) => {
                        removed += 1;
                        events.info(&format!("removed {file}"));
                    }
                    Err(err) => {
                        warnings += 1;
                        events.warn(&format!("could not remove {file}: {err:#}"));
                    }
                }
            }
            (removed, warnings)
        }
        Action::Clone { src } => {
            debug!("Skipping reserved clone action for '{}'", src);
            (0, 0)
        }
    }
}

/// Remove a file, or a directory tree, relative to `destination`
async fn remove_entry(destination: &Path, file: &str) -> Result<()> {
    let target = resolve_within(destination, file)?;

    // The last component may be a symlink and is removed as such; everything
    // above it has to resolve inside the destination
    let root = tokio::fs::canonicalize(destination).await?;
    let parent = target.parent().unwrap_or(destination);
    if !resolves_within(&root, parent) {
        return Err(DegitError::filesystem(format!(
            "Refusing path outside the destination: '{file}'"
        ))
        .into());
    }

    let metadata = tokio::fs::symlink_metadata(&target).await?;
    if metadata.is_dir() {
        tokio::fs::remove_dir_all(&target).await?;
    } else {
        tokio::fs::remove_file(&target).await?;
    }

    Ok(())
}
