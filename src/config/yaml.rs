//! YAML settings file loading

use crate::config::Settings;
use crate::error::DegitError;
use crate::system::System;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Load and parse a YAML settings file
///
/// Missing keys fall back to their defaults; unknown keys are rejected.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The content is not valid settings YAML ([`DegitError::Configuration`])
pub fn load_settings(system: &dyn System, path: &Path) -> Result<Settings> {
    let content = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    // An empty file is a valid "all defaults" document
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(&content).map_err(|e| {
        let location = e
            .location()
            .map(|loc| format!(" at line {}, column {}", loc.line(), loc.column()))
            .unwrap_or_default();
        DegitError::configuration(format!(
            "Failed to parse settings file {}{location}: {e}",
            path.display()
        ))
        .into()
    })
}
