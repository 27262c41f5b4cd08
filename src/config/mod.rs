//! Configuration management module
//!
//! Resolves [`Settings`] from built-in defaults, an optional YAML file and
//! environment overrides, in that order.

pub mod validation;
pub mod yaml;

use crate::error::DegitError;
use crate::system::System;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Default archive host
pub const DEFAULT_BASE_URL: &str = "https://github.com";

/// Default cap on followed redirects
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Environment variable pointing at an explicit settings file
pub const CONFIG_ENV: &str = "DEGIT_CONFIG";

/// Environment variable overriding [`Settings::base_url`]
pub const BASE_URL_ENV: &str = "DEGIT_BASE_URL";

/// Environment variable overriding [`Settings::max_redirects`]
pub const MAX_REDIRECTS_ENV: &str = "DEGIT_MAX_REDIRECTS";

/// Runtime settings for the clone pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Settings {
    /// Scheme and host archives are requested from, e.g. `https://github.com`
    pub base_url: String,

    /// Maximum number of redirects followed by a single fetch
    pub max_redirects: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl Settings {
    /// Resolve settings for this process
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DEGIT_CONFIG` names a file that does not exist
    /// - The settings file cannot be read or parsed
    /// - An environment override is malformed
    /// - The resolved settings fail validation
    pub fn load(system: &dyn System) -> Result<Self> {
        let mut settings = match settings_path(system)? {
            Some(path) => yaml::load_settings(system, &path)?,
            None => Self::default(),
        };

        settings.apply_env(system)?;
        validation::validate_settings(&settings)?;

        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    /// Apply `DEGIT_BASE_URL` and `DEGIT_MAX_REDIRECTS` overrides
    ///
    /// # Errors
    ///
    /// Returns an error if `DEGIT_MAX_REDIRECTS` is not an unsigned integer
    pub fn apply_env(&mut self, system: &dyn System) -> Result<()> {
        if let Ok(base_url) = system.env_var(BASE_URL_ENV) {
            self.base_url = base_url;
        }

        if let Ok(raw) = system.env_var(MAX_REDIRECTS_ENV) {
            self.max_redirects = raw.trim().parse().map_err(|e| {
                DegitError::configuration(format!(
                    "{MAX_REDIRECTS_ENV} must be an unsigned integer, got '{raw}': {e}"
                ))
            })?;
        }

        Ok(())
    }
}

/// Locate the settings file, if any
///
/// An explicit `DEGIT_CONFIG` must exist; the per-user default is optional.
fn settings_path(system: &dyn System) -> Result<Option<PathBuf>> {
    if let Ok(explicit) = system.env_var(CONFIG_ENV) {
        let path = PathBuf::from(explicit);
        if !system.exists(&path) {
            return Err(DegitError::configuration(format!(
                "Settings file not found: {} (from {CONFIG_ENV})",
                path.display()
            ))
            .into());
        }
        return Ok(Some(path));
    }

    Ok(system
        .config_dir()
        .map(|dir| dir.join("degit").join("config.yaml"))
        .filter(|path| system.exists(path)))
}
