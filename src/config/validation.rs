//! Settings validation logic

use crate::config::Settings;
use crate::error::DegitError;
use anyhow::Result;
use reqwest::Url;

/// Validate resolved settings
///
/// # Errors
///
/// Returns an error if:
/// - The base URL cannot be parsed
/// - The base URL scheme is not `http` or `https`
/// - The base URL has no host
#[inline]
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_base_url(&settings.base_url)
}

/// Validate an archive base URL
///
/// # Errors
///
/// Returns an error if the URL is not an absolute `http`/`https` URL with a host
#[inline]
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url).map_err(|e| {
        DegitError::configuration(format!("Invalid base URL '{base_url}': {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DegitError::configuration(format!(
            "Unsupported base URL scheme '{}' in '{base_url}'. Use http or https",
            url.scheme()
        ))
        .into());
    }

    if url.host_str().is_none() {
        return Err(
            DegitError::configuration(format!("Base URL has no host: '{base_url}'")).into(),
        );
    }

    Ok(())
}
