//! Redirect-following HTTP GET

use crate::error::DegitError;
use anyhow::Result;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, Url};
use tracing::debug;

/// Issues GET requests and follows redirects up to a fixed cap
///
/// Redirects are handled here rather than by `reqwest` so that a missing
/// `Location` header and an exhausted redirect budget surface as distinct
/// errors.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_redirects: usize,
}

impl Fetcher {
    /// Create a fetcher that follows at most `max_redirects` redirects
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized
    pub fn new(max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .user_agent(concat!("degit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DegitError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            max_redirects,
        })
    }

    /// Redirect cap for this fetcher
    #[must_use]
    pub const fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// GET `url`, following redirects, and return the unread response
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL cannot be parsed or the request cannot be sent ([`DegitError::Download`])
    /// - The final status is 4xx/5xx, or a redirect has no `Location` ([`DegitError::Http`])
    /// - More than `max_redirects` redirects are chained ([`DegitError::TooManyRedirects`])
    pub async fn fetch(&self, url: &str) -> Result<Response> {
        let mut current = Url::parse(url)
            .map_err(|e| DegitError::download(format!("Invalid URL '{url}': {e}")))?;
        let mut redirects = 0;

        loop {
            debug!("GET {}", current);
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| DegitError::download(format!("Request to {current} failed: {e}")))?;

            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        DegitError::http(
                            status.as_u16(),
                            format!("redirect from {current} has no location header"),
                        )
                    })?;

                let next = current.join(location).map_err(|e| {
                    DegitError::http(
                        status.as_u16(),
                        format!("invalid redirect location '{location}' from {current}: {e}"),
                    )
                })?;

                if redirects >= self.max_redirects {
                    return Err(DegitError::TooManyRedirects {
                        limit: self.max_redirects,
                        url: url.to_owned(),
                    }
                    .into());
                }

                redirects += 1;
                debug!("Redirect #{} ({}) -> {}", redirects, status.as_u16(), next);
                current = next;
                continue;
            }

            let reason = status.canonical_reason().unwrap_or("unexpected status");
            return Err(DegitError::http(status.as_u16(), format!("{reason} ({current})")).into());
        }
    }
}
