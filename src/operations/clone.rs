//! Clone operation coordination

use crate::archive::{ArchiveHandle, extract_in_background};
use crate::config::Settings;
use crate::error::DegitError;
use crate::events::EventSink;
use crate::operations::actions::run_actions;
use crate::remote::{ArchiveDownloader, CloneSpec, Fetcher};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// Coordinates one clone: download, extract, clean up, run actions
#[non_exhaustive]
pub struct CloneOperation<'src> {
    spec: CloneSpec,
    base_url: String,
    fetcher: Fetcher,
    events: &'src dyn EventSink,
}

impl<'src> CloneOperation<'src> {
    /// Create a clone operation for `spec`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized
    #[inline]
    pub fn new(spec: CloneSpec, settings: &Settings, events: &'src dyn EventSink) -> Result<Self> {
        Ok(Self {
            spec,
            base_url: settings.base_url.clone(),
            fetcher: Fetcher::new(settings.max_redirects)?,
            events,
        })
    }

    /// The parsed specifier this operation clones
    #[must_use]
    pub const fn spec(&self) -> &CloneSpec {
        &self.spec
    }

    /// Materialize the snapshot into `destination`
    ///
    /// Download and extraction failures abort the clone. Failing to delete
    /// the temporary archive, or to run the manifest, only emits a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The destination cannot be created
    /// - The archive cannot be downloaded
    /// - The archive cannot be extracted
    pub async fn execute(&self, destination: &Path) -> Result<()> {
        tokio::fs::create_dir_all(destination).await.map_err(|e| {
            DegitError::filesystem(format!(
                "Failed to create destination {}: {e}",
                destination.display()
            ))
        })?;

        let archive = ArchiveHandle::new(destination.join(self.spec.archive_file_name()));
        let downloader = ArchiveDownloader::new(&self.fetcher, &self.spec, &self.base_url);

        self.events.info(&format!(
            "downloading {} to {}",
            downloader.url(),
            archive.path().display()
        ));
        let bytes = downloader.download_to(archive.path()).await?;
        debug!("Archive size: {} bytes", bytes);

        self.events
            .info(&format!("extracting {} to {}", self.spec, destination.display()));
        let extracted = extract_in_background(
            archive.path().to_path_buf(),
            self.spec.sub_path().to_owned(),
            destination.to_path_buf(),
        )
        .await;

        // The archive goes away whether or not extraction worked
        let archive_path = archive.path().to_path_buf();
        if let Err(e) = archive.release().await {
            self.events.warn(&format!(
                "could not remove {}: {e}",
                archive_path.display()
            ));
        }

        let summary = extracted?;
        self.events.info(&format!(
            "extracted {} entries from {} to {}",
            summary.entries,
            summary.wrapper,
            destination.display()
        ));

        match run_actions(destination, self.events).await {
            Ok(actions) if actions.actions > 0 => {
                self.events.info(&format!(
                    "ran {} action(s) from degit.json, removed {} path(s)",
                    actions.actions, actions.removed
                ));
            }
            Ok(_) => {}
            Err(e) => self.events.warn(&format!("post-extraction actions failed: {e:#}")),
        }

        self.events
            .info(&format!("cloned {} to {}", self.spec, destination.display()));
        Ok(())
    }
}
