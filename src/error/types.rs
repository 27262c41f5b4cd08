//! Custom error types for the clone pipeline

use thiserror::Error;

/// Main error type for degit operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DegitError {
    /// Specifier Error - input does not match `owner/repo[/sub/path][#ref]`
    #[error(
        "Invalid repository specifier '{input}': expected owner/repo[/sub/path][#ref]"
    )]
    InvalidSpecifier { input: String },

    /// HTTP Error - error status, or a redirect without a location
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Redirect chain exceeded the configured cap
    #[error("Too many redirects (limit {limit}) while fetching {url}")]
    TooManyRedirects { limit: usize, url: String },

    /// Download Error - transport or write failure while streaming the archive
    #[error("Download error: {message}")]
    Download { message: String },

    /// The archive has no top-level directory entry
    #[error("No top-level directory found in archive {archive}")]
    NoWrapperFound { archive: String },

    /// Extract Error - archive could not be read or unpacked
    #[error("Extract error: {message}")]
    Extract { message: String },

    /// Filesystem Error - file operation failed
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },

    /// Configuration Error - invalid settings
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DegitError {
    /// Get the process exit code for this error type
    ///
    /// Every fatal error terminates the CLI with the same status.
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create an invalid specifier error
    #[inline]
    pub fn invalid_specifier<S: Into<String>>(input: S) -> Self {
        Self::InvalidSpecifier {
            input: input.into(),
        }
    }

    /// Create an HTTP error
    #[inline]
    pub fn http<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a download error
    #[inline]
    pub fn download<S: Into<String>>(message: S) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    /// Create an extract error
    #[inline]
    pub fn extract<S: Into<String>>(message: S) -> Self {
        Self::Extract {
            message: message.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
