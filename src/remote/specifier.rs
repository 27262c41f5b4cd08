//! Repository specifier parsing
//!
//! A specifier has the shape `owner/repo[/sub/path][#ref]`.

use crate::error::DegitError;
use anyhow::Result;
use core::fmt;
use core::str::FromStr;
use regex::Regex;

/// `<user>/<repo>`, then an optional `/<sub-path>` up to the first `#`,
/// then an optional `#<ref>` that may itself contain `/` and `#`
const SPECIFIER_PATTERN: &str = r"^([^/]+)/([^/#]+)(/[^#]*)?(#.+)?$";

/// Archive name used when no ref is given
pub const DEFAULT_REF: &str = "HEAD";

/// A parsed repository specifier
///
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneSpec {
    repository: String,
    sub_path: String,
    reference: Option<String>,
}

impl CloneSpec {
    /// Parse a specifier string
    ///
    /// # Errors
    ///
    /// Returns [`DegitError::InvalidSpecifier`] if the input does not match
    /// `owner/repo[/sub/path][#ref]`.
    pub fn parse(input: &str) -> Result<Self> {
        let pattern = Regex::new(SPECIFIER_PATTERN)?;
        let captures = pattern
            .captures(input)
            .ok_or_else(|| DegitError::invalid_specifier(input))?;

        let (Some(user), Some(name)) = (captures.get(1), captures.get(2)) else {
            return Err(DegitError::invalid_specifier(input).into());
        };

        let sub_path = captures
            .get(3)
            .map_or_else(|| "/".to_owned(), |m| normalize_sub_path(m.as_str()));
        let reference = captures
            .get(4)
            .map(|m| normalize_ref(m.as_str()))
            .filter(|r| !r.is_empty());

        return Ok(Self {
            repository: format!("{}/{}", user.as_str(), name.as_str()),
            sub_path,
            reference,
        });
    }

    /// `owner/name`
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Normalized sub-path, always starting and ending with `/`
    #[must_use]
    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    /// Explicit ref, or `None` for the default branch head
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// The ref as it appears in archive URLs
    #[must_use]
    pub fn ref_or_head(&self) -> &str {
        self.reference.as_deref().unwrap_or(DEFAULT_REF)
    }

    /// Build the archive download URL against a base such as `https://github.com`
    #[must_use]
    pub fn archive_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/archive/{}.tar.gz",
            base_url.trim_end_matches('/'),
            self.repository,
            self.ref_or_head()
        )
    }

    /// File name of the temporary archive inside the destination
    ///
    /// Path separators in the ref are replaced so the file always lands
    /// directly in the destination root.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}.tar.gz", self.ref_or_head().replace(['/', '\\'], "-"))
    }
}

impl FromStr for CloneSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CloneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repository)?;
        if self.sub_path != "/" {
            write!(f, "{}", self.sub_path.trim_end_matches('/'))?;
        }
        if let Some(reference) = &self.reference {
            write!(f, "#{reference}")?;
        }
        Ok(())
    }
}

/// Wrap a sub-path in `/` and collapse every run of separators into one
///
/// Idempotent: normalizing an already normalized path returns it unchanged.
#[must_use]
pub fn normalize_sub_path(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len() + 2);
    for c in format!("/{raw}/").chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    normalized
}

/// Strip every leading `#` from a ref capture
#[must_use]
pub fn normalize_ref(raw: &str) -> String {
    raw.trim_start_matches('#').to_owned()
}
