use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// A validated store-relative media path.
///
/// Canonical reference form for everything persisted in entity records:
/// forward slashes, no leading or trailing slash, no traversal, and a
/// conservative character set that is safe as a filesystem path on any
/// host platform.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MediaPath(String);

impl MediaPath {
    /// Validate and normalize a store-relative path.
    pub fn parse(path: &str) -> Result<Self, StorageError> {
        let trimmed = path.trim();

        if trimmed.is_empty() {
            return Err(StorageError::InvalidPath("path cannot be empty".into()));
        }

        if trimmed.len() > 512 {
            return Err(StorageError::InvalidPath(
                "path exceeds maximum length of 512 characters".into(),
            ));
        }

        if trimmed.contains('\0') {
            return Err(StorageError::InvalidPath(
                "path must not contain null bytes".into(),
            ));
        }

        if trimmed.contains('\\') {
            return Err(StorageError::InvalidPath(
                "path must not contain backslashes".into(),
            ));
        }

        if trimmed.starts_with('/') || trimmed.ends_with('/') {
            return Err(StorageError::InvalidPath(
                "path must not start or end with '/'".into(),
            ));
        }

        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(StorageError::InvalidPath(
                    "path must not contain empty segments".into(),
                ));
            }
            if segment.starts_with('.') {
                return Err(StorageError::InvalidPath(
                    "path segments must not start with '.'".into(),
                ));
            }
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
        {
            return Err(StorageError::InvalidPath(
                "path contains invalid characters (allowed: a-zA-Z0-9, /, -, _, .)".into(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Append a file name, producing a validated child path.
    pub fn join(&self, segment: &str) -> Result<Self, StorageError> {
        Self::parse(&format!("{}/{}", self.0, segment))
    }

    /// Whether this path sits under the given folder prefix.
    pub fn starts_with(&self, prefix: &MediaPath) -> bool {
        self.0 == prefix.0 || self.0.starts_with(&format!("{}/", prefix.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaPath({})", self.0)
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MediaPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MediaPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
