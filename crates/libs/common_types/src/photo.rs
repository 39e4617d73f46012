use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single photo as handed to the pipeline by the photo-listing or
/// upload collaborator. At least one of `url`, `base64` or `local_path`
/// must be present for the photo to be analyzable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoReference {
    /// Caller-supplied identifier, echoed back in batch reports.
    pub photo_id: Option<String>,
    pub url: Option<String>,
    pub drive_file_id: Option<String>,
    pub local_path: Option<PathBuf>,
    /// Inline image bytes, already base64-encoded.
    pub base64: Option<String>,
}

impl PhotoReference {
    /// The remote file id, if it is a real one. Upload clients hand out
    /// synthetic `local-…` ids for photos that never lived in Drive;
    /// those must not be fetched or used as a `drive-` canonical key.
    #[must_use]
    pub fn real_drive_file_id(&self) -> Option<&str> {
        self.drive_file_id
            .as_deref()
            .filter(|id| !id.starts_with("local-"))
    }

    #[must_use]
    pub fn has_source(&self) -> bool {
        self.url.is_some() || self.base64.is_some() || self.local_path.is_some()
    }

    /// Best identifier for per-item reporting: the caller's id, falling
    /// back to the remote file id.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.photo_id
            .as_deref()
            .or_else(|| self.drive_file_id.as_deref())
    }
}

/// Image data as the label-detection provider accepts it: inline
/// base64-encoded bytes, or a URL the provider fetches itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    InlineBase64(String),
    Url(String),
}

impl ImagePayload {
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::InlineBase64(_))
    }
}
