//! Turns a photo reference into data the label provider can consume:
//! local files and remote-store files become inline base64, everything
//! else passes through as a URL. Exactly one outbound read per call.

use crate::AnalysisError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common_types::{ImagePayload, PhotoReference};
use tracing::{debug, warn};

const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

pub struct ImageResolver {
    http: reqwest::Client,
    drive_base_url: String,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageResolver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_drive_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.drive_base_url = base_url.into();
        self
    }

    /// Resolves the reference to image data. Local paths fail hard when
    /// the file is missing; a failed remote-store fetch falls back to
    /// the reference's URL instead of raising.
    pub async fn resolve(
        &self,
        reference: &PhotoReference,
        bearer: Option<&str>,
    ) -> Result<ImagePayload, AnalysisError> {
        if let Some(path) = &reference.local_path {
            if !path.exists() {
                return Err(AnalysisError::FileNotFound(path.clone()));
            }
            let bytes = tokio::fs::read(path).await?;
            debug!("📁 Using local file: {}", path.display());
            return Ok(ImagePayload::InlineBase64(STANDARD.encode(bytes)));
        }

        if let (Some(file_id), Some(token)) = (reference.real_drive_file_id(), bearer) {
            match self.fetch_drive_bytes(file_id, token).await {
                Ok(bytes) => return Ok(ImagePayload::InlineBase64(STANDARD.encode(bytes))),
                Err(error) => {
                    warn!("Failed to download from Drive, using provided URL: {error}");
                }
            }
        }

        if let Some(base64) = &reference.base64 {
            return Ok(ImagePayload::InlineBase64(base64.clone()));
        }
        if let Some(url) = &reference.url {
            return Ok(ImagePayload::Url(url.clone()));
        }
        Err(AnalysisError::InvalidInput(
            "Photo URL, base64 data, or local path required".to_string(),
        ))
    }

    async fn fetch_drive_bytes(&self, file_id: &str, token: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self
            .http
            .get(format!("{}/files/{file_id}", self.drive_base_url))
            .query(&[("alt", "media")])
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_local_file_fails_hard() {
        let reference = PhotoReference {
            local_path: Some("/definitely/not/here.jpg".into()),
            url: Some("https://example.com/fallback.jpg".to_string()),
            ..PhotoReference::default()
        };
        let error = ImageResolver::new()
            .resolve(&reference, None)
            .await
            .expect_err("missing file");
        assert!(matches!(error, AnalysisError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn local_file_is_read_and_inline_encoded() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"fake-jpeg-bytes").expect("write");
        let reference = PhotoReference {
            local_path: Some(file.path().to_path_buf()),
            ..PhotoReference::default()
        };
        let payload = ImageResolver::new()
            .resolve(&reference, None)
            .await
            .expect("resolve");
        assert_eq!(
            payload,
            ImagePayload::InlineBase64(STANDARD.encode(b"fake-jpeg-bytes"))
        );
    }

    #[tokio::test]
    async fn inline_and_url_references_pass_through() {
        let resolver = ImageResolver::new();

        let reference = PhotoReference {
            base64: Some("aGVsbG8=".to_string()),
            ..PhotoReference::default()
        };
        let payload = resolver.resolve(&reference, None).await.expect("resolve");
        assert!(payload.is_inline());

        let reference = PhotoReference {
            url: Some("https://example.com/fit.jpg".to_string()),
            ..PhotoReference::default()
        };
        let payload = resolver.resolve(&reference, None).await.expect("resolve");
        assert_eq!(
            payload,
            ImagePayload::Url("https://example.com/fit.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn failed_drive_fetch_soft_fails_to_url() {
        // Unroutable Drive endpoint: the fetch fails, the reference's
        // URL is used instead, and no error surfaces.
        let resolver = ImageResolver::new().with_drive_base_url("http://127.0.0.1:9");
        let reference = PhotoReference {
            drive_file_id: Some("1a2b3c".to_string()),
            url: Some("https://example.com/fit.jpg".to_string()),
            ..PhotoReference::default()
        };
        let payload = resolver
            .resolve(&reference, Some("user-token"))
            .await
            .expect("soft fail");
        assert_eq!(
            payload,
            ImagePayload::Url("https://example.com/fit.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn drive_reference_without_bearer_uses_url() {
        let reference = PhotoReference {
            drive_file_id: Some("1a2b3c".to_string()),
            url: Some("https://example.com/fit.jpg".to_string()),
            ..PhotoReference::default()
        };
        let payload = ImageResolver::new()
            .resolve(&reference, None)
            .await
            .expect("resolve");
        assert_eq!(
            payload,
            ImagePayload::Url("https://example.com/fit.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn sourceless_reference_is_invalid() {
        let reference = PhotoReference {
            photo_id: Some("p1".to_string()),
            ..PhotoReference::default()
        };
        let error = ImageResolver::new()
            .resolve(&reference, None)
            .await
            .expect_err("no source");
        assert!(matches!(error, AnalysisError::InvalidInput(_)));
    }
}
