#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

//! Client for the image label-detection provider.
//!
//! One `extract` entry point, two transports: a privileged call using a
//! service-account bearer token, retried once over plain keyed REST
//! when it fails. Both transports send the identical annotate request;
//! the error surfaces only after both are exhausted.

mod annotate;

pub use annotate::LABEL_FEATURES;

use annotate::{AnnotateBatchResponse, annotate_request, normalize};
use bon::bon;
use common_types::{ApiCallEvent, CallObserver, ImagePayload, LabelSummary, TracingObserver};
use google_auth::{AuthError, TokenProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";
const DEFAULT_REST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("no Vision API credential configured")]
    MissingCredential,
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Vision API error (status {status}): {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed Vision API response: {0}")]
    Data(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    token_provider: Option<Arc<TokenProvider>>,
    rest_timeout: Duration,
    observer: Arc<dyn CallObserver>,
}

#[bon]
impl VisionClient {
    #[builder]
    pub fn new(
        api_key: Option<String>,
        token_provider: Option<Arc<TokenProvider>>,
        base_url: Option<String>,
        rest_timeout_secs: Option<u64>,
        observer: Option<Arc<dyn CallObserver>>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            token_provider,
            rest_timeout: Duration::from_secs(
                rest_timeout_secs.unwrap_or(DEFAULT_REST_TIMEOUT_SECS),
            ),
            observer: observer.unwrap_or_else(|| Arc::new(TracingObserver)),
        }
    }

    /// Runs label detection on the given image. Tries the privileged
    /// transport first when a key file is configured, then the keyed
    /// REST transport once.
    pub async fn extract(&self, image: &ImagePayload) -> Result<LabelSummary, VisionError> {
        if self.token_provider.is_none() && self.api_key.is_none() {
            return Err(VisionError::MissingCredential);
        }

        if let Some(provider) = &self.token_provider {
            match self.annotate_privileged(image, provider).await {
                Ok(summary) => return Ok(summary),
                Err(error) => {
                    warn!("Vision privileged transport failed, trying keyed REST: {error}");
                }
            }
        }

        self.annotate_keyed(image).await
    }

    async fn annotate_privileged(
        &self,
        image: &ImagePayload,
        provider: &TokenProvider,
    ) -> Result<LabelSummary, VisionError> {
        let token = provider.bearer_token().await?;
        let started = Instant::now();
        // The privileged transport deliberately carries no request
        // timeout; only the REST retry is bounded.
        let result = async {
            let response = self
                .http
                .post(format!("{}/v1/images:annotate", self.base_url))
                .bearer_auth(token)
                .json(&annotate_request(image))
                .send()
                .await?;
            self.decode_response(response).await
        }
        .await;
        self.observe("Google Vision API", image, started, &result);
        result
    }

    async fn annotate_keyed(&self, image: &ImagePayload) -> Result<LabelSummary, VisionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(VisionError::MissingCredential);
        };
        let started = Instant::now();
        let result = async {
            let response = self
                .http
                .post(format!("{}/v1/images:annotate", self.base_url))
                .query(&[("key", api_key)])
                .timeout(self.rest_timeout)
                .json(&annotate_request(image))
                .send()
                .await?;
            self.decode_response(response).await
        }
        .await;
        self.observe("Google Vision API (REST)", image, started, &result);
        result
    }

    async fn decode_response(
        &self,
        response: reqwest::Response,
    ) -> Result<LabelSummary, VisionError> {
        if !response.status().is_success() {
            return Err(VisionError::Provider {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let batch: AnnotateBatchResponse = response.json().await?;
        normalize(batch)
    }

    fn observe(
        &self,
        provider: &'static str,
        image: &ImagePayload,
        started: Instant,
        result: &Result<LabelSummary, VisionError>,
    ) {
        let detail = match result {
            Ok(summary) => format!(
                "image={} labels={} colors={} objects={}",
                match image {
                    ImagePayload::InlineBase64(_) => "[BASE64]",
                    ImagePayload::Url(url) => url.as_str(),
                },
                summary.labels.len(),
                summary.colors.len(),
                summary.objects.len()
            ),
            Err(_) => String::new(),
        };
        self.observer.api_call(&ApiCallEvent {
            provider,
            operation: "annotate",
            duration: started.elapsed(),
            detail,
            error: result.as_ref().err().map(ToString::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extract_without_any_credential_fails_immediately() {
        let client = VisionClient::builder().build();
        let error = client
            .extract(&ImagePayload::Url("https://example.com/fit.jpg".to_string()))
            .await
            .expect_err("no credential");
        assert!(matches!(error, VisionError::MissingCredential));
    }

    #[tokio::test]
    async fn keyed_transport_error_surfaces_after_exhaustion() {
        // No privileged credential, unroutable REST endpoint: the error
        // that surfaces is the keyed transport's.
        let client = VisionClient::builder()
            .api_key("test-key".to_string())
            .base_url("http://127.0.0.1:9".to_string())
            .rest_timeout_secs(1)
            .build();
        let error = client
            .extract(&ImagePayload::InlineBase64("aGVsbG8=".to_string()))
            .await
            .expect_err("unroutable endpoint");
        assert!(matches!(error, VisionError::Transport(_)));
    }
}
