#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! Client for the generative-text provider, specialized to outfit
//! style analysis and recommendations.
//!
//! Remote attempts form an ordered chain of (candidate model,
//! transport) pairs driven by [`GeminiClient::generate`]: the versioned
//! REST endpoints first, then the request shape the vendor SDK issues.
//! A "model not found" failure advances to the next candidate model,
//! any other failure advances to the next transport, and the first
//! well-formed text payload wins. The public analysis methods never
//! fail: when every remote attempt is exhausted they synthesize a
//! result from the label summary, and when a payload will not parse
//! they degrade to a canned structure around the raw text.

mod heuristics;
mod parse;
mod prompts;

use bon::bon;
use common_types::{
    ApiCallEvent, CallObserver, LabelSummary, NarrativeSummary, OutfitRecord, RecommendationSet,
    TracingObserver,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GOOGLE_GEMINI_API_KEY not configured")]
    MissingCredential,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed Gemini response: {0}")]
    MalformedResponse(String),
}

impl GeminiError {
    /// Whether the failure means the model itself is unknown to this
    /// endpoint, as opposed to a transport or payload problem.
    #[must_use]
    pub fn is_model_not_found(&self) -> bool {
        match self {
            Self::Api { status, body } => {
                *status == reqwest::StatusCode::NOT_FOUND
                    || body.contains("not found")
                    || body.contains("is not found for API version")
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1Beta,
    V1,
}

impl ApiVersion {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::V1Beta => "v1beta",
            Self::V1 => "v1",
        }
    }
}

/// One transport strategy in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiTransport {
    Rest(ApiVersion),
    /// Header-keyed request against the default endpoint version, the
    /// shape the vendor SDK issues.
    Client,
}

impl fmt::Display for GeminiTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest(version) => write!(f, "REST {}", version.path()),
            Self::Client => f.write_str("SDK client"),
        }
    }
}

const TRANSPORT_CHAIN: [GeminiTransport; 3] = [
    GeminiTransport::Rest(ApiVersion::V1Beta),
    GeminiTransport::Rest(ApiVersion::V1),
    GeminiTransport::Client,
];

/// The (model, transport) pair that served a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: String,
    pub transport: GeminiTransport,
}

#[derive(Debug)]
pub struct GeneratedText {
    pub text: String,
    pub selection: ModelSelection,
}

/// One failed attempt, kept for diagnostics.
#[derive(Debug)]
pub struct AttemptFailure {
    pub model: String,
    pub transport: GeminiTransport,
    pub error: GeminiError,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model_candidates: Vec<String>,
    timeout: Duration,
    observer: Arc<dyn CallObserver>,
}

#[bon]
impl GeminiClient {
    #[builder]
    pub fn new(
        api_key: Option<String>,
        model_candidates: Option<Vec<String>>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
        observer: Option<Arc<dyn CallObserver>>,
    ) -> Self {
        let model_candidates = model_candidates
            .filter(|candidates| !candidates.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_MODEL.to_string()]);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model_candidates,
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            observer: observer.unwrap_or_else(|| Arc::new(TracingObserver)),
        }
    }

    /// Produces the structured style analysis for one photo. Total: a
    /// fully-populated summary comes back no matter how the provider
    /// behaves.
    pub async fn analyze_style(
        &self,
        labels: &LabelSummary,
        photo_url: Option<&str>,
    ) -> NarrativeSummary {
        debug!("Analyzing style for {}", photo_url.unwrap_or("[inline image]"));
        let prompt = prompts::style_prompt(labels);
        match self.generate(&prompt, "analyzeStyle").await {
            Ok(generated) => parse::narrative_from_text(&generated.text).unwrap_or_else(|error| {
                warn!("Failed to parse style JSON, using text fallback: {error}");
                parse::canned_narrative(&generated.text, labels)
            }),
            Err(failures) => {
                warn!(
                    "Gemini unavailable after {} attempts; creating basic analysis from label data",
                    failures.len()
                );
                heuristics::narrative_from_labels(labels)
            }
        }
    }

    /// Produces personalized recommendations from the user's outfit
    /// history. Total, like [`Self::analyze_style`].
    pub async fn generate_recommendations(&self, outfits: &[OutfitRecord]) -> RecommendationSet {
        let prompt = prompts::recommendations_prompt(outfits);
        match self.generate(&prompt, "generateRecommendations").await {
            Ok(generated) => {
                parse::recommendations_from_text(&generated.text).unwrap_or_else(|error| {
                    warn!("Failed to parse recommendations JSON, using canned set: {error}");
                    parse::canned_recommendations()
                })
            }
            Err(failures) => {
                warn!(
                    "Gemini unavailable after {} attempts; returning canned recommendations",
                    failures.len()
                );
                parse::canned_recommendations()
            }
        }
    }

    /// Runs the fallback chain for one prompt and returns the first
    /// well-formed text payload together with the winning selection,
    /// or every collected failure.
    pub async fn generate(
        &self,
        prompt: &str,
        operation: &'static str,
    ) -> Result<GeneratedText, Vec<AttemptFailure>> {
        if self.api_key.is_none() {
            warn!("{}", GeminiError::MissingCredential);
            return Err(Vec::new());
        }

        let mut failures = Vec::new();
        'models: for model in &self.model_candidates {
            for transport in TRANSPORT_CHAIN {
                let started = Instant::now();
                let result = self.attempt(model, transport, prompt).await;
                self.observe(operation, model, started, &result);
                match result {
                    Ok(text) => {
                        info!("✅ {operation} served by {model} via {transport}");
                        return Ok(GeneratedText {
                            text,
                            selection: ModelSelection {
                                model: model.clone(),
                                transport,
                            },
                        });
                    }
                    Err(error) => {
                        warn!("Gemini attempt failed ({model} via {transport}): {error}");
                        let advance_model = error.is_model_not_found();
                        failures.push(AttemptFailure {
                            model: model.clone(),
                            transport,
                            error,
                        });
                        if advance_model {
                            continue 'models;
                        }
                    }
                }
            }
            // Every transport failed for reasons other than an unknown
            // model; further candidates would fail the same way.
            break;
        }
        Err(failures)
    }

    async fn attempt(
        &self,
        model: &str,
        transport: GeminiTransport,
        prompt: &str,
    ) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingCredential)?;
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [TextPart { text: prompt }],
            }],
        };

        let request = match transport {
            GeminiTransport::Rest(version) => self
                .http
                .post(format!(
                    "{}/{}/models/{model}:generateContent",
                    self.base_url,
                    version.path()
                ))
                .query(&[("key", api_key)]),
            GeminiTransport::Client => self
                .http
                .post(format!(
                    "{}/{}/models/{model}:generateContent",
                    self.base_url,
                    ApiVersion::V1Beta.path()
                ))
                .header("x-goog-api-key", api_key),
        };

        let response = request.timeout(self.timeout).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(GeminiError::Api {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                GeminiError::MalformedResponse("no text in first candidate".to_string())
            })
    }

    fn observe(
        &self,
        operation: &'static str,
        model: &str,
        started: Instant,
        result: &Result<String, GeminiError>,
    ) {
        self.observer.api_call(&ApiCallEvent {
            provider: "Google Gemini API",
            operation,
            duration: started.elapsed(),
            detail: match result {
                Ok(text) => format!("model={model} chars={}", text.len()),
                Err(_) => format!("model={model}"),
            },
            error: result.as_ref().err().map(ToString::to_string),
        });
    }
}
