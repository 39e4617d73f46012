use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub analysis: AnalysisSettings,
    pub google: GoogleSettings,
    pub logging: LoggingSettings,
    pub secrets: SecretSettings,
}

/// Knobs for the analysis pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisSettings {
    /// Candidate narrative models, tried in order.
    pub model_candidates: Vec<String>,
    /// Bounded timeout for keyed REST calls, in seconds.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleSettings {
    pub project_id: String,
    /// Firestore database id, usually `(default)`.
    pub firestore_database: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub vision_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Path to the service-account JSON key file.
    pub credentials_file: Option<PathBuf>,
}
