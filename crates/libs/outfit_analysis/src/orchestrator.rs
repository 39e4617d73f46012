//! Drives the per-photo pipeline and the strictly sequential batch
//! loop. Sequential processing is deliberate backpressure for the
//! rate-limited providers, not an oversight.

use crate::AnalysisError;
use crate::record::{build_outfit_record, stable_photo_key};
use crate::resolver::ImageResolver;
use async_trait::async_trait;
use common_types::{
    ImagePayload, LabelSummary, NarrativeSummary, OutfitRecord, PhotoReference, RecommendationSet,
};
use gemini_api::GeminiClient;
use outfit_store::{OutfitStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use vision_api::{VisionClient, VisionError};

/// Seam for the label-detection collaborator.
#[async_trait]
pub trait LabelExtractor: Send + Sync {
    async fn extract(&self, image: &ImagePayload) -> Result<LabelSummary, VisionError>;
}

#[async_trait]
impl LabelExtractor for VisionClient {
    async fn extract(&self, image: &ImagePayload) -> Result<LabelSummary, VisionError> {
        VisionClient::extract(self, image).await
    }
}

/// Seam for the narrative collaborator. Both operations are total.
#[async_trait]
pub trait StyleAnalyzer: Send + Sync {
    async fn analyze_style(
        &self,
        labels: &LabelSummary,
        photo_url: Option<&str>,
    ) -> NarrativeSummary;

    async fn generate_recommendations(&self, outfits: &[OutfitRecord]) -> RecommendationSet;
}

#[async_trait]
impl StyleAnalyzer for GeminiClient {
    async fn analyze_style(
        &self,
        labels: &LabelSummary,
        photo_url: Option<&str>,
    ) -> NarrativeSummary {
        GeminiClient::analyze_style(self, labels, photo_url).await
    }

    async fn generate_recommendations(&self, outfits: &[OutfitRecord]) -> RecommendationSet {
        GeminiClient::generate_recommendations(self, outfits).await
    }
}

/// Outcome of one single-photo analysis.
#[derive(Debug)]
pub enum AnalyzeOutcome {
    /// The canonical photo URL already has a record; nothing was done.
    Skipped { photo_url: String },
    Stored { record: OutfitRecord },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub photo_id: Option<String>,
    #[serde(flatten)]
    pub status: BatchItemStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "status")]
pub enum BatchItemStatus {
    Analyzed { outfit_id: String },
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemError {
    pub photo_id: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub processed: usize,
    pub errors: usize,
    pub results: Vec<BatchItemResult>,
    pub failures: Vec<BatchItemError>,
}

pub struct AnalysisPipeline {
    resolver: ImageResolver,
    labels: Arc<dyn LabelExtractor>,
    styles: Arc<dyn StyleAnalyzer>,
    store: Arc<dyn OutfitStore>,
}

pub(crate) fn require_user(user_id: &str) -> Result<(), AnalysisError> {
    if user_id.trim().is_empty() {
        return Err(AnalysisError::InvalidInput("Not authenticated".to_string()));
    }
    Ok(())
}

impl AnalysisPipeline {
    #[must_use]
    pub fn new(
        labels: Arc<dyn LabelExtractor>,
        styles: Arc<dyn StyleAnalyzer>,
        store: Arc<dyn OutfitStore>,
    ) -> Self {
        Self {
            resolver: ImageResolver::new(),
            labels,
            styles,
            store,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: ImageResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Analyzes one photo and stores the record, skipping photos whose
    /// canonical URL already has one.
    pub async fn analyze_photo(
        &self,
        user_id: &str,
        reference: &PhotoReference,
        bearer: Option<&str>,
    ) -> Result<AnalyzeOutcome, AnalysisError> {
        require_user(user_id)?;
        if !reference.has_source() {
            return Err(AnalysisError::InvalidInput(
                "Photo URL, base64 data, or local path required".to_string(),
            ));
        }

        if let Some(key) = stable_photo_key(reference) {
            if self.store.photo_exists(user_id, &key).await? {
                info!("Photo already analyzed, skipping: {key}");
                return Ok(AnalyzeOutcome::Skipped { photo_url: key });
            }
        }

        let payload = self.resolver.resolve(reference, bearer).await?;
        let labels = self.labels.extract(&payload).await?;
        let hint = stable_photo_key(reference);
        let narrative = self.styles.analyze_style(&labels, hint.as_deref()).await;
        let record = build_outfit_record(reference, &labels, narrative, user_id);
        self.store.store_outfit(user_id, &record).await?;
        info!(
            "✅ Outfit stored: {} ({})",
            record.id, record.style_category
        );
        Ok(AnalyzeOutcome::Stored { record })
    }

    /// Runs the pipeline over a list of photos, strictly sequentially.
    /// One failing photo never aborts the batch; its error is reported
    /// alongside the other results. The one exception is a store that
    /// was never initialized, which fails the whole request.
    pub async fn process_batch(
        &self,
        user_id: &str,
        photos: &[PhotoReference],
        bearer: Option<&str>,
    ) -> Result<BatchOutcome, AnalysisError> {
        require_user(user_id)?;
        if photos.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Photos array required".to_string(),
            ));
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for photo in photos {
            let photo_id = photo.identifier().map(ToString::to_string);
            match self.analyze_photo(user_id, photo, bearer).await {
                Ok(AnalyzeOutcome::Stored { record }) => results.push(BatchItemResult {
                    photo_id,
                    status: BatchItemStatus::Analyzed {
                        outfit_id: record.id,
                    },
                }),
                Ok(AnalyzeOutcome::Skipped { .. }) => results.push(BatchItemResult {
                    photo_id,
                    status: BatchItemStatus::Skipped,
                }),
                Err(fatal @ AnalysisError::Store(StoreError::Unavailable(_))) => {
                    return Err(fatal);
                }
                Err(error) => failures.push(BatchItemError {
                    photo_id,
                    error: error.to_string(),
                }),
            }
        }

        info!(
            "✅ Batch analysis complete: processed {} errors {}",
            results.len(),
            failures.len()
        );
        Ok(BatchOutcome {
            processed: results.len(),
            errors: failures.len(),
            results,
            failures,
        })
    }

    /// The user's records, newest first.
    pub async fn list_outfits(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<OutfitRecord>, AnalysisError> {
        require_user(user_id)?;
        Ok(self.store.get_user_outfits(user_id, limit).await?)
    }

    /// Point lookup by record id over the user's collection.
    pub async fn get_outfit(
        &self,
        user_id: &str,
        outfit_id: &str,
    ) -> Result<Option<OutfitRecord>, AnalysisError> {
        let outfits = self.list_outfits(user_id, crate::stats::STATS_SCAN_LIMIT).await?;
        Ok(outfits.into_iter().find(|outfit| outfit.id == outfit_id))
    }

    pub async fn delete_outfit(
        &self,
        user_id: &str,
        outfit_id: &str,
    ) -> Result<(), AnalysisError> {
        require_user(user_id)?;
        Ok(self.store.delete_outfit(user_id, outfit_id).await?)
    }

    pub(crate) fn store(&self) -> &dyn OutfitStore {
        self.store.as_ref()
    }

    pub(crate) fn styles(&self) -> &dyn StyleAnalyzer {
        self.styles.as_ref()
    }
}
