//! Read-only aggregation over stored records: counters for the stats
//! view and the recommendation gate.

use crate::orchestrator::{AnalysisPipeline, StyleAnalyzer, require_user};
use crate::AnalysisError;
use chrono::{DateTime, Utc};
use common_types::{OutfitRecord, RecommendationSet};
use outfit_store::OutfitStore;
use serde::Serialize;
use std::collections::BTreeMap;

/// At most this many records feed the stats counters.
pub const STATS_SCAN_LIMIT: usize = 1000;
/// At most this many records feed recommendation generation.
pub const RECOMMENDATION_SCAN_LIMIT: usize = 50;

pub const NEED_MORE_DATA_MESSAGE: &str =
    "Analyze more outfits to get personalized recommendations";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_outfits: usize,
    pub style_counts: BTreeMap<String, u32>,
    pub color_counts: BTreeMap<String, u32>,
    pub occasion_counts: BTreeMap<String, u32>,
    pub season_counts: BTreeMap<String, u32>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub set: RecommendationSet,
    pub based_on: usize,
}

fn tally(outfits: &[OutfitRecord]) -> UserStats {
    let mut style_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut color_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut occasion_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut season_counts: BTreeMap<String, u32> = BTreeMap::new();

    for outfit in outfits {
        *style_counts
            .entry(outfit.style_category.to_string())
            .or_default() += 1;
        for color in &outfit.top_colors {
            *color_counts.entry(color.clone()).or_default() += 1;
        }
        if !outfit.occasion.is_empty() {
            *occasion_counts.entry(outfit.occasion.clone()).or_default() += 1;
        }
        *season_counts.entry(outfit.season.to_string()).or_default() += 1;
    }

    UserStats {
        total_outfits: outfits.len(),
        style_counts,
        color_counts,
        occasion_counts,
        season_counts,
        last_updated: Utc::now(),
    }
}

/// Counts styles, colors, occasions and seasons over the user's stored
/// records (up to [`STATS_SCAN_LIMIT`]).
pub async fn get_user_stats(
    store: &dyn OutfitStore,
    user_id: &str,
) -> Result<UserStats, AnalysisError> {
    require_user(user_id)?;
    let outfits = store.get_user_outfits(user_id, STATS_SCAN_LIMIT).await?;
    Ok(tally(&outfits))
}

/// Personalized recommendations from up to
/// [`RECOMMENDATION_SCAN_LIMIT`] records. With no history at all, a
/// fixed placeholder comes back and the narrative client is never
/// called.
pub async fn get_recommendations(
    store: &dyn OutfitStore,
    styles: &dyn StyleAnalyzer,
    user_id: &str,
) -> Result<Recommendations, AnalysisError> {
    require_user(user_id)?;
    let outfits = store
        .get_user_outfits(user_id, RECOMMENDATION_SCAN_LIMIT)
        .await?;
    if outfits.is_empty() {
        return Ok(Recommendations {
            message: Some(NEED_MORE_DATA_MESSAGE.to_string()),
            set: RecommendationSet::default(),
            based_on: 0,
        });
    }

    let set = styles.generate_recommendations(&outfits).await;
    Ok(Recommendations {
        message: None,
        based_on: outfits.len(),
        set,
    })
}

impl AnalysisPipeline {
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats, AnalysisError> {
        get_user_stats(self.store(), user_id).await
    }

    pub async fn recommendations(&self, user_id: &str) -> Result<Recommendations, AnalysisError> {
        get_recommendations(self.store(), self.styles(), user_id).await
    }
}
