use crate::{LabelAnnotation, Season, StyleCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dominant color as persisted: CSS string plus prevalence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColorEntry {
    pub rgb: String,
    pub score: f32,
}

/// One analyzed outfit, the persisted unit. Exactly one record exists
/// per (user, canonical photo URL); its `id` is derived from the URL so
/// re-analysis overwrites rather than duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitRecord {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub photo_id: Option<String>,
    pub drive_file_id: Option<String>,
    pub vision_tags: Vec<String>,
    pub vision_labels: Vec<LabelAnnotation>,
    pub top_colors: Vec<String>,
    pub dominant_colors: Vec<DominantColorEntry>,
    pub objects: Vec<String>,
    pub gemini_summary: String,
    pub style_category: StyleCategory,
    pub occasion: String,
    pub season: Season,
    pub suggestions: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_document_field_names() {
        let record = OutfitRecord {
            id: "abc".to_string(),
            user_id: "user-1".to_string(),
            photo_url: "drive-1a2b".to_string(),
            photo_id: None,
            drive_file_id: Some("1a2b".to_string()),
            vision_tags: vec!["Jacket".to_string()],
            vision_labels: vec![LabelAnnotation {
                description: "Jacket".to_string(),
                score: 0.97,
                mid: Some("/m/032b3c".to_string()),
            }],
            top_colors: vec!["Navy".to_string()],
            dominant_colors: vec![DominantColorEntry {
                rgb: "rgb(20, 30, 60)".to_string(),
                score: 0.5,
            }],
            objects: vec!["Jacket".to_string()],
            gemini_summary: "A navy look.".to_string(),
            style_category: StyleCategory::CasualChic,
            occasion: "Casual Weekend".to_string(),
            season: Season::Fall,
            suggestions: vec!["Add a scarf".to_string()],
            processed_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["photoURL"], "drive-1a2b");
        assert_eq!(value["geminiSummary"], "A navy look.");
        assert_eq!(value["styleCategory"], "Casual Chic");
        assert_eq!(value["visionLabels"][0]["description"], "Jacket");
    }
}
