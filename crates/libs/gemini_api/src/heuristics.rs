//! The last-resort tier: a deterministic summary built purely from the
//! label pass. Must never fail.

use crate::prompts::label_list;
use common_types::{LabelSummary, NarrativeSummary, Season, StyleCategory};

fn classify(lowercase_labels: &str) -> StyleCategory {
    if lowercase_labels.contains("formal") || lowercase_labels.contains("suit") {
        StyleCategory::Formal
    } else if lowercase_labels.contains("casual") || lowercase_labels.contains("t-shirt") {
        StyleCategory::CasualChic
    } else if lowercase_labels.contains("vintage") {
        StyleCategory::Vintage
    } else {
        StyleCategory::Classic
    }
}

pub(crate) fn narrative_from_labels(labels: &LabelSummary) -> NarrativeSummary {
    let style_category = classify(&label_list(labels).to_lowercase());
    let detected = if labels.labels.is_empty() {
        "No labels detected".to_string()
    } else {
        labels
            .labels
            .iter()
            .take(5)
            .map(|label| label.description.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    NarrativeSummary {
        style_category,
        summary: format!("Outfit analysis based on detected items: {detected}."),
        top_colors: labels
            .colors
            .iter()
            .take(5)
            .map(common_types::DominantColor::css)
            .collect(),
        suggestions: vec![
            "Consider adding accessories to complete the look".to_string(),
            "Try experimenting with different color combinations".to_string(),
            "Mix and match with complementary pieces".to_string(),
        ],
        occasion: "Casual".to_string(),
        season: Season::AllSeason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::LabelAnnotation;

    fn labels_of(descriptions: &[&str]) -> LabelSummary {
        LabelSummary {
            labels: descriptions
                .iter()
                .map(|description| LabelAnnotation {
                    description: (*description).to_string(),
                    score: 0.8,
                    mid: None,
                })
                .collect(),
            ..LabelSummary::default()
        }
    }

    #[test]
    fn style_classification_by_substring() {
        assert_eq!(
            narrative_from_labels(&labels_of(&["Suit", "Tie"])).style_category,
            StyleCategory::Formal
        );
        assert_eq!(
            narrative_from_labels(&labels_of(&["T-shirt", "Jeans"])).style_category,
            StyleCategory::CasualChic
        );
        assert_eq!(
            narrative_from_labels(&labels_of(&["Vintage dress"])).style_category,
            StyleCategory::Vintage
        );
        assert_eq!(
            narrative_from_labels(&labels_of(&["Jacket"])).style_category,
            StyleCategory::Classic
        );
    }

    #[test]
    fn summary_names_at_most_five_items() {
        let labels = labels_of(&["A", "B", "C", "D", "E", "F"]);
        let summary = narrative_from_labels(&labels).summary;
        assert_eq!(
            summary,
            "Outfit analysis based on detected items: A, B, C, D, E."
        );
    }

    #[test]
    fn empty_labels_still_produce_a_complete_summary() {
        let summary = narrative_from_labels(&LabelSummary::default());
        assert_eq!(summary.style_category, StyleCategory::Classic);
        assert!(summary.summary.contains("No labels detected"));
        assert_eq!(summary.suggestions.len(), 3);
        assert_eq!(summary.occasion, "Casual");
        assert_eq!(summary.season, Season::AllSeason);
    }
}
