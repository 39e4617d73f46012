//! Turning provider text into the fixed output schemas. The payload may
//! arrive fenced in a markdown code block or bare; anything that will
//! not deserialize into the exact schema falls back to a canned
//! structure built around the raw text.

use common_types::{LabelSummary, NarrativeSummary, RecommendationSet, Season, StyleCategory};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static JSON_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*(\{[\s\S]*\})\s*```").expect("valid fenced-JSON pattern")
});

const SUMMARY_LIMIT: usize = 200;

/// The JSON payload inside a fenced code block when present, else the
/// whole text.
pub(crate) fn json_payload(text: &str) -> &str {
    JSON_BLOCK
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or(text, |matched| matched.as_str())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NarrativeWire {
    style_category: StyleCategory,
    summary: String,
    top_colors: Vec<String>,
    suggestions: Vec<String>,
    occasion: String,
    season: Season,
}

pub(crate) fn narrative_from_text(text: &str) -> Result<NarrativeSummary, serde_json::Error> {
    let wire: NarrativeWire = serde_json::from_str(json_payload(text))?;
    Ok(NarrativeSummary {
        style_category: wire.style_category,
        summary: wire.summary,
        top_colors: wire.top_colors,
        suggestions: wire.suggestions,
        occasion: wire.occasion,
        season: wire.season,
    })
}

/// Structured stand-in for unparseable provider output: the raw text
/// becomes the summary, colors come from the label pass.
pub(crate) fn canned_narrative(text: &str, labels: &LabelSummary) -> NarrativeSummary {
    NarrativeSummary {
        style_category: StyleCategory::CasualChic,
        summary: text.chars().take(SUMMARY_LIMIT).collect(),
        top_colors: labels
            .colors
            .iter()
            .take(5)
            .map(common_types::DominantColor::css)
            .collect(),
        suggestions: vec![
            "Consider adding accessories".to_string(),
            "Try different color combinations".to_string(),
            "Experiment with layering".to_string(),
        ],
        occasion: "Casual".to_string(),
        season: Season::AllSeason,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationsWire {
    recommended_styles: Vec<String>,
    color_suggestions: Vec<String>,
    tips: Vec<String>,
    next_outfit_ideas: Vec<String>,
}

pub(crate) fn recommendations_from_text(
    text: &str,
) -> Result<RecommendationSet, serde_json::Error> {
    let wire: RecommendationsWire = serde_json::from_str(json_payload(text))?;
    Ok(RecommendationSet {
        recommended_styles: wire.recommended_styles,
        color_suggestions: wire.color_suggestions,
        tips: wire.tips,
        next_outfit_ideas: wire.next_outfit_ideas,
    })
}

pub(crate) fn canned_recommendations() -> RecommendationSet {
    RecommendationSet {
        recommended_styles: vec!["Casual Chic".to_string(), "Minimalist".to_string()],
        color_suggestions: vec!["Navy and White".to_string(), "Black and Beige".to_string()],
        tips: vec![
            "Try mixing textures".to_string(),
            "Experiment with accessories".to_string(),
        ],
        next_outfit_ideas: vec![
            "Smart casual blazer combo".to_string(),
            "Layered casual look".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::DominantColor;

    const WELL_FORMED: &str = r#"{
        "styleCategory": "Casual Chic",
        "summary": "Relaxed denim-forward look.",
        "topColors": ["Navy", "White", "Tan"],
        "suggestions": ["Add loafers", "Roll the cuffs", "Layer a cardigan"],
        "occasion": "Casual Weekend",
        "season": "Fall"
    }"#;

    fn labels_with_colors() -> LabelSummary {
        LabelSummary {
            colors: vec![
                DominantColor {
                    red: 1,
                    green: 2,
                    blue: 3,
                    score: 0.9,
                    pixel_fraction: 0.5,
                },
                DominantColor {
                    red: 4,
                    green: 5,
                    blue: 6,
                    score: 0.1,
                    pixel_fraction: 0.1,
                },
            ],
            ..LabelSummary::default()
        }
    }

    #[test]
    fn parses_bare_json() {
        let summary = narrative_from_text(WELL_FORMED).expect("parse");
        assert_eq!(summary.style_category, StyleCategory::CasualChic);
        assert_eq!(summary.season, Season::Fall);
        assert_eq!(summary.top_colors.len(), 3);
    }

    #[test]
    fn parses_fenced_json_with_and_without_language_tag() {
        let fenced = format!("Here is the analysis:\n```json\n{WELL_FORMED}\n```\nEnjoy!");
        let summary = narrative_from_text(&fenced).expect("parse fenced");
        assert_eq!(summary.occasion, "Casual Weekend");

        let fenced = format!("```\n{WELL_FORMED}\n```");
        assert!(narrative_from_text(&fenced).is_ok());
    }

    #[test]
    fn unknown_style_category_is_rejected() {
        let text = WELL_FORMED.replace("Casual Chic", "Grunge");
        assert!(narrative_from_text(&text).is_err());
    }

    #[test]
    fn canned_narrative_truncates_and_reuses_label_colors() {
        let long_text = "a".repeat(500);
        let summary = canned_narrative(&long_text, &labels_with_colors());
        assert_eq!(summary.summary.chars().count(), 200);
        assert_eq!(summary.style_category, StyleCategory::CasualChic);
        assert_eq!(
            summary.top_colors,
            vec!["rgb(1, 2, 3)".to_string(), "rgb(4, 5, 6)".to_string()]
        );
        assert_eq!(summary.suggestions.len(), 3);
        assert_eq!(summary.season, Season::AllSeason);
    }

    #[test]
    fn recommendations_parse_and_fall_back() {
        let text = r#"{
            "recommendedStyles": ["Formal"],
            "colorSuggestions": ["Black and Gold"],
            "tips": ["Invest in tailoring"],
            "nextOutfitIdeas": ["Evening suit"]
        }"#;
        let set = recommendations_from_text(text).expect("parse");
        assert_eq!(set.recommended_styles, vec!["Formal"]);

        assert!(recommendations_from_text("not json at all").is_err());
        let canned = canned_recommendations();
        assert_eq!(canned.recommended_styles.len(), 2);
        assert_eq!(canned.next_outfit_ideas.len(), 2);
    }
}
