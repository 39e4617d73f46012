//! Prompt construction. The wording is not load-bearing; the requested
//! JSON schemas are, and the parser in `parse` mirrors them.

use common_types::{LabelSummary, OutfitRecord};
use std::collections::BTreeMap;

pub(crate) fn label_list(labels: &LabelSummary) -> String {
    if labels.labels.is_empty() {
        return "No labels detected".to_string();
    }
    labels
        .labels
        .iter()
        .map(|label| label.description.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn color_list(labels: &LabelSummary) -> String {
    if labels.colors.is_empty() {
        return "No colors detected".to_string();
    }
    labels
        .colors
        .iter()
        .take(5)
        .map(common_types::DominantColor::css)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn object_list(labels: &LabelSummary) -> String {
    if labels.objects.is_empty() {
        return "No objects detected".to_string();
    }
    labels.objects.join(", ")
}

pub(crate) fn style_prompt(labels: &LabelSummary) -> String {
    format!(
        r#"You are a professional fashion stylist. Analyze this outfit based on the following information from image analysis:

Vision API Results:
- Detected Items/Labels: {labels}
- Dominant Colors: {colors}
- Objects: {objects}

Please provide a comprehensive analysis in the following JSON format:
{{
  "styleCategory": "one of: Streetwear, Formal, Casual Chic, Vintage, Athleisure, Bohemian, Minimalist, Classic, Trendy, Eclectic",
  "summary": "A brief 2-3 sentence description of the outfit's overall style and aesthetic",
  "topColors": ["array of 3-5 main colors identified"],
  "suggestions": ["array of 3-5 practical styling suggestions or improvements"],
  "occasion": "suggested occasion for this outfit (e.g., 'Daytime Meeting', 'Casual Weekend', 'Evening Event')",
  "season": "suggested season (Spring, Summer, Fall, Winter, All-Season)"
}}

Be concise, practical, and fashion-forward in your analysis."#,
        labels = label_list(labels),
        colors = color_list(labels),
        objects = object_list(labels),
    )
}

pub(crate) fn recommendations_prompt(outfits: &[OutfitRecord]) -> String {
    let mut style_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for outfit in outfits {
        *style_counts.entry(outfit.style_category.as_str()).or_default() += 1;
    }
    let common_styles = serde_json::to_string(&style_counts).unwrap_or_default();
    let frequent_colors = outfits
        .iter()
        .flat_map(|outfit| outfit.top_colors.iter())
        .take(10)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Based on a user's outfit history, provide personalized fashion recommendations:

Style Profile:
- Most Common Styles: {common_styles}
- Frequently Used Colors: {frequent_colors}

Provide recommendations in JSON format:
{{
  "recommendedStyles": ["array of 2-3 style categories to try"],
  "colorSuggestions": ["array of 3-5 color combinations to experiment with"],
  "tips": ["array of 3-5 personalized styling tips"],
  "nextOutfitIdeas": ["array of 3-5 specific outfit ideas based on their style"]
}}"#
    )
}
