//! Wire types for the `images:annotate` endpoint and the normalization
//! into [`LabelSummary`]. Provider responses are decoded into explicit
//! shapes here; anything unrecognized is rejected at this boundary.

use crate::VisionError;
use common_types::{DominantColor, ImagePayload, LabelAnnotation, LabelSummary};
use serde::{Deserialize, Serialize};

/// The four capabilities requested on every annotate call. Text is
/// requested but discarded during normalization.
pub const LABEL_FEATURES: [(&str, u32); 4] = [
    ("LABEL_DETECTION", 20),
    ("IMAGE_PROPERTIES", 1),
    ("OBJECT_LOCALIZATION", 10),
    ("TEXT_DETECTION", 5),
];

#[derive(Serialize)]
pub(crate) struct AnnotateBatchRequest<'a> {
    requests: [AnnotateRequest<'a>; 1],
}

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    image: ImageSource<'a>,
    features: Vec<Feature>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ImageSource<'a> {
    Inline {
        content: &'a str,
    },
    Remote {
        source: RemoteSource<'a>,
    },
}

#[derive(Serialize)]
struct RemoteSource<'a> {
    #[serde(rename = "imageUri")]
    image_uri: &'a str,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

pub(crate) fn annotate_request(image: &ImagePayload) -> AnnotateBatchRequest<'_> {
    let image = match image {
        ImagePayload::InlineBase64(content) => ImageSource::Inline { content },
        ImagePayload::Url(url) => ImageSource::Remote {
            source: RemoteSource { image_uri: url },
        },
    };
    AnnotateBatchRequest {
        requests: [AnnotateRequest {
            image,
            features: LABEL_FEATURES
                .iter()
                .map(|&(kind, max_results)| Feature { kind, max_results })
                .collect(),
        }],
    }
}

#[derive(Deserialize)]
pub(crate) struct AnnotateBatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AnnotateResponse {
    label_annotations: Vec<EntityAnnotation>,
    image_properties_annotation: Option<ImageProperties>,
    localized_object_annotations: Vec<LocalizedObject>,
    // Parsed for shape validation, then discarded.
    #[allow(dead_code)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<RpcStatus>,
}

#[derive(Deserialize, Default)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    mid: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageProperties {
    dominant_colors: Option<DominantColorsAnnotation>,
}

#[derive(Deserialize)]
struct DominantColorsAnnotation {
    #[serde(default)]
    colors: Vec<ColorInfo>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ColorInfo {
    color: RgbColor,
    score: f32,
    pixel_fraction: f32,
}

/// Proto3 JSON omits zero-valued channels, so every channel defaults.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RgbColor {
    red: f32,
    green: f32,
    blue: f32,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TextAnnotation {
    #[allow(dead_code)]
    description: String,
}

#[derive(Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Converts the provider response into the internal summary, keeping
/// provider order and every returned entry.
pub(crate) fn normalize(batch: AnnotateBatchResponse) -> Result<LabelSummary, VisionError> {
    let mut responses = batch.responses;
    if responses.is_empty() {
        return Err(VisionError::Data("no responses in annotate payload".to_string()));
    }
    let response = responses.swap_remove(0);
    if let Some(error) = response.error {
        return Err(VisionError::Data(format!(
            "annotate error {}: {}",
            error.code, error.message
        )));
    }

    let labels = response
        .label_annotations
        .into_iter()
        .map(|label| LabelAnnotation {
            description: label.description,
            score: label.score,
            mid: label.mid,
        })
        .collect();

    let colors = response
        .image_properties_annotation
        .and_then(|properties| properties.dominant_colors)
        .map(|dominant| dominant.colors)
        .unwrap_or_default()
        .into_iter()
        .map(|info| DominantColor {
            red: channel(info.color.red),
            green: channel(info.color.green),
            blue: channel(info.color.blue),
            score: info.score,
            pixel_fraction: info.pixel_fraction,
        })
        .collect();

    let objects = response
        .localized_object_annotations
        .into_iter()
        .map(|object| object.name)
        .collect();

    Ok(LabelSummary {
        labels,
        colors,
        objects,
    })
}

#[derive(Deserialize, Default)]
struct LocalizedObject {
    #[serde(default)]
    name: String,
    #[allow(dead_code)]
    #[serde(default)]
    score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_shape_matches_provider_contract() {
        let body = serde_json::to_value(annotate_request(&ImagePayload::Url(
            "https://example.com/fit.jpg".to_string(),
        )))
        .expect("serialize");
        assert_eq!(
            body["requests"][0]["image"]["source"]["imageUri"],
            "https://example.com/fit.jpg"
        );
        assert_eq!(body["requests"][0]["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(body["requests"][0]["features"][0]["maxResults"], 20);
        assert_eq!(body["requests"][0]["features"][3]["type"], "TEXT_DETECTION");

        let inline = serde_json::to_value(annotate_request(&ImagePayload::InlineBase64(
            "aGVsbG8=".to_string(),
        )))
        .expect("serialize");
        assert_eq!(inline["requests"][0]["image"]["content"], "aGVsbG8=");
    }

    #[test]
    fn normalizes_labels_colors_and_objects_in_order() {
        let payload = json!({
            "responses": [{
                "labelAnnotations": [
                    {"description": "Outerwear", "score": 0.98, "mid": "/m/047vlmn"},
                    {"description": "Jeans", "score": 0.91}
                ],
                "imagePropertiesAnnotation": {
                    "dominantColors": {
                        "colors": [
                            {"color": {"red": 21.4, "green": 30.0}, "score": 0.4, "pixelFraction": 0.2},
                            {"color": {"blue": 255.0}, "score": 0.1, "pixelFraction": 0.05}
                        ]
                    }
                },
                "localizedObjectAnnotations": [
                    {"name": "Jacket", "score": 0.88},
                    {"name": "Pants", "score": 0.7}
                ],
                "textAnnotations": [{"description": "LEVI'S"}]
            }]
        });
        let batch: AnnotateBatchResponse = serde_json::from_value(payload).expect("decode");
        let summary = normalize(batch).expect("normalize");

        assert_eq!(summary.labels.len(), 2);
        assert_eq!(summary.labels[0].description, "Outerwear");
        assert_eq!(summary.labels[0].mid.as_deref(), Some("/m/047vlmn"));
        assert_eq!(summary.labels[1].mid, None);

        // Omitted channels decode as zero; values round to 0–255.
        assert_eq!(summary.colors[0].red, 21);
        assert_eq!(summary.colors[0].green, 30);
        assert_eq!(summary.colors[0].blue, 0);
        assert_eq!(summary.colors[1].blue, 255);

        assert_eq!(summary.objects, vec!["Jacket", "Pants"]);
    }

    #[test]
    fn empty_and_error_responses_are_rejected() {
        let batch: AnnotateBatchResponse =
            serde_json::from_value(json!({"responses": []})).expect("decode");
        assert!(matches!(normalize(batch), Err(VisionError::Data(_))));

        let batch: AnnotateBatchResponse = serde_json::from_value(json!({
            "responses": [{"error": {"code": 7, "message": "permission denied"}}]
        }))
        .expect("decode");
        let err = normalize(batch).expect_err("should reject");
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn absent_annotations_normalize_to_empty_summary() {
        let batch: AnnotateBatchResponse =
            serde_json::from_value(json!({"responses": [{}]})).expect("decode");
        let summary = normalize(batch).expect("normalize");
        assert!(summary.labels.is_empty());
        assert!(summary.colors.is_empty());
        assert!(summary.objects.is_empty());
    }
}
