//! Canonical photo URLs, document ids, and the record builder.

use chrono::Utc;
use common_types::{
    DominantColorEntry, LabelSummary, NarrativeSummary, OutfitRecord, PhotoReference,
};
use sha2::{Digest, Sha256};

/// The stable deduplication key for a photo, when it has one: the
/// `drive-` form for remote files, else the literal URL. References
/// with neither get no pre-check and fall through to the synthetic
/// canonical URL at build time.
#[must_use]
pub fn stable_photo_key(reference: &PhotoReference) -> Option<String> {
    if let Some(id) = reference.real_drive_file_id() {
        return Some(format!("drive-{id}"));
    }
    reference.url.clone()
}

/// The canonical photo URL, exactly one of three forms: `drive-{id}`,
/// the literal URL, or a synthetic `local-{millis}` fallback.
#[must_use]
pub fn canonical_photo_url(reference: &PhotoReference) -> String {
    stable_photo_key(reference)
        .unwrap_or_else(|| format!("local-{}", Utc::now().timestamp_millis()))
}

/// Document id for a canonical photo URL: hex SHA-256 of the URL
/// string. Pure, so re-analysis of the same URL lands on the same
/// document. The user id is deliberately not an input; records already
/// live in per-user subcollections.
#[must_use]
pub fn compute_doc_id(photo_url: &str) -> String {
    hex::encode(Sha256::digest(photo_url.as_bytes()))
}

/// Flattens one analysis pass into the persisted record. Pure apart
/// from the `processedAt` stamp (and the timestamp inside a synthetic
/// canonical URL).
#[must_use]
pub fn build_outfit_record(
    reference: &PhotoReference,
    labels: &LabelSummary,
    narrative: NarrativeSummary,
    user_id: &str,
) -> OutfitRecord {
    let photo_url = canonical_photo_url(reference);
    let drive_file_id = reference.real_drive_file_id().map(ToString::to_string);

    OutfitRecord {
        id: compute_doc_id(&photo_url),
        user_id: user_id.to_string(),
        photo_url,
        photo_id: reference.photo_id.clone().or_else(|| drive_file_id.clone()),
        drive_file_id,
        vision_tags: labels
            .labels
            .iter()
            .map(|label| label.description.clone())
            .collect(),
        vision_labels: labels.labels.clone(),
        top_colors: narrative.top_colors,
        dominant_colors: labels
            .colors
            .iter()
            .map(|color| DominantColorEntry {
                rgb: color.css(),
                score: color.score,
            })
            .collect(),
        objects: labels.objects.clone(),
        gemini_summary: narrative.summary,
        style_category: narrative.style_category,
        occasion: narrative.occasion,
        season: narrative.season,
        suggestions: narrative.suggestions,
        processed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::{DominantColor, LabelAnnotation, Season, StyleCategory};
    use std::path::PathBuf;

    fn reference(drive: bool, local: bool, url: bool) -> PhotoReference {
        PhotoReference {
            photo_id: None,
            url: url.then(|| "https://example.com/fit.jpg".to_string()),
            drive_file_id: drive.then(|| "1a2b3c".to_string()),
            local_path: local.then(|| PathBuf::from("/tmp/fit.jpg")),
            base64: None,
        }
    }

    #[test]
    fn canonical_url_three_way_rule_over_all_combinations() {
        for local in [false, true] {
            // Remote file id wins regardless of what else is present.
            for url in [false, true] {
                assert_eq!(
                    canonical_photo_url(&reference(true, local, url)),
                    "drive-1a2b3c"
                );
            }
            // Without a remote id the literal URL wins.
            assert_eq!(
                canonical_photo_url(&reference(false, local, true)),
                "https://example.com/fit.jpg"
            );
            // With neither, the synthetic fallback applies.
            assert!(canonical_photo_url(&reference(false, local, false)).starts_with("local-"));
        }
    }

    #[test]
    fn synthetic_drive_id_does_not_produce_a_drive_url() {
        let reference = PhotoReference {
            drive_file_id: Some("local-1709223951".to_string()),
            url: Some("https://example.com/upload.jpg".to_string()),
            ..PhotoReference::default()
        };
        assert_eq!(
            canonical_photo_url(&reference),
            "https://example.com/upload.jpg"
        );
        assert_eq!(stable_photo_key(&reference).as_deref(), Some("https://example.com/upload.jpg"));
    }

    #[test]
    fn references_without_stable_key_skip_the_pre_check() {
        assert_eq!(stable_photo_key(&reference(false, true, false)), None);
        assert_eq!(
            stable_photo_key(&reference(true, false, false)).as_deref(),
            Some("drive-1a2b3c")
        );
    }

    #[test]
    fn doc_id_is_deterministic_and_collision_averse() {
        let a = compute_doc_id("drive-1a2b3c");
        let b = compute_doc_id("drive-1a2b3c");
        let c = compute_doc_id("drive-1a2b3d");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    fn narrative() -> NarrativeSummary {
        NarrativeSummary {
            style_category: StyleCategory::Minimalist,
            summary: "Clean monochrome look.".to_string(),
            top_colors: vec!["Black".to_string(), "White".to_string()],
            suggestions: vec!["Add a watch".to_string()],
            occasion: "Daytime Meeting".to_string(),
            season: Season::AllSeason,
        }
    }

    fn labels() -> LabelSummary {
        LabelSummary {
            labels: vec![LabelAnnotation {
                description: "Coat".to_string(),
                score: 0.92,
                mid: None,
            }],
            colors: vec![DominantColor {
                red: 10,
                green: 10,
                blue: 10,
                score: 0.7,
                pixel_fraction: 0.6,
            }],
            objects: vec!["Coat".to_string()],
        }
    }

    #[test]
    fn builder_flattens_and_keys_by_canonical_url() {
        let record = build_outfit_record(&reference(true, false, true), &labels(), narrative(), "user-1");
        assert_eq!(record.photo_url, "drive-1a2b3c");
        assert_eq!(record.id, compute_doc_id("drive-1a2b3c"));
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.drive_file_id.as_deref(), Some("1a2b3c"));
        // The drive id doubles as the photo id hint when none was given.
        assert_eq!(record.photo_id.as_deref(), Some("1a2b3c"));
        assert_eq!(record.vision_tags, vec!["Coat"]);
        assert_eq!(record.dominant_colors[0].rgb, "rgb(10, 10, 10)");
        assert_eq!(record.style_category, StyleCategory::Minimalist);
        assert_eq!(record.top_colors, vec!["Black", "White"]);
    }

    #[test]
    fn same_reference_builds_the_same_document_id() {
        let first = build_outfit_record(&reference(true, false, false), &labels(), narrative(), "user-1");
        let second =
            build_outfit_record(&reference(true, false, false), &labels(), narrative(), "user-1");
        assert_eq!(first.id, second.id);
    }
}
