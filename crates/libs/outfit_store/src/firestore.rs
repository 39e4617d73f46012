//! The external document store, consumed over its REST surface.
//! Documents live at `users/{userId}/outfits/{docId}`; upserts are
//! `updateMask` PATCHes (merge), lookups and listings go through
//! `runQuery`. Nothing here owns storage semantics beyond translating
//! the contract onto provider calls.

use crate::{OutfitStore, StoreError};
use async_trait::async_trait;
use bon::bon;
use chrono::{DateTime, SecondsFormat, Utc};
use common_types::{
    ApiCallEvent, CallObserver, DominantColorEntry, LabelAnnotation, OutfitRecord,
    TracingObserver,
};
use google_auth::TokenProvider;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct FirestoreOutfitStore {
    http: reqwest::Client,
    token_provider: Option<Arc<TokenProvider>>,
    base_url: String,
    documents_root: String,
    observer: Arc<dyn CallObserver>,
}

#[bon]
impl FirestoreOutfitStore {
    #[builder]
    pub fn new(
        project_id: &str,
        database_id: &str,
        token_provider: Option<Arc<TokenProvider>>,
        base_url: Option<String>,
        observer: Option<Arc<dyn CallObserver>>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_provider,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            documents_root: format!("projects/{project_id}/databases/{database_id}/documents"),
            observer: observer.unwrap_or_else(|| Arc::new(TracingObserver)),
        }
    }

    fn provider(&self) -> Result<&TokenProvider, StoreError> {
        self.token_provider.as_deref().ok_or_else(|| {
            StoreError::Unavailable(
                "no service-account credentials configured for the document store".to_string(),
            )
        })
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/{}/users/{user_id}", self.base_url, self.documents_root)
    }

    fn outfit_url(&self, user_id: &str, doc_id: &str) -> String {
        format!("{}/outfits/{doc_id}", self.user_url(user_id))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(StoreError::Provider {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn run_query(
        &self,
        user_id: &str,
        query: Value,
    ) -> Result<Vec<RawDocument>, StoreError> {
        let token = self.provider()?.bearer_token().await?;
        let response = self
            .http
            .post(format!("{}:runQuery", self.user_url(user_id)))
            .bearer_auth(token)
            .json(&json!({ "structuredQuery": query }))
            .send()
            .await?;
        let entries: Vec<RunQueryEntry> = Self::check(response).await?.json().await?;
        Ok(entries.into_iter().filter_map(|entry| entry.document).collect())
    }

    fn outfits_query(&self, limit: usize, ordered: bool) -> Value {
        let mut query = json!({
            "from": [{ "collectionId": "outfits" }],
            "limit": limit,
        });
        if ordered {
            query["orderBy"] = json!([{
                "field": { "fieldPath": "processedAt" },
                "direction": "DESCENDING"
            }]);
        }
        query
    }

    async fn ensure_user_document(&self, user_id: &str) -> Result<(), StoreError> {
        let token = self.provider()?.bearer_token().await?;
        let now = timestamp_value(&Utc::now());
        let response = self
            .http
            .patch(self.user_url(user_id))
            .bearer_auth(token)
            .query(&[
                ("updateMask.fieldPaths", "userId"),
                ("updateMask.fieldPaths", "updatedAt"),
            ])
            .json(&json!({
                "fields": {
                    "userId": string_value(user_id),
                    "updatedAt": now,
                }
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn observe(&self, operation: &'static str, started: Instant, error: Option<String>) {
        self.observer.api_call(&ApiCallEvent {
            provider: "Firestore",
            operation,
            duration: started.elapsed(),
            detail: String::new(),
            error,
        });
    }
}

#[async_trait]
impl OutfitStore for FirestoreOutfitStore {
    async fn photo_exists(&self, user_id: &str, photo_url: &str) -> Result<bool, StoreError> {
        let started = Instant::now();
        let query = json!({
            "from": [{ "collectionId": "outfits" }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "photoURL" },
                    "op": "EQUAL",
                    "value": string_value(photo_url),
                }
            },
            "limit": 1,
        });
        let result = self.run_query(user_id, query).await;
        self.observe(
            "photo_exists",
            started,
            result.as_ref().err().map(ToString::to_string),
        );
        Ok(!result?.is_empty())
    }

    async fn store_outfit(
        &self,
        user_id: &str,
        record: &OutfitRecord,
    ) -> Result<String, StoreError> {
        let started = Instant::now();
        let result = async {
            self.ensure_user_document(user_id).await?;

            let fields = encode_record(record);
            let mask: Vec<(&str, String)> = fields
                .keys()
                .map(|key| ("updateMask.fieldPaths", key.clone()))
                .collect();
            let token = self.provider()?.bearer_token().await?;
            let response = self
                .http
                .patch(self.outfit_url(user_id, &record.id))
                .bearer_auth(token)
                .query(&mask)
                .json(&json!({ "fields": fields }))
                .send()
                .await?;
            Self::check(response).await?;
            Ok(record.id.clone())
        }
        .await;
        self.observe(
            "store_outfit",
            started,
            result.as_ref().err().map(ToString::to_string),
        );
        result
    }

    async fn get_user_outfits(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<OutfitRecord>, StoreError> {
        let started = Instant::now();
        let documents = match self
            .run_query(user_id, self.outfits_query(limit, true))
            .await
        {
            Ok(documents) => documents,
            // Ordered queries can fail where no index exists; fetch
            // unordered and sort here instead.
            Err(StoreError::Provider { status, body }) => {
                warn!("Ordered outfit query failed (status {status}): {body}; fetching unordered");
                self.run_query(user_id, self.outfits_query(limit, false))
                    .await?
            }
            Err(error) => {
                self.observe("get_user_outfits", started, Some(error.to_string()));
                return Err(error);
            }
        };

        let mut outfits = documents
            .into_iter()
            .map(decode_record)
            .collect::<Result<Vec<_>, _>>()?;
        outfits.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        self.observe("get_user_outfits", started, None);
        Ok(outfits)
    }

    async fn delete_outfit(&self, user_id: &str, outfit_id: &str) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = async {
            let token = self.provider()?.bearer_token().await?;
            let response = self
                .http
                .delete(self.outfit_url(user_id, outfit_id))
                .bearer_auth(token)
                .send()
                .await?;
            Self::check(response).await?;
            Ok(())
        }
        .await;
        self.observe(
            "delete_outfit",
            started,
            result.as_ref().err().map(ToString::to_string),
        );
        result
    }
}

#[derive(Deserialize)]
struct RunQueryEntry {
    document: Option<RawDocument>,
}

#[derive(Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

// --- Firestore Value encoding -------------------------------------------

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn nullable_string(value: Option<&str>) -> Value {
    match value {
        Some(value) => string_value(value),
        None => json!({ "nullValue": null }),
    }
}

fn double_value(value: f64) -> Value {
    json!({ "doubleValue": value })
}

fn timestamp_value(value: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": value.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

fn array_value(values: Vec<Value>) -> Value {
    json!({ "arrayValue": { "values": values } })
}

fn string_array(values: &[String]) -> Value {
    array_value(values.iter().map(|value| string_value(value)).collect())
}

fn map_value(fields: Map<String, Value>) -> Value {
    json!({ "mapValue": { "fields": fields } })
}

fn label_value(label: &LabelAnnotation) -> Value {
    let mut fields = Map::new();
    fields.insert("description".to_string(), string_value(&label.description));
    fields.insert("score".to_string(), double_value(f64::from(label.score)));
    fields.insert("mid".to_string(), nullable_string(label.mid.as_deref()));
    map_value(fields)
}

fn dominant_color_value(color: &DominantColorEntry) -> Value {
    let mut fields = Map::new();
    fields.insert("rgb".to_string(), string_value(&color.rgb));
    fields.insert("score".to_string(), double_value(f64::from(color.score)));
    map_value(fields)
}

fn encode_record(record: &OutfitRecord) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("userId".to_string(), string_value(&record.user_id));
    fields.insert("photoURL".to_string(), string_value(&record.photo_url));
    fields.insert(
        "photoId".to_string(),
        nullable_string(record.photo_id.as_deref()),
    );
    fields.insert(
        "driveFileId".to_string(),
        nullable_string(record.drive_file_id.as_deref()),
    );
    fields.insert("visionTags".to_string(), string_array(&record.vision_tags));
    fields.insert(
        "visionLabels".to_string(),
        array_value(record.vision_labels.iter().map(label_value).collect()),
    );
    fields.insert("topColors".to_string(), string_array(&record.top_colors));
    fields.insert(
        "dominantColors".to_string(),
        array_value(
            record
                .dominant_colors
                .iter()
                .map(dominant_color_value)
                .collect(),
        ),
    );
    fields.insert("objects".to_string(), string_array(&record.objects));
    fields.insert(
        "geminiSummary".to_string(),
        string_value(&record.gemini_summary),
    );
    fields.insert(
        "styleCategory".to_string(),
        string_value(record.style_category.as_str()),
    );
    fields.insert("occasion".to_string(), string_value(&record.occasion));
    fields.insert("season".to_string(), string_value(record.season.as_str()));
    fields.insert("suggestions".to_string(), string_array(&record.suggestions));
    fields.insert(
        "processedAt".to_string(),
        timestamp_value(&record.processed_at),
    );
    fields.insert("updatedAt".to_string(), timestamp_value(&Utc::now()));
    fields
}

// --- Firestore Value decoding -------------------------------------------

fn str_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(ToString::to_string)
}

fn f32_field(value: &Value) -> f32 {
    value
        .get("doubleValue")
        .and_then(Value::as_f64)
        .or_else(|| {
            value
                .get("integerValue")
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse().ok())
        })
        .unwrap_or_default() as f32
}

fn array_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Vec<&'a Value> {
    fields
        .get(key)
        .and_then(|value| value.get("arrayValue"))
        .and_then(|value| value.get("values"))
        .and_then(Value::as_array)
        .map(|values| values.iter().collect())
        .unwrap_or_default()
}

fn string_array_field(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    array_field(fields, key)
        .into_iter()
        .filter_map(|value| value.get("stringValue"))
        .filter_map(Value::as_str)
        .map(ToString::to_string)
        .collect()
}

fn map_fields<'a>(value: &'a Value) -> Option<&'a Map<String, Value>> {
    value.get("mapValue")?.get("fields")?.as_object()
}

fn timestamp_field(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn decode_record(document: RawDocument) -> Result<OutfitRecord, StoreError> {
    let fields = &document.fields;
    let id = document
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    let photo_url = str_field(fields, "photoURL")
        .ok_or_else(|| StoreError::Decode(format!("document {id} has no photoURL")))?;
    let style_category = str_field(fields, "styleCategory")
        .unwrap_or_default()
        .parse()
        .map_err(|error| StoreError::Decode(format!("document {id}: {error}")))?;
    let season = str_field(fields, "season")
        .unwrap_or_default()
        .parse()
        .map_err(|error| StoreError::Decode(format!("document {id}: {error}")))?;

    let vision_labels = array_field(fields, "visionLabels")
        .into_iter()
        .filter_map(map_fields)
        .map(|label| LabelAnnotation {
            description: str_field(label, "description").unwrap_or_default(),
            score: label.get("score").map(f32_field).unwrap_or_default(),
            mid: str_field(label, "mid"),
        })
        .collect();
    let dominant_colors = array_field(fields, "dominantColors")
        .into_iter()
        .filter_map(map_fields)
        .map(|color| DominantColorEntry {
            rgb: str_field(color, "rgb").unwrap_or_default(),
            score: color.get("score").map(f32_field).unwrap_or_default(),
        })
        .collect();

    Ok(OutfitRecord {
        id,
        user_id: str_field(fields, "userId").unwrap_or_default(),
        photo_url,
        photo_id: str_field(fields, "photoId"),
        drive_file_id: str_field(fields, "driveFileId"),
        vision_tags: string_array_field(fields, "visionTags"),
        vision_labels,
        top_colors: string_array_field(fields, "topColors"),
        dominant_colors,
        objects: string_array_field(fields, "objects"),
        gemini_summary: str_field(fields, "geminiSummary").unwrap_or_default(),
        style_category,
        occasion: str_field(fields, "occasion").unwrap_or_default(),
        season,
        suggestions: string_array_field(fields, "suggestions"),
        processed_at: timestamp_field(fields, "processedAt").unwrap_or(DateTime::UNIX_EPOCH),
    })
}
