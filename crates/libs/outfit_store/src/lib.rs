#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! Contract for the per-user outfit collection, plus the two
//! implementations: the external document store (Firestore REST) and an
//! in-process memory store with identical semantics.

mod firestore;
mod memory;

pub use firestore::FirestoreOutfitStore;
pub use memory::MemoryOutfitStore;

use async_trait::async_trait;
use common_types::OutfitRecord;
use google_auth::AuthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store handle was never initialized. A startup precondition,
    /// not a per-call retryable condition.
    #[error("outfit store not initialized: {0}")]
    Unavailable(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store error (status {status}): {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("cannot decode stored document: {0}")]
    Decode(String),
}

/// The document collection holding one record per (user, canonical
/// photo URL). Upserts use merge semantics keyed by the record's
/// precomputed id, so re-analysis overwrites instead of duplicating.
#[async_trait]
pub trait OutfitStore: Send + Sync {
    /// Whether a record with this canonical photo URL already exists
    /// for the user.
    async fn photo_exists(&self, user_id: &str, photo_url: &str) -> Result<bool, StoreError>;

    /// Upserts the record under its own id, creating the parent user
    /// entity when absent. Returns the document id.
    async fn store_outfit(&self, user_id: &str, record: &OutfitRecord)
    -> Result<String, StoreError>;

    /// The user's records, newest first by `processedAt`.
    async fn get_user_outfits(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<OutfitRecord>, StoreError>;

    async fn delete_outfit(&self, user_id: &str, outfit_id: &str) -> Result<(), StoreError>;
}
