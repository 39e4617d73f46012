//! In-process store with the same contract as the document store.
//! Used by tests and as the fallback when no credentials are
//! configured, so a local run still works end to end.

use crate::{OutfitStore, StoreError};
use async_trait::async_trait;
use common_types::OutfitRecord;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryOutfitStore {
    // user id -> doc id -> record
    records: Mutex<HashMap<String, BTreeMap<String, OutfitRecord>>>,
}

impl MemoryOutfitStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn record_count(&self, user_id: &str) -> usize {
        self.records
            .lock()
            .expect("store lock poisoned")
            .get(user_id)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl OutfitStore for MemoryOutfitStore {
    async fn photo_exists(&self, user_id: &str, photo_url: &str) -> Result<bool, StoreError> {
        let records = self.records.lock().expect("store lock poisoned");
        Ok(records
            .get(user_id)
            .is_some_and(|outfits| outfits.values().any(|record| record.photo_url == photo_url)))
    }

    async fn store_outfit(
        &self,
        user_id: &str,
        record: &OutfitRecord,
    ) -> Result<String, StoreError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        records
            .entry(user_id.to_string())
            .or_default()
            .insert(record.id.clone(), record.clone());
        Ok(record.id.clone())
    }

    async fn get_user_outfits(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<OutfitRecord>, StoreError> {
        let records = self.records.lock().expect("store lock poisoned");
        let mut outfits: Vec<OutfitRecord> = records
            .get(user_id)
            .map(|outfits| outfits.values().cloned().collect())
            .unwrap_or_default();
        outfits.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        outfits.truncate(limit);
        Ok(outfits)
    }

    async fn delete_outfit(&self, user_id: &str, outfit_id: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        if let Some(outfits) = records.get_mut(user_id) {
            outfits.remove(outfit_id);
        }
        Ok(())
    }
}
