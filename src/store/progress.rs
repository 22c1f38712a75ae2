use std::sync::Arc;
use tracing::debug;

use super::StateStore;
use crate::models::{MediaType, WatchProgressRecord};

const NAMESPACE: &str = "continue-watching";

/// Durable per-title watch progress, read by continue-watching surfaces.
///
/// One record per series identity (media id + media type): for TV, switching
/// episodes retires the prior episode's row rather than accumulating one row
/// per episode ever watched. Records are never deleted automatically; only
/// an explicit user dismiss removes one.
#[derive(Debug, Clone)]
pub struct WatchProgressStore {
    state: Arc<StateStore>,
}

impl WatchProgressStore {
    pub fn new(state: Arc<StateStore>) -> Self {
        Self { state }
    }

    /// Insert or replace the record for the given series identity.
    pub fn upsert(&self, record: WatchProgressRecord) {
        let mut records = self.records();
        records.retain(|existing| existing.media_ref.series_key() != record.media_ref.series_key());
        debug!(media = %record.media_ref, percent = record.progress_percent, "progress upsert");
        records.push(record);
        self.state.save(NAMESPACE, &records);
    }

    /// Explicit removal (user dismiss from the continue-watching row).
    pub fn remove(&self, media_type: MediaType, media_id: u64) {
        let mut records = self.records();
        records.retain(|existing| existing.media_ref.series_key() != (media_type, media_id));
        self.state.save(NAMESPACE, &records);
    }

    pub fn get(&self, media_type: MediaType, media_id: u64) -> Option<WatchProgressRecord> {
        self.records()
            .into_iter()
            .find(|record| record.media_ref.series_key() == (media_type, media_id))
    }

    /// All records, most recently watched first.
    pub fn list(&self) -> Vec<WatchProgressRecord> {
        let mut records = self.records();
        records.sort_by_key(|record| std::cmp::Reverse(record.last_watched_at));
        records
    }

    fn records(&self) -> Vec<WatchProgressRecord> {
        self.state.load(NAMESPACE).unwrap_or_default()
    }
}
