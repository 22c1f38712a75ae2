use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::StateStore;
use crate::models::{MediaItem, MediaType};

const WATCHLIST: &str = "watchlist";
const LIKES: &str = "likes";
const PREFERENCES: &str = "preferences";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Accent color (hex, no leading '#') applied to the player embed.
    pub accent_color: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            accent_color: "6c5ce7".to_string(),
        }
    }
}

/// User library lists (watchlist, likes) and small preferences, persisted
/// under their own namespaces. Entries are denormalized `MediaItem`
/// snapshots so list rows render without a catalog fetch.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    state: Arc<StateStore>,
}

impl LibraryStore {
    pub fn new(state: Arc<StateStore>) -> Self {
        Self { state }
    }

    // === Watchlist ===

    pub fn watchlist(&self) -> Vec<MediaItem> {
        self.items(WATCHLIST)
    }

    pub fn in_watchlist(&self, media_type: MediaType, media_id: u64) -> bool {
        self.contains(WATCHLIST, media_type, media_id)
    }

    /// Toggle membership; returns whether the item is present afterwards.
    pub fn toggle_watchlist(&self, item: &MediaItem, media_type: MediaType) -> bool {
        self.toggle(WATCHLIST, item, media_type)
    }

    pub fn remove_from_watchlist(&self, media_type: MediaType, media_id: u64) {
        self.remove(WATCHLIST, media_type, media_id);
    }

    // === Likes ===

    pub fn likes(&self) -> Vec<MediaItem> {
        self.items(LIKES)
    }

    pub fn is_liked(&self, media_type: MediaType, media_id: u64) -> bool {
        self.contains(LIKES, media_type, media_id)
    }

    pub fn toggle_like(&self, item: &MediaItem, media_type: MediaType) -> bool {
        self.toggle(LIKES, item, media_type)
    }

    // === Preferences ===

    pub fn accent_color(&self) -> String {
        self.state
            .load::<Preferences>(PREFERENCES)
            .unwrap_or_default()
            .accent_color
    }

    pub fn set_accent_color(&self, accent_color: impl Into<String>) {
        let preferences = Preferences {
            accent_color: accent_color.into(),
        };
        self.state.save(PREFERENCES, &preferences);
    }

    // === Shared list plumbing ===

    fn items(&self, namespace: &str) -> Vec<MediaItem> {
        self.state.load(namespace).unwrap_or_default()
    }

    fn contains(&self, namespace: &str, media_type: MediaType, media_id: u64) -> bool {
        self.items(namespace)
            .iter()
            .any(|item| item.id == media_id && item.media_type_or(media_type) == media_type)
    }

    fn toggle(&self, namespace: &str, item: &MediaItem, media_type: MediaType) -> bool {
        let mut items = self.items(namespace);
        let before = items.len();
        items.retain(|existing| {
            !(existing.id == item.id && existing.media_type_or(media_type) == media_type)
        });

        let added = items.len() == before;
        if added {
            // Snapshot with the media type pinned so routing never guesses.
            let mut snapshot = item.clone();
            snapshot.media_type = Some(media_type);
            items.push(snapshot);
        }
        debug!(namespace, id = item.id, added, "library toggle");
        self.state.save(namespace, &items);
        added
    }

    fn remove(&self, namespace: &str, media_type: MediaType, media_id: u64) {
        let mut items = self.items(namespace);
        items.retain(|existing| {
            !(existing.id == media_id && existing.media_type_or(media_type) == media_type)
        });
        self.state.save(namespace, &items);
    }
}
