use std::collections::HashMap;

use crate::models::MediaItem;

/// Cached pages of one list endpoint, stored exactly as fetched.
///
/// `page` is the highest page already appended; `exhausted` flips once the
/// upstream reports no further pages.
#[derive(Debug, Clone, Default)]
pub struct ListEntry {
    pub items: Vec<MediaItem>,
    pub page: u32,
    pub exhausted: bool,
}

#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// Raw detail payload, overwritten wholesale on refetch.
    Detail(serde_json::Value),
    List(ListEntry),
}

/// Process-lifetime cache of catalog responses, keyed by endpoint plus
/// normalized params. No TTL and no eviction: entries are small and the
/// process is a single browsing session, so back-navigation and tab switches
/// stay instant for its whole lifetime.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<String, CacheEntry>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for an endpoint and its params. Params are sorted so that
    /// call-site ordering never splits an entry in two.
    pub fn key(endpoint: &str, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<_> = params.iter().collect();
        sorted.sort_by_key(|(name, _)| *name);
        let mut key = endpoint.to_string();
        for (name, value) in sorted {
            key.push('|');
            key.push_str(name);
            key.push('=');
            key.push_str(value);
        }
        key
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Append one fetched page after the existing items, preserving
    /// discovery order. The cache stores exactly what was fetched;
    /// deduplication belongs to the list-assembly boundary.
    pub fn append_page(&mut self, key: &str, items: Vec<MediaItem>, page: u32, exhausted: bool) {
        let entry = match self.entries.get_mut(key) {
            Some(CacheEntry::List(entry)) => entry,
            _ => {
                self.entries
                    .insert(key.to_string(), CacheEntry::List(ListEntry::default()));
                match self.entries.get_mut(key) {
                    Some(CacheEntry::List(entry)) => entry,
                    _ => unreachable!("just inserted a list entry"),
                }
            }
        };
        entry.items.extend(items);
        entry.page = page;
        entry.exhausted = exhausted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> MediaItem {
        MediaItem {
            id,
            title: Some(format!("Title {}", id)),
            name: None,
            poster_path: None,
            backdrop_path: None,
            overview: None,
            vote_average: 0.0,
            release_date: None,
            first_air_date: None,
            media_type: None,
            genre_ids: Vec::new(),
        }
    }

    #[test]
    fn key_is_stable_under_param_reordering() {
        let a = MetadataCache::key(
            "/discover/movie",
            &[("page", "1".into()), ("with_genres", "28".into())],
        );
        let b = MetadataCache::key(
            "/discover/movie",
            &[("with_genres", "28".into()), ("page", "1".into())],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn append_page_concatenates_in_discovery_order() {
        let mut cache = MetadataCache::new();
        cache.append_page("k", vec![item(1), item(2)], 1, false);
        cache.append_page("k", vec![item(3)], 2, true);

        match cache.get("k") {
            Some(CacheEntry::List(entry)) => {
                let ids: Vec<_> = entry.items.iter().map(|i| i.id).collect();
                assert_eq!(ids, vec![1, 2, 3]);
                assert_eq!(entry.page, 2);
                assert!(entry.exhausted);
            }
            other => panic!("expected a list entry, got {:?}", other),
        }
    }

    #[test]
    fn append_keeps_duplicates_verbatim() {
        // Upstream pagination drifts; the cache must not paper over it.
        let mut cache = MetadataCache::new();
        cache.append_page("k", vec![item(1)], 1, false);
        cache.append_page("k", vec![item(1), item(2)], 2, false);

        match cache.get("k") {
            Some(CacheEntry::List(entry)) => assert_eq!(entry.items.len(), 3),
            other => panic!("expected a list entry, got {:?}", other),
        }
    }

    #[test]
    fn put_overwrites_wholesale() {
        let mut cache = MetadataCache::new();
        cache.put(
            "d".to_string(),
            CacheEntry::Detail(serde_json::json!({"id": 1})),
        );
        cache.put(
            "d".to_string(),
            CacheEntry::Detail(serde_json::json!({"id": 2})),
        );

        match cache.get("d") {
            Some(CacheEntry::Detail(value)) => assert_eq!(value["id"], 2),
            other => panic!("expected a detail entry, got {:?}", other),
        }
    }
}
