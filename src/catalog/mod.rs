mod cache;

pub use cache::{CacheEntry, ListEntry, MetadataCache};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::fetch::FetchClient;
use crate::models::{
    CollectionDetails, MediaDetails, MediaItem, MediaType, PagedResults, PersonDetails,
    SeasonDetails,
};

/// Assembled view over every cached page of one list endpoint.
#[derive(Debug, Clone)]
pub struct ListPage {
    pub items: Vec<MediaItem>,
    pub page: u32,
    pub exhausted: bool,
}

/// Read-through client for the metadata catalog.
///
/// Every endpoint goes cache-first; misses hit the fetch layer and fill the
/// cache so back-navigation and tab switches render instantly.
pub struct CatalogService {
    fetch: FetchClient,
    cache: RwLock<MetadataCache>,
    base_url: String,
    api_key: String,
    language: String,
}

impl CatalogService {
    pub fn new(config: &Config) -> Self {
        Self {
            fetch: FetchClient::new(&config.network),
            cache: RwLock::new(MetadataCache::new()),
            base_url: config.catalog.base_url.trim_end_matches('/').to_string(),
            api_key: config.catalog.api_key.clone(),
            language: config.catalog.language.clone(),
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .context("Invalid catalog endpoint URL")?;
        {
            let mut query = url.query_pairs_mut();
            if !self.api_key.is_empty() {
                query.append_pair("api_key", &self.api_key);
            }
            query.append_pair("language", &self.language);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    async fn fetch_value(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint(path, params)?;
        let value = self.fetch.fetch_json(&url).await?;
        Ok(value)
    }

    // === List endpoints ===

    pub async fn trending(&self, page: u32) -> Result<ListPage> {
        self.list_page("/trending/all/week", &[], MediaType::Movie, page)
            .await
    }

    pub async fn popular(&self, media_type: MediaType, page: u32) -> Result<ListPage> {
        let path = format!("/{}/popular", media_type);
        self.list_page(&path, &[], media_type, page).await
    }

    pub async fn top_rated(&self, media_type: MediaType, page: u32) -> Result<ListPage> {
        let path = format!("/{}/top_rated", media_type);
        self.list_page(&path, &[], media_type, page).await
    }

    pub async fn discover(
        &self,
        media_type: MediaType,
        genre: Option<u32>,
        page: u32,
    ) -> Result<ListPage> {
        let path = format!("/discover/{}", media_type);
        let mut params = vec![("sort_by", "popularity.desc".to_string())];
        if let Some(genre) = genre {
            params.push(("with_genres", genre.to_string()));
        }
        self.list_page(&path, &params, media_type, page).await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<ListPage> {
        let params = vec![("query", query.to_string()), ("include_adult", "false".to_string())];
        self.list_page("/search/multi", &params, MediaType::Movie, page)
            .await
    }

    /// Serve the assembled list up to `page`, fetching at most the one
    /// missing page. Items are deduplicated by identity (id + media type)
    /// here, at the assembly boundary; the cache keeps what was fetched.
    async fn list_page(
        &self,
        path: &str,
        params: &[(&str, String)],
        fallback_type: MediaType,
        page: u32,
    ) -> Result<ListPage> {
        let key = MetadataCache::key(path, params);

        {
            let cache = self.cache.read().await;
            if let Some(CacheEntry::List(entry)) = cache.get(&key) {
                if entry.page >= page || entry.exhausted {
                    debug!(endpoint = path, page, "list cache hit");
                    return Ok(assemble(entry, fallback_type));
                }
            }
        }

        let mut request = params.to_vec();
        request.push(("page", page.to_string()));
        let value = self.fetch_value(path, &request).await?;
        let parsed: PagedResults<Value> =
            serde_json::from_value(value).context("Failed to decode list response")?;

        // Entries that do not decode as titles (e.g. person results in a
        // multi search) are dropped here.
        let items: Vec<MediaItem> = parsed
            .results
            .into_iter()
            .filter_map(|raw| serde_json::from_value(raw).ok())
            .collect();
        let exhausted = parsed.total_pages > 0 && page >= parsed.total_pages;

        let mut cache = self.cache.write().await;
        cache.append_page(&key, items, page, exhausted);
        match cache.get(&key) {
            Some(CacheEntry::List(entry)) => Ok(assemble(entry, fallback_type)),
            _ => unreachable!("list entry was just appended"),
        }
    }

    // === Detail endpoints ===

    pub async fn details(&self, media_type: MediaType, media_id: u64) -> Result<MediaDetails> {
        match media_type {
            MediaType::Movie => self.movie_details(media_id).await,
            MediaType::Tv => self.tv_details(media_id).await,
        }
    }

    pub async fn movie_details(&self, media_id: u64) -> Result<MediaDetails> {
        let path = format!("/movie/{}", media_id);
        self.detail(
            &path,
            &[("append_to_response", "videos,credits,images,similar".to_string())],
        )
        .await
    }

    pub async fn tv_details(&self, media_id: u64) -> Result<MediaDetails> {
        let path = format!("/tv/{}", media_id);
        self.detail(
            &path,
            &[("append_to_response", "videos,credits,images,similar".to_string())],
        )
        .await
    }

    pub async fn season_details(&self, media_id: u64, season: u32) -> Result<SeasonDetails> {
        let path = format!("/tv/{}/season/{}", media_id, season);
        self.detail(&path, &[]).await
    }

    pub async fn person(&self, person_id: u64) -> Result<PersonDetails> {
        let path = format!("/person/{}", person_id);
        self.detail(&path, &[]).await
    }

    pub async fn collection(&self, collection_id: u64) -> Result<CollectionDetails> {
        let path = format!("/collection/{}", collection_id);
        self.detail(&path, &[]).await
    }

    /// Cache-first detail fetch; the raw payload is cached and overwritten
    /// wholesale on refetch, never merged field by field.
    async fn detail<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let key = MetadataCache::key(path, params);

        {
            let cache = self.cache.read().await;
            if let Some(CacheEntry::Detail(value)) = cache.get(&key) {
                debug!(endpoint = path, "detail cache hit");
                return serde_json::from_value(value.clone())
                    .context("Failed to decode cached detail payload");
            }
        }

        let value = self.fetch_value(path, params).await?;
        let decoded: T = serde_json::from_value(value.clone())
            .context("Failed to decode detail response")?;

        let mut cache = self.cache.write().await;
        cache.put(key, CacheEntry::Detail(value));
        Ok(decoded)
    }
}

/// Deduplicate by item identity while preserving discovery order.
fn assemble(entry: &ListEntry, fallback_type: MediaType) -> ListPage {
    let mut seen = std::collections::HashSet::new();
    let mut items = Vec::with_capacity(entry.items.len());
    for item in &entry.items {
        if seen.insert((item.id, item.media_type_or(fallback_type))) {
            items.push(item.clone());
        }
    }
    ListPage {
        items,
        page: entry.page,
        exhausted: entry.exhausted,
    }
}
