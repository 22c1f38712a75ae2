use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies a playable unit: a movie, a series, or one episode of a series.
///
/// Equality is structural on all four fields; absent season/episode means the
/// reference is movie-level (or series-level for `Tv`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub media_type: MediaType,
    pub media_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl MediaRef {
    pub fn movie(media_id: u64) -> Self {
        Self {
            media_type: MediaType::Movie,
            media_id,
            season: None,
            episode: None,
        }
    }

    pub fn tv(media_id: u64) -> Self {
        Self {
            media_type: MediaType::Tv,
            media_id,
            season: None,
            episode: None,
        }
    }

    pub fn tv_episode(media_id: u64, season: u32, episode: u32) -> Self {
        Self {
            media_type: MediaType::Tv,
            media_id,
            season: Some(season),
            episode: Some(episode),
        }
    }

    /// Series identity: two refs with the same key describe the same title,
    /// regardless of which episode they point at.
    pub fn series_key(&self) -> (MediaType, u64) {
        (self.media_type, self.media_id)
    }

    pub fn with_episode(&self, season: u32, episode: u32) -> Self {
        Self {
            season: Some(season),
            episode: Some(episode),
            ..*self
        }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.season, self.episode) {
            (Some(s), Some(e)) => write!(f, "{}:{} s{}e{}", self.media_type, self.media_id, s, e),
            _ => write!(f, "{}:{}", self.media_type, self.media_id),
        }
    }
}

/// One entry of a catalog list response (trending, discover, search, ...).
///
/// Field names follow the upstream catalog wire format; movies carry `title`
/// and `release_date`, series carry `name` and `first_air_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl MediaItem {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    pub fn display_date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
    }

    /// Media type as reported by the catalog, or `fallback` for endpoints
    /// that omit it (type-scoped lists like `/movie/popular`).
    pub fn media_type_or(&self, fallback: MediaType) -> MediaType {
        self.media_type.unwrap_or(fallback)
    }
}

/// A page of catalog list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResults<T> {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub official: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub backdrops: Vec<ImageRef>,
    #[serde(default)]
    pub posters: Vec<ImageRef>,
}

/// Season listing as it appears inside a series detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Detail payload for a movie or series, with the nested sub-resources the
/// catalog appends on detail fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDetails {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
    #[serde(default)]
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub similar: Option<PagedResults<MediaItem>>,
}

impl MediaDetails {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    pub fn display_date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
    }

    /// Episode count of a season, if the season is known.
    pub fn episode_count_of(&self, season_number: u32) -> Option<u32> {
        self.seasons
            .iter()
            .find(|s| s.season_number == season_number)
            .map(|s| s.episode_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode_number: u32,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub season_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub parts: Vec<MediaItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipKind {
    Intro,
    Outro,
}

/// A named time window within a title's runtime eligible for a one-tap skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipInterval {
    pub kind: SkipKind,
    pub start: f64,
    pub end: f64,
}

impl SkipInterval {
    pub fn new(kind: SkipKind, start: f64, end: f64) -> Self {
        debug_assert!(start < end, "skip interval must have start < end");
        Self { kind, start, end }
    }

    /// Half-open containment: `start <= t < end`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// Durable continue-watching record for one title.
///
/// Display metadata is denormalized so list surfaces render without a detail
/// fetch. `progress_percent` is always recomputed from the two time fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchProgressRecord {
    #[serde(flatten)]
    pub media_ref: MediaRef,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub release_date: Option<String>,
    pub progress_percent: f32,
    pub watched_seconds: f64,
    pub total_seconds: f64,
    pub last_watched_at: i64,
}

impl WatchProgressRecord {
    /// Zero-progress record registered at session start so continue-watching
    /// surfaces reflect the session before the first position event arrives.
    pub fn seeded(media_ref: MediaRef, title: impl Into<String>, now: i64) -> Self {
        Self {
            media_ref,
            title: title.into(),
            poster_path: None,
            vote_average: 0.0,
            release_date: None,
            progress_percent: 0.0,
            watched_seconds: 0.0,
            total_seconds: 0.0,
            last_watched_at: now,
        }
    }

    /// Percent complete, recomputed; zero whenever the duration is unknown.
    pub fn percent(watched_seconds: f64, total_seconds: f64) -> f32 {
        if total_seconds > 0.0 {
            (100.0 * watched_seconds / total_seconds) as f32
        } else {
            0.0
        }
    }

    /// Apply a new playback position, clamping and recomputing the percent.
    pub fn update_position(&mut self, watched_seconds: f64, total_seconds: f64, now: i64) {
        let total = total_seconds.max(0.0);
        let watched = if total > 0.0 {
            watched_seconds.clamp(0.0, total)
        } else {
            watched_seconds.max(0.0)
        };
        self.watched_seconds = watched;
        self.total_seconds = total;
        self.progress_percent = Self::percent(watched, total);
        self.last_watched_at = now;
    }
}
