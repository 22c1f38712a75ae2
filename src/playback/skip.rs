use std::collections::HashMap;
use tracing::debug;

use crate::models::{MediaRef, MediaType, SkipInterval, SkipKind};

/// Resolves skip intervals (intro/outro windows) for a playable unit.
///
/// Exact data is best-effort: explicit entries can be loaded per title or
/// per episode (e.g. synced from a community marker source); everything else
/// falls back to a deterministic per-title simulation, and some titles
/// deliberately resolve to nothing so the session controller's heuristic
/// affordances stay reachable.
///
/// Resolution is a pure lookup with no side effects; calling it repeatedly
/// for the same ref always yields the same list.
#[derive(Debug, Default)]
pub struct SkipIntervalResolver {
    explicit: HashMap<String, Vec<SkipInterval>>,
}

impl SkipIntervalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register exact intervals for a title or a specific episode.
    pub fn insert(&mut self, media_ref: &MediaRef, intervals: Vec<SkipInterval>) {
        self.explicit.insert(exact_key(media_ref), intervals);
    }

    /// Intervals for `media_ref`, authoritative and in list order. The
    /// caller treats overlaps as first-match-wins.
    pub fn resolve(&self, media_ref: &MediaRef) -> Vec<SkipInterval> {
        if let Some(intervals) = self.explicit.get(&exact_key(media_ref)) {
            debug!(media = %media_ref, count = intervals.len(), "exact skip data (episode)");
            return intervals.clone();
        }
        if let Some(intervals) = self.explicit.get(&series_key(media_ref)) {
            debug!(media = %media_ref, count = intervals.len(), "exact skip data (title)");
            return intervals.clone();
        }
        simulated(media_ref)
    }
}

fn exact_key(media_ref: &MediaRef) -> String {
    match (media_ref.season, media_ref.episode) {
        (Some(season), Some(episode)) => format!(
            "{}:{}:{}:{}",
            media_ref.media_type, media_ref.media_id, season, episode
        ),
        _ => series_key(media_ref),
    }
}

fn series_key(media_ref: &MediaRef) -> String {
    format!("{}:{}", media_ref.media_type, media_ref.media_id)
}

/// Deterministic per-title simulation of intro windows.
///
/// Roughly a third of titles get no data at all; movies rarely carry one.
/// Outros only ever come from explicit entries, since placing one requires
/// knowing the runtime.
fn simulated(media_ref: &MediaRef) -> Vec<SkipInterval> {
    let season = u64::from(media_ref.season.unwrap_or(0));
    let episode = u64::from(media_ref.episode.unwrap_or(0));
    let seed = media_ref
        .media_id
        .wrapping_mul(2654435761)
        .wrapping_add(season << 17)
        .wrapping_add(episode << 9);

    let barren = match media_ref.media_type {
        MediaType::Tv => seed % 3 == 0,
        MediaType::Movie => seed % 4 != 0,
    };
    if barren {
        return Vec::new();
    }

    let start = 20.0 + (seed % 61) as f64;
    let length = 80.0 + (seed % 31) as f64;
    vec![SkipInterval::new(SkipKind::Intro, start, start + length)]
}
