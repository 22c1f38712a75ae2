use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::models::{MediaRef, MediaType};

/// The embedded third-party player, treated as an opaque message-passing
/// boundary. Delivery is best-effort in both directions: the surface may
/// ignore commands it does not understand, and nothing it sends back is
/// trusted.
#[async_trait]
pub trait PlaybackSurface: Send + Sync {
    async fn post(&self, message: Value) -> Result<()>;
}

/// Surface that swallows every command; useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullSurface;

#[async_trait]
impl PlaybackSurface for NullSurface {
    async fn post(&self, _message: Value) -> Result<()> {
        Ok(())
    }
}

/// Build the embed URL for a playable unit.
///
/// The path encodes the media id (and season/episode for TV); accent color
/// and autoplay ride along as query parameters.
pub fn embed_url(
    player_base_url: &str,
    media_ref: &MediaRef,
    accent_color: &str,
    autoplay: bool,
) -> Result<Url> {
    let base = player_base_url.trim_end_matches('/');
    let path = match (media_ref.media_type, media_ref.season, media_ref.episode) {
        (MediaType::Tv, Some(season), Some(episode)) => {
            format!("{}/embed/tv/{}/{}/{}", base, media_ref.media_id, season, episode)
        }
        (MediaType::Tv, _, _) => format!("{}/embed/tv/{}/1/1", base, media_ref.media_id),
        (MediaType::Movie, _, _) => format!("{}/embed/movie/{}", base, media_ref.media_id),
    };

    let mut url = Url::parse(&path).context("Player base URL is not configured or invalid")?;
    url.query_pairs_mut()
        .append_pair("color", accent_color.trim_start_matches('#'))
        .append_pair("autoPlay", if autoplay { "true" } else { "false" });
    Ok(url)
}
