use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Timeout for the direct strategy. Kept short: when direct access is
    /// blocked it should fail fast so the relays get their turn.
    #[serde(default = "default_direct_timeout")]
    pub direct_timeout_secs: u64,

    /// Timeout for each relay strategy.
    #[serde(default = "default_relay_timeout")]
    pub relay_timeout_secs: u64,

    /// Ordered relay list, most reliable first. Iterated top-down after the
    /// direct strategy; never load-balanced.
    #[serde(default = "default_relays")]
    pub relays: Vec<RelayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Prefix the target URL is appended to.
    pub base: String,

    #[serde(default)]
    pub mode: RelayMode,
}

/// How a relay expects the target URL to be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Appended percent-encoded, e.g. `https://relay/?url=<encoded target>`.
    #[default]
    Query,
    /// Appended verbatim as a path suffix, e.g. `https://relay/<target>`.
    Path,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Base URL of the third-party player embed. Empty until configured.
    #[serde(default)]
    pub player_base_url: String,

    #[serde(default = "default_true")]
    pub autoplay: bool,

    #[serde(default = "default_true")]
    pub skip_intro: bool,

    /// Default accent color (hex, no leading '#') passed to the embed.
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("marquee").join("config.toml"))
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base(),
            api_key: String::new(),
            language: default_language(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            direct_timeout_secs: default_direct_timeout(),
            relay_timeout_secs: default_relay_timeout(),
            relays: default_relays(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player_base_url: String::new(),
            autoplay: default_true(),
            skip_intro: default_true(),
            accent_color: default_accent_color(),
        }
    }
}

// Default value functions
fn default_catalog_base() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_direct_timeout() -> u64 {
    4
}
fn default_relay_timeout() -> u64 {
    10
}
fn default_relays() -> Vec<RelayConfig> {
    vec![
        RelayConfig {
            base: "https://api.allorigins.win/raw?url=".to_string(),
            mode: RelayMode::Query,
        },
        RelayConfig {
            base: "https://corsproxy.io/?url=".to_string(),
            mode: RelayMode::Query,
        },
        RelayConfig {
            base: "https://proxy.cors.sh/".to_string(),
            mode: RelayMode::Path,
        },
    ]
}
fn default_true() -> bool {
    true
}
fn default_accent_color() -> String {
    "6c5ce7".to_string()
}
