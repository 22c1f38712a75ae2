use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::time::Duration;
use url::Url;

use crate::config::{NetworkConfig, RelayMode};

/// How a strategy rewrites the target URL before the request goes out.
#[derive(Debug, Clone)]
pub enum UrlTransform {
    /// No rewrite; hits the catalog origin directly.
    Direct,
    /// Target appended percent-encoded to the relay prefix.
    WrapQuery { base: String },
    /// Target appended verbatim as a path suffix.
    WrapPath { base: String },
}

/// One entry of the ordered access-strategy table.
#[derive(Debug, Clone)]
pub struct AccessStrategy {
    pub name: String,
    pub timeout: Duration,
    transform: UrlTransform,
}

impl AccessStrategy {
    pub fn direct(timeout: Duration) -> Self {
        Self {
            name: "direct".to_string(),
            timeout,
            transform: UrlTransform::Direct,
        }
    }

    pub fn relay(name: impl Into<String>, base: String, mode: RelayMode, timeout: Duration) -> Self {
        let transform = match mode {
            RelayMode::Query => UrlTransform::WrapQuery { base },
            RelayMode::Path => UrlTransform::WrapPath { base },
        };
        Self {
            name: name.into(),
            timeout,
            transform,
        }
    }

    /// Build the request URL this strategy would issue for `target`.
    pub fn apply(&self, target: &Url) -> String {
        match &self.transform {
            UrlTransform::Direct => target.to_string(),
            UrlTransform::WrapQuery { base } => {
                let encoded = utf8_percent_encode(target.as_str(), NON_ALPHANUMERIC);
                format!("{}{}", base, encoded)
            }
            UrlTransform::WrapPath { base } => format!("{}{}", base, target),
        }
    }
}

/// Ordered strategy table: direct first (fastest when available), then the
/// configured relays in priority order. The order is a fixed tie-break, not a
/// load-balancing concern.
pub fn strategy_table(network: &NetworkConfig) -> Vec<AccessStrategy> {
    let mut strategies =
        vec![AccessStrategy::direct(Duration::from_secs(network.direct_timeout_secs))];
    let relay_timeout = Duration::from_secs(network.relay_timeout_secs);
    for (index, relay) in network.relays.iter().enumerate() {
        strategies.push(AccessStrategy::relay(
            format!("relay-{}", index + 1),
            relay.base.clone(),
            relay.mode,
            relay_timeout,
        ));
    }
    strategies
}
