mod errors;
mod strategy;

pub use errors::FetchError;
pub use strategy::{AccessStrategy, UrlTransform, strategy_table};

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::NetworkConfig;
use errors::StrategyError;

/// Issues catalog GETs through the ordered access-strategy table, returning
/// the first successful JSON response or a terminal failure.
///
/// Strategies are awaited sequentially, one at a time; racing them would
/// muddy failure attribution and timeout accounting for no practical gain in
/// a best-effort client-side workaround.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    strategies: Vec<AccessStrategy>,
}

impl FetchClient {
    pub fn new(network: &NetworkConfig) -> Self {
        Self::with_strategies(strategy_table(network))
    }

    /// Build a client over an explicit strategy table.
    pub fn with_strategies(strategies: Vec<AccessStrategy>) -> Self {
        // Timeouts are per-strategy, set on each request.
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");
        Self { client, strategies }
    }

    /// Fetch `target` as JSON.
    ///
    /// 404 and 401 abort immediately: the first is logical absence and the
    /// second a credential problem, and no relay can change either. Any other
    /// failure (non-2xx, timeout, transport error, non-JSON body) records the
    /// error and falls through to the next strategy.
    pub async fn fetch_json(&self, target: &Url) -> Result<Value, FetchError> {
        let mut last: Option<StrategyError> = None;

        for strategy in &self.strategies {
            let url = strategy.apply(target);
            debug!(strategy = %strategy.name, "fetching catalog url");

            let response = match self
                .client
                .get(&url)
                .header("accept", "application/json")
                .timeout(strategy.timeout)
                .send()
                .await
            {
                Ok(response) => response,
                Err(error) => {
                    let failure = StrategyError::from_reqwest(&error);
                    debug!(strategy = %strategy.name, "strategy failed: {}", failure);
                    last = Some(failure);
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                debug!(strategy = %strategy.name, "upstream 404, aborting");
                return Err(FetchError::NotFound);
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                warn!(strategy = %strategy.name, "upstream 401, check the API key");
                return Err(FetchError::Unauthorized);
            }
            if !status.is_success() {
                debug!(strategy = %strategy.name, status = status.as_u16(), "non-2xx, trying next");
                last = Some(StrategyError::Http(status.as_u16()));
                continue;
            }

            // Relays occasionally return an HTML error page with a 200, so a
            // body that fails to parse counts as a strategy failure too.
            match response.json::<Value>().await {
                Ok(value) => {
                    debug!(strategy = %strategy.name, "fetch succeeded");
                    return Ok(value);
                }
                Err(error) => {
                    debug!(strategy = %strategy.name, "bad body: {}", error);
                    last = Some(StrategyError::Body(error.to_string()));
                    continue;
                }
            }
        }

        let last = last
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no access strategies configured".to_string());
        warn!("all access strategies failed: {}", last);
        Err(FetchError::AllStrategiesFailed { last })
    }
}
