use std::fmt;
use thiserror::Error;

/// Typed error enum for catalog fetch operations.
///
/// This enum differentiates terminal failures (retrying through another
/// access strategy cannot help) from exhaustion of the whole strategy table.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Upstream 404. Logical absence, not a transport problem; other
    /// strategies are never attempted.
    #[error("Resource not found upstream")]
    NotFound,

    /// Upstream 401. Credential or configuration problem, not a relay
    /// problem; surfaced to the developer, not user-actionable.
    #[error("Catalog rejected the API key")]
    Unauthorized,

    /// Every access strategy failed. Carries the last observed error for
    /// diagnostics; callers may offer a retry affordance.
    #[error("All access strategies failed (last error: {last})")]
    AllStrategiesFailed { last: String },
}

impl FetchError {
    /// Terminal errors must not be retried, through relays or otherwise.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchError::NotFound | FetchError::Unauthorized)
    }

    /// Check if this error is transient and worth a user-initiated retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::AllStrategiesFailed { .. })
    }
}

/// Per-strategy failure, recorded while falling through the strategy table.
#[derive(Debug, Clone)]
pub(crate) enum StrategyError {
    Timeout,
    Http(u16),
    Transport(String),
    Body(String),
}

impl StrategyError {
    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            StrategyError::Timeout
        } else {
            StrategyError::Transport(error.to_string())
        }
    }
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyError::Timeout => write!(f, "request timed out"),
            StrategyError::Http(status) => write!(f, "HTTP {}", status),
            StrategyError::Transport(message) => write!(f, "transport error: {}", message),
            StrategyError::Body(message) => write!(f, "unusable response body: {}", message),
        }
    }
}
