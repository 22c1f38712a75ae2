// Playback tuning constants - all session thresholds in one place

use std::time::Duration;

// === Skip affordances ===
/// Window during which the manual skip-intro banner may show when no exact
/// intro interval exists for the title.
pub const INTRO_FALLBACK_WINDOW_SECS: f64 = 300.0;

/// Fixed jump applied by skip-intro when no exact interval is active.
pub const HEURISTIC_INTRO_JUMP_SECS: f64 = 85.0;

/// Remaining-runtime window that raises the next-episode affordance when the
/// title has no exact outro interval.
pub const OUTRO_FALLBACK_WINDOW_SECS: f64 = 120.0;

// === Persistence ===
/// Minimum wall-clock gap between continue-watching writes while playing.
/// Bounds write volume to roughly 0.2 Hz regardless of event arrival rate.
pub const PROGRESS_PERSIST_THROTTLE: Duration = Duration::from_secs(5);
