use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::messages::{SurfaceEvent, seek_commands};
use super::skip::SkipIntervalResolver;
use super::surface::PlaybackSurface;
use crate::catalog::CatalogService;
use crate::constants::{
    HEURISTIC_INTRO_JUMP_SECS, INTRO_FALLBACK_WINDOW_SECS, OUTRO_FALLBACK_WINDOW_SECS,
    PROGRESS_PERSIST_THROTTLE,
};
use crate::models::{
    MediaDetails, MediaRef, MediaType, SeasonSummary, SkipInterval, SkipKind, WatchProgressRecord,
};
use crate::routing::Route;
use crate::store::WatchProgressStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Active,
    /// In-player episode change in flight; folds back into `Active`.
    Navigating,
    /// Unmounted. No further writes of any kind.
    Terminated,
}

/// Edge-triggered notifications for the watch view. Affordance events fire
/// only when the underlying boolean flips, never on every position tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The interval the current position falls into changed (drives the
    /// skip-intro button and the implicit outro affordance).
    ActiveIntervalChanged(Option<SkipInterval>),
    /// Manual skip-intro banner for titles with no exact intro data.
    IntroFallbackChanged(bool),
    /// Next-episode affordance (TV only).
    NextEpisodeChanged(bool),
    /// The shell should move to this route (canonical episode URL on
    /// in-player navigation, detail page after the last episode, ...).
    Navigate(Route),
}

#[derive(Debug, Clone, Default)]
struct DisplaySnapshot {
    title: String,
    poster_path: Option<String>,
    vote_average: f32,
    release_date: Option<String>,
}

/// Owns the lifecycle of one watch session: position/duration events from
/// the playback surface, skip-interval classification, episode-boundary
/// navigation, and throttled continue-watching persistence.
///
/// All mutable session state lives in plain fields mutated synchronously
/// within each handler invocation, never across an await, so reentrant
/// message delivery cannot observe a half-applied update.
pub struct PlaybackSession {
    id: Uuid,
    state: SessionState,
    media_ref: MediaRef,
    current_time: f64,
    duration: f64,
    intervals: Vec<SkipInterval>,
    active_interval: Option<usize>,
    intro_fallback_active: bool,
    next_episode_active: bool,
    last_persist: Option<tokio::time::Instant>,
    display: DisplaySnapshot,
    episode_index: Vec<SeasonSummary>,
    surface: Arc<dyn PlaybackSurface>,
    progress: WatchProgressStore,
    skip: Arc<SkipIntervalResolver>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl PlaybackSession {
    pub fn new(
        media_ref: MediaRef,
        surface: Arc<dyn PlaybackSurface>,
        progress: WatchProgressStore,
        skip: Arc<SkipIntervalResolver>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = Self {
            id: Uuid::new_v4(),
            state: SessionState::Initializing,
            media_ref,
            current_time: 0.0,
            duration: 0.0,
            intervals: Vec::new(),
            active_interval: None,
            intro_fallback_active: false,
            next_episode_active: false,
            last_persist: None,
            display: DisplaySnapshot::default(),
            episode_index: Vec::new(),
            surface,
            progress,
            skip,
            events,
        };
        (session, receiver)
    }

    /// Enter `Active`: resolve display metadata (best-effort), resolve skip
    /// intervals, and seed a zero-progress record so continue-watching
    /// surfaces reflect the session immediately.
    pub async fn start(&mut self, catalog: Option<&CatalogService>) {
        if self.state != SessionState::Initializing {
            return;
        }

        if let Some(catalog) = catalog {
            match catalog
                .details(self.media_ref.media_type, self.media_ref.media_id)
                .await
            {
                Ok(details) => self.apply_details(&details),
                // Metadata failures degrade the UI; they never block playback.
                Err(error) => warn!(session = %self.id, "metadata unavailable: {:#}", error),
            }
        }

        self.intervals = self.skip.resolve(&self.media_ref);
        self.seed_progress();
        self.state = SessionState::Active;
        info!(session = %self.id, media = %self.media_ref, "playback session active");
    }

    /// Apply a detail payload: display metadata for continue-watching rows
    /// and the season/episode index used by next-episode navigation.
    pub fn apply_details(&mut self, details: &MediaDetails) {
        self.display = DisplaySnapshot {
            title: details.display_title().to_string(),
            poster_path: details.poster_path.clone(),
            vote_average: details.vote_average,
            release_date: details.display_date().map(str::to_string),
        };
        self.episode_index = details.seasons.clone();
    }

    /// Process one inbound surface message, in arrival order.
    ///
    /// The surface is fully untrusted: anything unparsable is ignored
    /// silently, and nothing in here can fail outward.
    pub fn handle_message(&mut self, raw: &Value) {
        if !matches!(self.state, SessionState::Active | SessionState::Navigating) {
            return;
        }
        let Some(event) = SurfaceEvent::parse(raw) else {
            return;
        };

        if self.media_ref.media_type == MediaType::Tv {
            if let (Some(season), Some(episode)) = (event.season, event.episode) {
                if Some(season) != self.media_ref.season || Some(episode) != self.media_ref.episode
                {
                    self.navigate_to_episode(season, episode);
                }
            }
        }

        if let (Some(time), Some(duration)) = (event.current_time, event.duration) {
            if duration > 0.0 {
                self.current_time = time;
                self.duration = duration;
                self.classify();
                self.maybe_persist();
            }
        }
    }

    /// Fold an episode change into the running session: new current ref,
    /// re-resolved skip intervals, a re-seeded continue-watching entry, and
    /// a canonical-route event. The playback surface is not reloaded.
    fn navigate_to_episode(&mut self, season: u32, episode: u32) {
        self.state = SessionState::Navigating;
        self.media_ref = self.media_ref.with_episode(season, episode);
        info!(session = %self.id, media = %self.media_ref, "episode change");

        self.current_time = 0.0;
        self.duration = 0.0;
        self.last_persist = None;
        self.intervals = self.skip.resolve(&self.media_ref);

        if self.active_interval.take().is_some() {
            self.emit(SessionEvent::ActiveIntervalChanged(None));
        }
        if std::mem::take(&mut self.intro_fallback_active) {
            self.emit(SessionEvent::IntroFallbackChanged(false));
        }
        if std::mem::take(&mut self.next_episode_active) {
            self.emit(SessionEvent::NextEpisodeChanged(false));
        }

        self.seed_progress();
        self.emit(SessionEvent::Navigate(Route::Watch(self.media_ref)));
        self.state = SessionState::Active;
    }

    /// Classify the current instant against the interval list and update
    /// the three affordances, emitting only on flips.
    fn classify(&mut self) {
        // First interval containing the position wins; the list is treated
        // as authoritative and non-overlapping.
        let hit = self
            .intervals
            .iter()
            .position(|interval| interval.contains(self.current_time));
        if hit != self.active_interval {
            self.active_interval = hit;
            let interval = hit.map(|index| self.intervals[index].clone());
            debug!(session = %self.id, ?interval, "active interval changed");
            self.emit(SessionEvent::ActiveIntervalChanged(interval));
        }

        // Manual skip banner only when the title has no exact intro at all,
        // and never while an exact interval is active.
        let has_exact_intro = self
            .intervals
            .iter()
            .any(|interval| interval.kind == SkipKind::Intro);
        let fallback = hit.is_none()
            && !has_exact_intro
            && self.current_time < INTRO_FALLBACK_WINDOW_SECS;
        if fallback != self.intro_fallback_active {
            self.intro_fallback_active = fallback;
            self.emit(SessionEvent::IntroFallbackChanged(fallback));
        }

        let next = self.media_ref.media_type == MediaType::Tv && {
            let outro_active = hit
                .map(|index| self.intervals[index].kind == SkipKind::Outro)
                .unwrap_or(false);
            let has_exact_outro = self
                .intervals
                .iter()
                .any(|interval| interval.kind == SkipKind::Outro);
            outro_active
                || (!has_exact_outro
                    && self.duration - self.current_time < OUTRO_FALLBACK_WINDOW_SECS)
        };
        if next != self.next_episode_active {
            self.next_episode_active = next;
            self.emit(SessionEvent::NextEpisodeChanged(next));
        }
    }

    /// Write through to the progress store at most once per throttle window.
    fn maybe_persist(&mut self) {
        let now = tokio::time::Instant::now();
        if let Some(last) = self.last_persist {
            if now.duration_since(last) < PROGRESS_PERSIST_THROTTLE {
                return;
            }
        }
        self.last_persist = Some(now);
        self.progress.upsert(self.progress_record());
    }

    fn seed_progress(&mut self) {
        self.progress.upsert(self.progress_record());
    }

    fn progress_record(&self) -> WatchProgressRecord {
        let now = chrono::Utc::now().timestamp();
        let mut record = WatchProgressRecord::seeded(self.media_ref, self.display.title.clone(), now);
        record.poster_path = self.display.poster_path.clone();
        record.vote_average = self.display.vote_average;
        record.release_date = self.display.release_date.clone();
        record.update_position(self.current_time, self.duration, now);
        record
    }

    /// Best-effort seek by `delta` seconds. Commands go out in both shapes
    /// the embedded players accept, and the local clock advances
    /// optimistically so affordances update without waiting for the next
    /// inbound event. Returns the applied delta.
    pub async fn seek(&mut self, delta: f64) -> f64 {
        if self.state == SessionState::Terminated {
            return 0.0;
        }

        let target = if self.duration > 0.0 {
            (self.current_time + delta).clamp(0.0, self.duration)
        } else {
            (self.current_time + delta).max(0.0)
        };
        let applied = target - self.current_time;

        for command in seek_commands(target) {
            if let Err(error) = self.surface.post(command).await {
                debug!(session = %self.id, "seek command not delivered: {:#}", error);
            }
        }

        self.current_time = target;
        self.classify();
        applied
    }

    /// Skip the intro: land exactly on the end of the active interval, or
    /// take the fixed heuristic jump when no exact interval is active.
    pub async fn handle_skip_intro(&mut self) -> f64 {
        let delta = match self.active_interval {
            Some(index) => self.intervals[index].end - self.current_time,
            None => HEURISTIC_INTRO_JUMP_SECS,
        };
        self.seek(delta).await
    }

    /// Advance to the next episode: within the season first, then into the
    /// following season. Past the final episode this navigates to the
    /// title's detail page; it never wraps back to season one.
    pub fn handle_next_episode(&mut self) -> Route {
        let detail = Route::detail(self.media_ref.media_type, self.media_ref.media_id);
        if self.state == SessionState::Terminated {
            return detail;
        }
        if self.media_ref.media_type != MediaType::Tv {
            self.emit(SessionEvent::Navigate(detail));
            return detail;
        }

        let season = self.media_ref.season.unwrap_or(1);
        let episode = self.media_ref.episode.unwrap_or(1);
        let episodes_in_season = self
            .episode_index
            .iter()
            .find(|candidate| candidate.season_number == season)
            .map(|candidate| candidate.episode_count);

        match episodes_in_season {
            Some(count) if episode < count => {
                self.navigate_to_episode(season, episode + 1);
                Route::Watch(self.media_ref)
            }
            Some(_) => {
                let next_season = self
                    .episode_index
                    .iter()
                    .filter(|candidate| {
                        candidate.season_number > season && candidate.episode_count > 0
                    })
                    .map(|candidate| candidate.season_number)
                    .min();
                match next_season {
                    Some(next_season) => {
                        self.navigate_to_episode(next_season, 1);
                        Route::Watch(self.media_ref)
                    }
                    None => {
                        info!(session = %self.id, "no further episodes, leaving for detail page");
                        self.emit(SessionEvent::Navigate(detail));
                        detail
                    }
                }
            }
            // Season/episode metadata never arrived; degrade to the detail
            // page rather than guessing an episode that may not exist.
            None => {
                self.emit(SessionEvent::Navigate(detail));
                detail
            }
        }
    }

    /// Unmount. Detaches nothing but the session itself: the last throttled
    /// write stands, and no further writes occur.
    pub fn terminate(&mut self) {
        if self.state != SessionState::Terminated {
            info!(session = %self.id, media = %self.media_ref, "playback session terminated");
            self.state = SessionState::Terminated;
        }
    }

    fn emit(&self, event: SessionEvent) {
        // A dropped receiver just means nobody is rendering affordances.
        let _ = self.events.send(event);
    }

    // === Read-only accessors for the watch view ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn media_ref(&self) -> MediaRef {
        self.media_ref
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn active_interval(&self) -> Option<&SkipInterval> {
        self.active_interval.map(|index| &self.intervals[index])
    }

    pub fn intro_fallback_active(&self) -> bool {
        self.intro_fallback_active
    }

    pub fn next_episode_active(&self) -> bool {
        self.next_episode_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeasonSummary;
    use crate::playback::surface::NullSurface;
    use crate::store::StateStore;
    use serde_json::json;
    use std::sync::Mutex;

    /// Surface that records every posted command.
    #[derive(Debug, Default)]
    struct RecordingSurface {
        posts: Mutex<Vec<Value>>,
    }

    #[async_trait::async_trait]
    impl PlaybackSurface for RecordingSurface {
        async fn post(&self, message: Value) -> anyhow::Result<()> {
            self.posts.lock().unwrap().push(message);
            Ok(())
        }
    }

    struct Harness {
        session: PlaybackSession,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        progress: WatchProgressStore,
        surface: Arc<RecordingSurface>,
    }

    fn harness(media_ref: MediaRef, resolver: SkipIntervalResolver) -> Harness {
        let surface = Arc::new(RecordingSurface::default());
        let progress = WatchProgressStore::new(Arc::new(StateStore::in_memory()));
        let (session, events) = PlaybackSession::new(
            media_ref,
            surface.clone(),
            progress.clone(),
            Arc::new(resolver),
        );
        Harness {
            session,
            events,
            progress,
            surface,
        }
    }

    fn resolver_with(media_ref: &MediaRef, intervals: Vec<SkipInterval>) -> SkipIntervalResolver {
        let mut resolver = SkipIntervalResolver::new();
        resolver.insert(media_ref, intervals);
        resolver
    }

    fn tick(session: &mut PlaybackSession, time: f64, duration: f64) {
        session.handle_message(&json!({ "currentTime": time, "duration": duration }));
    }

    fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    fn details_with_seasons(seasons: &[(u32, u32)]) -> MediaDetails {
        MediaDetails {
            id: 1399,
            title: None,
            name: Some("Series".to_string()),
            overview: None,
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            vote_average: 8.4,
            release_date: None,
            first_air_date: Some("2011-04-17".to_string()),
            runtime: None,
            number_of_seasons: Some(seasons.len() as u32),
            genres: Vec::new(),
            seasons: seasons
                .iter()
                .map(|(season_number, episode_count)| SeasonSummary {
                    season_number: *season_number,
                    episode_count: *episode_count,
                    name: None,
                    poster_path: None,
                })
                .collect(),
            videos: None,
            credits: None,
            images: None,
            similar: None,
        }
    }

    #[tokio::test]
    async fn start_seeds_a_zero_progress_record() {
        let media_ref = MediaRef::movie(550);
        let mut harness = harness(media_ref, SkipIntervalResolver::new());
        harness.session.start(None).await;

        assert_eq!(harness.session.state(), SessionState::Active);
        let records = harness.progress.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].progress_percent, 0.0);
    }

    #[tokio::test]
    async fn exact_intro_drives_affordance_and_suppresses_fallback() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let resolver = resolver_with(
            &media_ref,
            vec![SkipInterval::new(SkipKind::Intro, 0.0, 90.0)],
        );
        let mut harness = harness(media_ref, resolver);
        harness.session.start(None).await;

        tick(&mut harness.session, 0.0, 3600.0);
        assert!(harness.session.active_interval().is_some());
        assert!(!harness.session.intro_fallback_active());

        tick(&mut harness.session, 30.0, 3600.0);
        assert!(harness.session.active_interval().is_some());

        tick(&mut harness.session, 91.0, 3600.0);
        assert!(harness.session.active_interval().is_none());

        // An exact intro exists, so the manual fallback never shows.
        tick(&mut harness.session, 300.0, 3600.0);
        assert!(!harness.session.intro_fallback_active());
    }

    #[tokio::test]
    async fn fallback_banner_when_no_exact_intro_exists() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let resolver = resolver_with(&media_ref, Vec::new());
        let mut harness = harness(media_ref, resolver);
        harness.session.start(None).await;

        tick(&mut harness.session, 0.0, 3600.0);
        assert!(harness.session.intro_fallback_active());
        tick(&mut harness.session, 100.0, 3600.0);
        assert!(harness.session.intro_fallback_active());
        tick(&mut harness.session, 301.0, 3600.0);
        assert!(!harness.session.intro_fallback_active());
    }

    #[tokio::test]
    async fn affordance_events_are_edge_triggered() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let resolver = resolver_with(&media_ref, Vec::new());
        let mut harness = harness(media_ref, resolver);
        harness.session.start(None).await;
        drain(&mut harness.events);

        tick(&mut harness.session, 0.0, 3600.0);
        tick(&mut harness.session, 10.0, 3600.0);
        tick(&mut harness.session, 20.0, 3600.0);

        let flips: Vec<_> = drain(&mut harness.events)
            .into_iter()
            .filter(|event| matches!(event, SessionEvent::IntroFallbackChanged(_)))
            .collect();
        assert_eq!(flips, vec![SessionEvent::IntroFallbackChanged(true)]);
    }

    #[tokio::test]
    async fn skip_intro_lands_exactly_on_interval_end() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let resolver = resolver_with(
            &media_ref,
            vec![SkipInterval::new(SkipKind::Intro, 40.0, 120.0)],
        );
        let mut harness = harness(media_ref, resolver);
        harness.session.start(None).await;

        tick(&mut harness.session, 60.0, 600.0);
        let applied = harness.session.handle_skip_intro().await;

        assert_eq!(applied, 60.0);
        assert_eq!(harness.session.current_time(), 120.0);
    }

    #[tokio::test]
    async fn skip_intro_without_exact_interval_jumps_85_seconds() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let resolver = resolver_with(&media_ref, Vec::new());
        let mut harness = harness(media_ref, resolver);
        harness.session.start(None).await;

        tick(&mut harness.session, 100.0, 600.0);
        let applied = harness.session.handle_skip_intro().await;

        assert_eq!(applied, 85.0);
        assert_eq!(harness.session.current_time(), 185.0);
    }

    #[tokio::test]
    async fn seek_posts_both_command_shapes_with_the_target() {
        let media_ref = MediaRef::movie(550);
        let mut harness = harness(media_ref, resolver_with(&media_ref, Vec::new()));
        harness.session.start(None).await;

        tick(&mut harness.session, 50.0, 600.0);
        harness.session.seek(30.0).await;

        let posts = harness.surface.posts.lock().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["action"], "seek");
        assert_eq!(posts[0]["time"], 80.0);
        assert_eq!(posts[1]["args"][0], 80.0);
    }

    #[tokio::test]
    async fn seek_clamps_to_the_known_duration() {
        let media_ref = MediaRef::movie(550);
        let mut harness = harness(media_ref, resolver_with(&media_ref, Vec::new()));
        harness.session.start(None).await;

        tick(&mut harness.session, 550.0, 600.0);
        let applied = harness.session.seek(500.0).await;
        assert_eq!(applied, 50.0);
        assert_eq!(harness.session.current_time(), 600.0);

        let applied = harness.session.seek(-10_000.0).await;
        assert_eq!(applied, -600.0);
        assert_eq!(harness.session.current_time(), 0.0);
    }

    #[tokio::test]
    async fn outro_interval_raises_next_episode_affordance() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let resolver = resolver_with(
            &media_ref,
            vec![
                SkipInterval::new(SkipKind::Intro, 0.0, 90.0),
                SkipInterval::new(SkipKind::Outro, 3400.0, 3600.0),
            ],
        );
        let mut harness = harness(media_ref, resolver);
        harness.session.start(None).await;

        tick(&mut harness.session, 1000.0, 3600.0);
        assert!(!harness.session.next_episode_active());

        tick(&mut harness.session, 3450.0, 3600.0);
        assert!(harness.session.next_episode_active());

        // With an exact outro present, the remaining-time heuristic alone
        // must not raise the affordance.
        tick(&mut harness.session, 3395.0, 3600.0);
        assert!(!harness.session.next_episode_active());
    }

    #[tokio::test]
    async fn remaining_time_heuristic_when_no_outro_exists() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let resolver = resolver_with(&media_ref, Vec::new());
        let mut harness = harness(media_ref, resolver);
        harness.session.start(None).await;

        tick(&mut harness.session, 3450.0, 3600.0);
        assert!(harness.session.next_episode_active());
    }

    #[tokio::test]
    async fn movies_never_get_the_next_episode_affordance() {
        let media_ref = MediaRef::movie(550);
        let mut harness = harness(media_ref, resolver_with(&media_ref, Vec::new()));
        harness.session.start(None).await;

        tick(&mut harness.session, 590.0, 600.0);
        assert!(!harness.session.next_episode_active());
    }

    #[tokio::test]
    async fn in_player_episode_change_folds_back_into_active() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let mut harness = harness(media_ref, SkipIntervalResolver::new());
        harness.session.start(None).await;
        drain(&mut harness.events);

        harness
            .session
            .handle_message(&json!({ "season": 1, "episode": 2, "currentTime": 1.0, "duration": 3600.0 }));

        assert_eq!(harness.session.state(), SessionState::Active);
        assert_eq!(
            harness.session.media_ref(),
            MediaRef::tv_episode(1399, 1, 2)
        );
        let navigations: Vec<_> = drain(&mut harness.events)
            .into_iter()
            .filter(|event| matches!(event, SessionEvent::Navigate(_)))
            .collect();
        assert_eq!(
            navigations,
            vec![SessionEvent::Navigate(Route::Watch(MediaRef::tv_episode(
                1399, 1, 2
            )))]
        );

        // The continue-watching row now points at the new episode.
        let records = harness.progress.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].media_ref.episode, Some(2));
    }

    #[tokio::test]
    async fn next_episode_advances_within_the_season() {
        let media_ref = MediaRef::tv_episode(1399, 1, 1);
        let mut harness = harness(media_ref, SkipIntervalResolver::new());
        harness.session.start(None).await;
        harness.session.apply_details(&details_with_seasons(&[(1, 10), (2, 10)]));

        let route = harness.session.handle_next_episode();
        assert_eq!(route, Route::Watch(MediaRef::tv_episode(1399, 1, 2)));
    }

    #[tokio::test]
    async fn next_episode_rolls_into_the_following_season() {
        let media_ref = MediaRef::tv_episode(1399, 1, 10);
        let mut harness = harness(media_ref, SkipIntervalResolver::new());
        harness.session.start(None).await;
        harness.session.apply_details(&details_with_seasons(&[(1, 10), (2, 8)]));

        let route = harness.session.handle_next_episode();
        assert_eq!(route, Route::Watch(MediaRef::tv_episode(1399, 2, 1)));
    }

    #[tokio::test]
    async fn next_episode_at_the_very_end_navigates_to_detail() {
        let media_ref = MediaRef::tv_episode(1399, 2, 8);
        let mut harness = harness(media_ref, SkipIntervalResolver::new());
        harness.session.start(None).await;
        harness.session.apply_details(&details_with_seasons(&[(1, 10), (2, 8)]));
        drain(&mut harness.events);

        let route = harness.session.handle_next_episode();
        assert_eq!(route, Route::TvDetail(1399));
        assert_eq!(
            drain(&mut harness.events),
            vec![SessionEvent::Navigate(Route::TvDetail(1399))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_is_throttled_to_one_write_per_window() {
        let media_ref = MediaRef::movie(550);
        let mut harness = harness(media_ref, resolver_with(&media_ref, Vec::new()));
        harness.session.start(None).await;

        // Two events one second apart: only the first may write.
        tick(&mut harness.session, 10.0, 600.0);
        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        tick(&mut harness.session, 11.0, 600.0);
        assert_eq!(harness.progress.list()[0].watched_seconds, 10.0);

        // Six seconds later the next event writes again.
        tokio::time::advance(std::time::Duration::from_secs(6)).await;
        tick(&mut harness.session, 17.0, 600.0);
        assert_eq!(harness.progress.list()[0].watched_seconds, 17.0);
    }

    #[tokio::test]
    async fn malformed_messages_are_ignored() {
        let media_ref = MediaRef::movie(550);
        let mut harness = harness(media_ref, resolver_with(&media_ref, Vec::new()));
        harness.session.start(None).await;

        harness.session.handle_message(&json!("not even json"));
        harness.session.handle_message(&json!({ "event": "ready" }));
        harness.session.handle_message(&json!(12));
        harness
            .session
            .handle_message(&json!({ "currentTime": 10.0, "duration": 0.0 }));

        assert_eq!(harness.session.current_time(), 0.0);
        assert_eq!(harness.progress.list()[0].watched_seconds, 0.0);
    }

    #[tokio::test]
    async fn no_writes_after_termination() {
        let media_ref = MediaRef::movie(550);
        let mut harness = harness(media_ref, resolver_with(&media_ref, Vec::new()));
        harness.session.start(None).await;

        tick(&mut harness.session, 10.0, 600.0);
        harness.session.terminate();
        assert_eq!(harness.session.state(), SessionState::Terminated);

        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        tick(&mut harness.session, 500.0, 600.0);
        assert_eq!(harness.progress.list()[0].watched_seconds, 10.0);

        let applied = harness.session.seek(30.0).await;
        assert_eq!(applied, 0.0);
    }

    #[tokio::test]
    async fn null_surface_is_a_valid_surface() {
        let media_ref = MediaRef::movie(550);
        let progress = WatchProgressStore::new(Arc::new(StateStore::in_memory()));
        let (mut session, _events) = PlaybackSession::new(
            media_ref,
            Arc::new(NullSurface),
            progress,
            Arc::new(SkipIntervalResolver::new()),
        );
        session.start(None).await;
        tick(&mut session, 5.0, 100.0);
        assert_eq!(session.seek(10.0).await, 10.0);
    }
}
