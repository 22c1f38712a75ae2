// Client core shared by the app shells: catalog access, local state,
// playback session orchestration. UI lives elsewhere.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod fetch;
pub mod models;
pub mod playback;
pub mod routing;
pub mod store;

pub use catalog::CatalogService;
pub use config::Config;
pub use playback::{PlaybackSession, SessionEvent, SkipIntervalResolver};
pub use routing::{Route, resolve_short_link};
pub use store::{LibraryStore, StateStore, WatchProgressStore};
