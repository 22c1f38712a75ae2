pub mod messages;
pub mod session;
pub mod skip;
pub mod surface;

pub use messages::SurfaceEvent;
pub use session::{PlaybackSession, SessionEvent, SessionState};
pub use skip::SkipIntervalResolver;
pub use surface::{NullSurface, PlaybackSurface, embed_url};
