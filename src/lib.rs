/// Clipfinder
///
/// Searches the subtitles of downloaded videos for a word and serves the
/// matching clips, plus a client that steps through them one at a time.

pub mod subtitles;
pub mod segment;
pub mod config;
pub mod api;
pub mod client;
pub mod session;
pub mod browse;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::subtitles::{Cue, Subtitle, SubtitleLibrary, Downloader, VideoSite, Lang};
pub use crate::segment::{Segment, Variant, VideoLink, VideoTime, EmbedTemplate};
pub use crate::api::{ApiServer, AppState, build_router};
pub use crate::client::{FetchError, HttpSegmentClient, SegmentSource};
pub use crate::session::{SearchSession, View, Outcome, RequestToken};
pub use crate::browse::Browser;
