//! Remote lyrics sources.
//!
//! Each source reports failures as `Err` values. The resolution pipeline
//! turns any error into "absent" in one place, so callers never special-case
//! a source failure.

pub mod genius;
pub mod lyrics_ovh;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Song;

pub use genius::GeniusSearch;
pub use lyrics_ovh::LyricsOvh;

/// Lookup keyed by an explicit artist and title.
#[async_trait]
pub trait DirectLookup: Send + Sync {
    /// Human-readable source name used in logs.
    fn name(&self) -> &str;

    async fn lookup(&self, artist: &str, title: &str) -> Result<Option<String>>;
}

/// Free-text search that resolves canonical song metadata along with the
/// lyrics.
#[async_trait]
pub trait SearchLookup: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Option<Song>>;
}

/// Treats blank lyrics bodies as missing.
pub(crate) fn non_blank(lyrics: Option<String>) -> Option<String> {
    lyrics.filter(|l| !l.trim().is_empty())
}
