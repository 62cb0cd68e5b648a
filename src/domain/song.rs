use serde::{Deserialize, Serialize};

/// A resolved song together with its full lyrics body.
///
/// This is what the pipeline delivers, what session memory remembers per
/// user, and what a cache hit yields from the favorites table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub lyrics: String,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        lyrics: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            lyrics: lyrics.into(),
        }
    }

    /// `Title — Artist`
    pub fn display_name(&self) -> String {
        format!("{} — {}", self.title, self.artist)
    }

    /// Header line sent ahead of the lyrics body.
    pub fn header(&self, cached: bool) -> String {
        if cached {
            format!("🎵 {} (cached)", self.display_name())
        } else {
            format!("🎶 {}", self.display_name())
        }
    }
}
