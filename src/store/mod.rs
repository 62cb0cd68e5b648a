pub mod sqlite;

use crate::app::Result;
use crate::domain::{FavoriteRecord, FavoriteSummary, Song};

pub use sqlite::SqliteStore;

/// Favorites persistence. The same table doubles as the lyrics cache.
pub trait FavoriteStore {
    /// Creates the schema if it does not exist yet. Safe to call repeatedly.
    fn init(&self) -> Result<()>;

    /// Appends a row and returns its id. Duplicates are never merged.
    fn save(&self, user_id: i64, song: &Song) -> Result<i64>;

    /// Newest first.
    fn list_by_user(&self, user_id: i64) -> Result<Vec<FavoriteSummary>>;

    /// `None` both when the id does not exist and when it belongs to
    /// another user.
    fn get_lyrics_by_id(&self, id: i64, user_id: i64) -> Result<Option<String>> {
        Ok(self.get_favorite(id, user_id)?.map(|record| record.lyrics))
    }

    /// Ownership-scoped lookup of a full row.
    fn get_favorite(&self, id: i64, user_id: i64) -> Result<Option<FavoriteRecord>>;

    /// Case-insensitive exact match on title and artist across all users.
    /// The most recent matching row wins.
    fn find_cached(&self, title: &str, artist: &str) -> Result<Option<Song>>;
}
