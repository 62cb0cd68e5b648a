use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{LyricsBotError, Result};
use crate::domain::{FavoriteRecord, FavoriteSummary, Song};
use crate::store::FavoriteStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            LyricsBotError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }
}

impl FavoriteStore for SqliteStore {
    fn init(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| LyricsBotError::Other(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn save(&self, user_id: i64, song: &Song) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO favorites (user_id, title, artist, lyrics) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, song.title, song.artist, song.lyrics],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn list_by_user(&self, user_id: i64) -> Result<Vec<FavoriteSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, artist FROM favorites WHERE user_id = ?1 ORDER BY id DESC",
        )?;

        let favorites = stmt
            .query_map(params![user_id], |row| {
                Ok(FavoriteSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(favorites)
    }

    fn get_favorite(&self, id: i64, user_id: i64) -> Result<Option<FavoriteRecord>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT id, user_id, title, artist, lyrics
                 FROM favorites WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                |row| {
                    Ok(FavoriteRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        title: row.get(2)?,
                        artist: row.get(3)?,
                        lyrics: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn find_cached(&self, title: &str, artist: &str) -> Result<Option<Song>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT title, artist, lyrics FROM favorites
                 WHERE lower(title) = lower(?1) AND lower(artist) = lower(?2)
                 ORDER BY id DESC LIMIT 1",
                params![title, artist],
                |row| {
                    Ok(Song {
                        title: row.get(0)?,
                        artist: row.get(1)?,
                        lyrics: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, artist: &str) -> Song {
        Song::new(title, artist, format!("lyrics of {}", title))
    }

    #[test]
    fn test_save_and_get_favorite() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.save(42, &song("Hello", "Adele")).unwrap();

        let record = store.get_favorite(id, 42).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.user_id, 42);
        assert_eq!(record.title, "Hello");
        assert_eq!(record.artist, "Adele");
        assert_eq!(record.lyrics, "lyrics of Hello");
    }

    #[test]
    fn test_init_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        store.save(1, &song("Hello", "Adele")).unwrap();
        store.init().unwrap();
        store.init().unwrap();
        assert_eq!(store.list_by_user(1).unwrap().len(), 1);
    }

    #[test]
    fn test_list_by_user_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        let first = store.save(42, &song("Hello", "Adele")).unwrap();
        store.save(99, &song("Other", "Someone")).unwrap();
        let second = store.save(42, &song("Imagine", "John Lennon")).unwrap();

        let favorites = store.list_by_user(42).unwrap();
        let ids: Vec<i64> = favorites.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(favorites[0].title, "Imagine");
    }

    #[test]
    fn test_list_by_user_empty() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.list_by_user(7).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.save(42, &song("Hello", "Adele")).unwrap();
        let b = store.save(42, &song("Hello", "Adele")).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list_by_user(42).unwrap().len(), 2);
    }

    #[test]
    fn test_get_lyrics_rejects_other_owner() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.save(99, &song("Hello", "Adele")).unwrap();

        assert_eq!(store.get_lyrics_by_id(id, 42).unwrap(), None);
        assert_eq!(
            store.get_lyrics_by_id(id, 99).unwrap(),
            Some("lyrics of Hello".to_string())
        );
    }

    #[test]
    fn test_get_lyrics_nonexistent() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get_lyrics_by_id(12345, 42).unwrap(), None);
    }

    #[test]
    fn test_find_cached_case_insensitive() {
        let store = SqliteStore::in_memory().unwrap();
        store.save(1, &song("Imagine", "John Lennon")).unwrap();

        let cached = store.find_cached("imagine", "JOHN LENNON").unwrap().unwrap();
        assert_eq!(cached.title, "Imagine");
        assert_eq!(cached.artist, "John Lennon");
    }

    #[test]
    fn test_find_cached_requires_both_fields() {
        let store = SqliteStore::in_memory().unwrap();
        store.save(1, &song("Imagine", "John Lennon")).unwrap();

        assert!(store.find_cached("Imagine", "").unwrap().is_none());
        assert!(store.find_cached("Imagine", "Lennon").unwrap().is_none());
    }

    #[test]
    fn test_find_cached_prefers_most_recent() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .save(1, &Song::new("Hello", "Adele", "old version"))
            .unwrap();
        store
            .save(2, &Song::new("hello", "adele", "new version"))
            .unwrap();

        let cached = store.find_cached("Hello", "Adele").unwrap().unwrap();
        assert_eq!(cached.lyrics, "new version");
        assert_eq!(store.find_cached("Hello", "Adele").unwrap(), Some(cached));
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.db");

        let id = {
            let store = SqliteStore::new(&path).unwrap();
            store.save(42, &song("Hello", "Adele")).unwrap()
        };

        let reopened = SqliteStore::new(&path).unwrap();
        assert_eq!(
            reopened.get_lyrics_by_id(id, 42).unwrap(),
            Some("lyrics of Hello".to_string())
        );
    }
}
