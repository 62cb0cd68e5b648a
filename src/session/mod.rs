use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::Song;

/// Most recently resolved song per user. Lives for the process only.
///
/// Overlapping requests from one user race; whichever finishes last wins.
#[derive(Debug, Default)]
pub struct SessionMemory {
    entries: Mutex<HashMap<i64, Song>>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: i64, song: Song) {
        self.entries().insert(user_id, song);
    }

    pub fn get(&self, user_id: i64) -> Option<Song> {
        self.entries().get(&user_id).cloned()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<i64, Song>> {
        // A panic mid-insert cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
