//! Lyrics resolution: parse, cache check, fallback fetch, persist, deliver.
//!
//! The acknowledgment and the cache check run inline on the caller's task.
//! Anything that touches the network runs on a spawned task that holds a
//! permit from the pipeline's semaphore for its whole lifetime.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::app::{LyricsBotError, Result};
use crate::config::PipelineConfig;
use crate::delivery::Delivery;
use crate::domain::{ResolutionQuery, Song};
use crate::segment::send_segmented;
use crate::session::SessionMemory;
use crate::source::{DirectLookup, SearchLookup};
use crate::store::FavoriteStore;

pub const DEFAULT_WORKERS: usize = 10;

pub const EMPTY_INPUT_PROMPT: &str = "Send a song title and/or artist.";
pub const NOT_FOUND_MESSAGE: &str = "❌ Sorry, I couldn't find lyrics.";

pub fn acknowledgment(query: &ResolutionQuery) -> String {
    format!("🎶 Finding lyrics for {}...", query.raw)
}

/// What `resolve` did before returning control to the caller.
#[derive(Debug)]
pub enum Resolution {
    /// Blank input; the user was prompted and nothing else happened.
    EmptyInput,
    /// Served from the favorites table without touching any source.
    Cached(Song),
    /// A background fetch was spawned. Dropping the handle does not cancel it.
    Scheduled(JoinHandle<Result<FetchOutcome>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(Song),
    NotFound,
}

#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn FavoriteStore + Send + Sync>,
    direct: Arc<dyn DirectLookup>,
    search: Arc<dyn SearchLookup>,
    session: Arc<SessionMemory>,
    semaphore: Arc<Semaphore>,
    max_message_len: usize,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn FavoriteStore + Send + Sync>,
        direct: Arc<dyn DirectLookup>,
        search: Arc<dyn SearchLookup>,
        session: Arc<SessionMemory>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            store,
            direct,
            search,
            session,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            max_message_len: config.max_message_len,
        }
    }

    pub fn session(&self) -> &Arc<SessionMemory> {
        &self.session
    }

    pub fn max_message_len(&self) -> usize {
        self.max_message_len
    }

    /// Handle one free-text message from `user_id`.
    ///
    /// Returns as soon as the user has been acknowledged and either served
    /// from cache or handed off to a background fetch.
    pub async fn resolve(
        &self,
        user_id: i64,
        text: &str,
        delivery: Arc<dyn Delivery>,
    ) -> Result<Resolution> {
        let Some(query) = ResolutionQuery::parse(text) else {
            delivery.send(EMPTY_INPUT_PROMPT).await?;
            return Ok(Resolution::EmptyInput);
        };

        delivery.send(&acknowledgment(&query)).await?;

        if let Some(song) = self.store.find_cached(&query.title, &query.artist)? {
            info!(user_id, "Cache hit for {:?}", query.raw);
            self.session.set(user_id, song.clone());
            self.deliver(&song, true, delivery.as_ref()).await?;
            return Ok(Resolution::Cached(song));
        }

        info!(user_id, "Cache miss for {:?}, fetching in background", query.raw);

        let pipeline = self.clone();
        let handle = tokio::spawn(async move {
            let result = pipeline.fetch_and_deliver(user_id, query, delivery).await;
            if let Err(e) = &result {
                error!(user_id, "Lyrics request failed: {}", e);
            }
            result
        });

        Ok(Resolution::Scheduled(handle))
    }

    async fn fetch_and_deliver(
        &self,
        user_id: i64,
        query: ResolutionQuery,
        delivery: Arc<dyn Delivery>,
    ) -> Result<FetchOutcome> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| LyricsBotError::Other(format!("Fetch pool closed: {}", e)))?;

        let Some(song) = self.fetch_song(&query).await else {
            info!(user_id, "No lyrics found for {:?}", query.raw);
            delivery.send(NOT_FOUND_MESSAGE).await?;
            return Ok(FetchOutcome::NotFound);
        };

        self.session.set(user_id, song.clone());
        let id = self.store.save(user_id, &song)?;
        info!(user_id, id, "Saved {}", song.display_name());

        self.deliver(&song, false, delivery.as_ref()).await?;
        Ok(FetchOutcome::Found(song))
    }

    /// Try every source and argument ordering; the first hit wins.
    ///
    /// 1. direct lookup as (artist, title), then swapped, when an artist was given
    /// 2. search with "title artist", then "artist title"
    pub async fn fetch_song(&self, query: &ResolutionQuery) -> Option<Song> {
        if query.has_artist() {
            debug!("{}: {} / {}", self.direct.name(), query.artist, query.title);
            let found = self.direct.lookup(&query.artist, &query.title).await;
            if let Some(lyrics) = absent_on_error(self.direct.name(), found) {
                return Some(Song::new(&query.title, &query.artist, lyrics));
            }

            debug!("{}: {} / {}", self.direct.name(), query.title, query.artist);
            let swapped = self.direct.lookup(&query.title, &query.artist).await;
            if let Some(lyrics) = absent_on_error(self.direct.name(), swapped) {
                return Some(Song::new(&query.artist, &query.title, lyrics));
            }
        }

        for search_query in query.search_queries() {
            debug!("{}: {:?}", self.search.name(), search_query);
            let found = self.search.search(&search_query).await;
            if let Some(song) = absent_on_error(self.search.name(), found) {
                return Some(song);
            }
        }

        None
    }

    async fn deliver(&self, song: &Song, cached: bool, delivery: &dyn Delivery) -> Result<()> {
        delivery.send(&song.header(cached)).await?;
        send_segmented(&song.lyrics, self.max_message_len, delivery).await
    }
}

/// The single place where a source failure becomes "not found".
fn absent_on_error<T>(source: &str, result: Result<Option<T>>) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(e) => {
            warn!("{} lookup failed: {}", source, e);
            None
        }
    }
}
