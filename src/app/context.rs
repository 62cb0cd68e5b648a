use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{LyricsBotError, Result};
use crate::config::{Config, PipelineConfig};
use crate::pipeline::Pipeline;
use crate::session::SessionMemory;
use crate::source::{DirectLookup, GeniusSearch, LyricsOvh, SearchLookup};
use crate::store::sqlite::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub pipeline: Pipeline,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let db_path = match &config.storage.db_path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };
        tracing::info!("Using favorites database at {}", db_path.display());

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(store, config)
    }

    pub fn in_memory(config: &Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(store, config)
    }

    fn with_store(store: Arc<SqliteStore>, config: &Config) -> Result<Self> {
        let direct: Arc<dyn DirectLookup> = Arc::new(LyricsOvh::new(&config.lyrics_ovh)?);
        let genius = GeniusSearch::new(&config.genius)?;
        if !genius.is_enabled() {
            tracing::info!("No Genius token configured; search fallback disabled");
        }
        let search: Arc<dyn SearchLookup> = Arc::new(genius);

        Ok(Self::with_sources(store, direct, search, &config.pipeline))
    }

    /// Wire a context around explicit sources.
    pub fn with_sources(
        store: Arc<SqliteStore>,
        direct: Arc<dyn DirectLookup>,
        search: Arc<dyn SearchLookup>,
        config: &PipelineConfig,
    ) -> Self {
        let pipeline = Pipeline::new(
            store.clone(),
            direct,
            search,
            Arc::new(SessionMemory::new()),
            config,
        );

        Self { store, pipeline }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| LyricsBotError::Config("Could not find data directory".into()))?;
        let bot_dir = data_dir.join("lyricsbot");
        std::fs::create_dir_all(&bot_dir)?;
        Ok(bot_dir.join("favorites.db"))
    }
}
