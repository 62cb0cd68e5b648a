//! # lyricsbot
//!
//! A chat bot that turns a free-form song reference into lyrics and keeps a
//! per-user history of favorites.
//!
//! ## Architecture
//!
//! ```text
//! Message → Pipeline → Store (cache) → Sources → Store + Session → Segmenter → Delivery
//! ```
//!
//! - [`pipeline`]: parses input, checks the cache, runs the fallback fetch
//! - [`source`]: lyrics.ovh direct lookup and Genius search fallback
//! - [`store`]: SQLite favorites table, also used as the lyrics cache
//! - [`segment`]: splits long lyrics into transport-sized messages
//! - [`bot`]: command surface and the Telegram long-polling transport
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the bot
//! TELEGRAM_TOKEN=... lyricsbot run
//!
//! # One-shot lookup on the terminal
//! lyricsbot lookup "Hello - Adele"
//!
//! # Inspect favorites
//! lyricsbot favorites --user 42
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// the lyrics sources and the pipeline.
pub mod app;

/// Chat commands and the Telegram transport.
pub mod bot;

/// Command-line interface using clap.
///
/// - `run` - Run the Telegram bot (default)
/// - `lookup <query>` - Resolve one song to stdout
/// - `favorites --user <id>` - List favorites
/// - `getfav <id> --user <id>` - Print one favorite
pub mod cli;

/// Configuration file and environment overrides.
pub mod config;

/// Outbound message sink.
pub mod delivery;

/// Core domain models.
///
/// - [`Song`](domain::Song): A resolved title, artist and lyrics body
/// - [`FavoriteRecord`](domain::FavoriteRecord): A persisted favorites row
/// - [`ResolutionQuery`](domain::ResolutionQuery): Title/artist candidates from raw input
pub mod domain;

/// The lyrics resolution pipeline.
pub mod pipeline;

/// Splitting long text for length-limited transports.
pub mod segment;

/// Per-user memory of the last resolved song.
pub mod session;

/// Remote lyrics sources.
///
/// - [`DirectLookup`](source::DirectLookup): artist/title lookup
/// - [`SearchLookup`](source::SearchLookup): free-text search
pub mod source;

/// SQLite persistence layer.
///
/// - [`FavoriteStore`](store::FavoriteStore): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
