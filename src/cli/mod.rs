pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lyricsbot")]
#[command(about = "A chat bot that finds song lyrics and keeps your favorites", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/lyricsbot/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the favorites database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Maximum number of background lyrics fetches at once
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (default)
    Run,
    /// Resolve one song and print its lyrics
    Lookup {
        /// "Title - Artist", "Artist - Title" or just a title
        query: String,

        /// User id to record the result under
        #[arg(short, long, default_value_t = 0)]
        user: i64,
    },
    /// List a user's favorites, newest first
    Favorites {
        #[arg(short, long)]
        user: i64,
    },
    /// Print the lyrics of one favorite
    Getfav {
        id: String,

        #[arg(short, long)]
        user: i64,
    },
}
