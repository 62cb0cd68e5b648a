use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lyricsbot::app::AppContext;
use lyricsbot::cli::{commands, Cli, Commands};
use lyricsbot::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    if let Some(db) = cli.db {
        config.storage.db_path = Some(db);
    }
    if let Some(workers) = cli.workers {
        config.pipeline.max_concurrent_fetches = workers;
    }

    let ctx = AppContext::new(&config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            commands::run_bot(Arc::new(ctx), &config).await?;
        }
        Commands::Lookup { query, user } => {
            commands::lookup(&ctx, user, &query).await?;
        }
        Commands::Favorites { user } => {
            commands::list_favorites(&ctx, user).await?;
        }
        Commands::Getfav { id, user } => {
            commands::get_favorite(&ctx, user, &id).await?;
        }
    }

    Ok(())
}
