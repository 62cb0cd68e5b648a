use std::sync::Arc;

use crate::app::{AppContext, LyricsBotError, Result};
use crate::bot::{self, telegram::TelegramClient};
use crate::config::Config;
use crate::delivery::{ConsoleDelivery, Delivery};
use crate::pipeline::Resolution;

pub async fn run_bot(ctx: Arc<AppContext>, config: &Config) -> Result<()> {
    let client = Arc::new(TelegramClient::new(&config.telegram)?);
    bot::telegram::run(ctx, client).await
}

/// Resolve `query` and wait for any background fetch to finish.
pub async fn lookup(ctx: &AppContext, user_id: i64, query: &str) -> Result<()> {
    let delivery: Arc<dyn Delivery> = Arc::new(ConsoleDelivery::new());

    match ctx.pipeline.resolve(user_id, query, delivery).await? {
        Resolution::Scheduled(handle) => {
            handle
                .await
                .map_err(|e| LyricsBotError::Other(format!("Lookup task failed: {}", e)))??;
        }
        Resolution::EmptyInput | Resolution::Cached(_) => {}
    }

    Ok(())
}

pub async fn list_favorites(ctx: &AppContext, user_id: i64) -> Result<()> {
    bot::commands::list_favorites(ctx, user_id, &ConsoleDelivery::new()).await
}

pub async fn get_favorite(ctx: &AppContext, user_id: i64, id: &str) -> Result<()> {
    let args = [id.to_string()];
    bot::commands::get_favorite(ctx, user_id, &args, &ConsoleDelivery::new()).await
}
