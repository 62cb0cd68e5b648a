use crate::app::{AppContext, Result};
use crate::delivery::Delivery;
use crate::segment::send_segmented;
use crate::store::FavoriteStore;

pub const START_TEXT: &str = "🎵 LyricsFinder Bot\n\n\
Send a message like Title - Artist or just a song title.\n\
Example: Hello - Adele\n\n\
Commands:\n\
/favorite - save last fetched lyrics\n\
/myfavorites - list your favorites\n\
/getfav <id> - get saved favorite lyrics";

pub const HELP_TEXT: &str = "🎶 Usage:\n\
Shape of You - Ed Sheeran\n\
Adele - Hello\n\
Bohemian Rhapsody\n\n\
Commands:\n\
/favorite - save last lyrics\n\
/myfavorites - list favorites\n\
/getfav <id> - view favorite lyrics";

pub const NO_RECENT_LYRICS: &str = "No recently fetched lyrics to save.";
pub const NO_FAVORITES: &str = "You have no favorites yet.";
pub const GETFAV_USAGE: &str = "Usage: /getfav <id>";
pub const INVALID_ID: &str = "ID must be a number.";
pub const FAVORITE_NOT_FOUND: &str = "Favorite not found.";

pub async fn start(delivery: &dyn Delivery) -> Result<()> {
    delivery.send(START_TEXT).await
}

pub async fn help(delivery: &dyn Delivery) -> Result<()> {
    delivery.send(HELP_TEXT).await
}

/// Persist the user's most recently resolved song as a new favorite.
pub async fn save_favorite(ctx: &AppContext, user_id: i64, delivery: &dyn Delivery) -> Result<()> {
    let Some(song) = ctx.pipeline.session().get(user_id) else {
        return delivery.send(NO_RECENT_LYRICS).await;
    };

    let id = ctx.store.save(user_id, &song)?;
    tracing::info!(user_id, id, "Favorited {}", song.display_name());

    delivery
        .send(&format!("Saved {}", song.display_name()))
        .await
}

pub async fn list_favorites(
    ctx: &AppContext,
    user_id: i64,
    delivery: &dyn Delivery,
) -> Result<()> {
    let favorites = ctx.store.list_by_user(user_id)?;
    if favorites.is_empty() {
        return delivery.send(NO_FAVORITES).await;
    }

    let mut lines = vec!["Your favorites:".to_string()];
    lines.extend(favorites.iter().map(|f| f.display_line()));

    send_segmented(&lines.join("\n"), ctx.pipeline.max_message_len(), delivery).await
}

pub async fn get_favorite(
    ctx: &AppContext,
    user_id: i64,
    args: &[String],
    delivery: &dyn Delivery,
) -> Result<()> {
    let Some(arg) = args.first() else {
        return delivery.send(GETFAV_USAGE).await;
    };
    let Ok(id) = arg.parse::<i64>() else {
        return delivery.send(INVALID_ID).await;
    };

    match ctx.store.get_lyrics_by_id(id, user_id)? {
        Some(lyrics) if !lyrics.is_empty() => {
            send_segmented(&lyrics, ctx.pipeline.max_message_len(), delivery).await
        }
        _ => delivery.send(FAVORITE_NOT_FOUND).await,
    }
}
