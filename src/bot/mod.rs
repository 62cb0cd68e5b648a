//! Chat command surface.
//!
//! Inbound text is either a `/command` or free text for the resolution
//! pipeline. Transports call [`handle_message`] once per inbound message.

pub mod commands;
pub mod telegram;

use std::sync::Arc;

use crate::app::{AppContext, Result};
use crate::delivery::Delivery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Favorite,
    MyFavorites,
    GetFav(Vec<String>),
    Unknown(String),
    Text(String),
}

impl BotCommand {
    /// `/name@bot arg1 arg2` is a command; everything else is free text.
    pub fn parse(text: &str) -> Self {
        Self::parse_addressed(text, None)
    }

    /// Like [`BotCommand::parse`], but a command mentioning a bot other than
    /// `bot_username` is `Unknown`, so group chats with several bots only
    /// get answers to commands meant for this one.
    pub fn parse_addressed(text: &str, bot_username: Option<&str>) -> Self {
        let trimmed = text.trim_start();
        let Some(command_line) = trimmed.strip_prefix('/') else {
            return BotCommand::Text(text.to_string());
        };

        let mut words = command_line.split_whitespace();
        let head = words.next().unwrap_or_default();
        let (name, mention) = match head.split_once('@') {
            Some((name, mention)) => (name.to_lowercase(), Some(mention)),
            None => (head.to_lowercase(), None),
        };
        if let (Some(mention), Some(me)) = (mention, bot_username) {
            if !mention.eq_ignore_ascii_case(me) {
                return BotCommand::Unknown(head.to_string());
            }
        }
        let args: Vec<String> = words.map(String::from).collect();

        match name.as_str() {
            "start" => BotCommand::Start,
            "help" => BotCommand::Help,
            "favorite" => BotCommand::Favorite,
            "myfavorites" => BotCommand::MyFavorites,
            "getfav" => BotCommand::GetFav(args),
            _ => BotCommand::Unknown(name),
        }
    }
}

/// Route one inbound message from `user_id`.
///
/// Errors are storage or delivery failures for this message only.
pub async fn handle_message(
    ctx: &AppContext,
    user_id: i64,
    text: &str,
    delivery: Arc<dyn Delivery>,
) -> Result<()> {
    handle_message_as(ctx, None, user_id, text, delivery).await
}

/// [`handle_message`] for a transport that knows its own bot username.
pub async fn handle_message_as(
    ctx: &AppContext,
    bot_username: Option<&str>,
    user_id: i64,
    text: &str,
    delivery: Arc<dyn Delivery>,
) -> Result<()> {
    let command = BotCommand::parse_addressed(text, bot_username);
    tracing::debug!(user_id, "Inbound {:?}", command);

    match command {
        BotCommand::Start => commands::start(delivery.as_ref()).await,
        BotCommand::Help => commands::help(delivery.as_ref()).await,
        BotCommand::Favorite => commands::save_favorite(ctx, user_id, delivery.as_ref()).await,
        BotCommand::MyFavorites => {
            commands::list_favorites(ctx, user_id, delivery.as_ref()).await
        }
        BotCommand::GetFav(args) => {
            commands::get_favorite(ctx, user_id, &args, delivery.as_ref()).await
        }
        BotCommand::Unknown(name) => {
            tracing::debug!(user_id, "Ignoring unknown command /{}", name);
            Ok(())
        }
        BotCommand::Text(text) => {
            ctx.pipeline.resolve(user_id, &text, delivery).await?;
            Ok(())
        }
    }
}
