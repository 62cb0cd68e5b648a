use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use url::Url;

use crate::app::{AppContext, LyricsBotError, Result};
use crate::config::TelegramConfig;
use crate::delivery::Delivery;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

/// A text message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user_id: i64,
    pub chat_id: i64,
    pub text: String,
}

impl Update {
    /// Only text messages with a known sender are handled.
    pub fn into_inbound(self) -> Option<Inbound> {
        let message = self.message?;
        Some(Inbound {
            user_id: message.from?.id,
            chat_id: message.chat.id,
            text: message.text?,
        })
    }
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Minimal Telegram Bot API client: long polling and plain-text replies.
pub struct TelegramClient {
    client: Client,
    api_url: String,
    token: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                LyricsBotError::Config("TELEGRAM_TOKEN not set (env or [telegram] token)".into())
            })?;

        // Must exceed the long-poll timeout.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .user_agent(concat!("lyricsbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            poll_timeout_secs: config.poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/bot{}/{}",
            self.api_url, self.token, method
        ))?)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method)?)
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let bytes = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        decode_envelope(method, envelope)
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({})).await
    }

    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let request = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessage { chat_id, text })
            .await?;
        Ok(())
    }
}

fn decode_envelope<T>(method: &str, envelope: ApiResponse<T>) -> Result<T> {
    if !envelope.ok {
        return Err(LyricsBotError::Telegram(format!(
            "{}: {}",
            method,
            envelope.description.unwrap_or_else(|| "unknown error".into())
        )));
    }
    envelope
        .result
        .ok_or_else(|| LyricsBotError::Telegram(format!("{}: empty result", method)))
}

/// Replies into one chat.
pub struct TelegramDelivery {
    client: Arc<TelegramClient>,
    chat_id: i64,
}

impl TelegramDelivery {
    pub fn new(client: Arc<TelegramClient>, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn send(&self, text: &str) -> Result<()> {
        self.client
            .send_message(self.chat_id, text)
            .await
            .map_err(|e| LyricsBotError::Delivery(format!("chat {}: {}", self.chat_id, e)))
    }
}

/// Poll for updates until Ctrl-C, handling every message on its own task.
pub async fn run(ctx: Arc<AppContext>, client: Arc<TelegramClient>) -> Result<()> {
    let me = client.get_me().await?;
    info!(
        "Bot starting as @{}...",
        me.username.as_deref().unwrap_or("unknown")
    );
    let username: Option<Arc<str>> = me.username.map(Arc::from);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut offset: Option<i64> = None;

    loop {
        let updates = tokio::select! {
            _ = &mut shutdown => break,
            updates = client.get_updates(offset) => updates,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {}", e);
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                }
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let Some(inbound) = update.into_inbound() else {
                continue;
            };
            dispatch(ctx.clone(), client.clone(), username.clone(), inbound);
        }
    }

    info!("Bot shutting down");
    Ok(())
}

fn dispatch(
    ctx: Arc<AppContext>,
    client: Arc<TelegramClient>,
    username: Option<Arc<str>>,
    inbound: Inbound,
) {
    tokio::spawn(async move {
        let delivery: Arc<dyn Delivery> = Arc::new(TelegramDelivery::new(client, inbound.chat_id));
        let result = crate::bot::handle_message_as(
            &ctx,
            username.as_deref(),
            inbound.user_id,
            &inbound.text,
            delivery,
        )
        .await;
        if let Err(e) = result {
            error!(user_id = inbound.user_id, "Failed to handle message: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_token() {
        let result = TelegramClient::new(&TelegramConfig::default());
        assert!(matches!(result, Err(LyricsBotError::Config(_))));
    }

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new(&TelegramConfig {
            token: Some("123:abc".into()),
            api_url: "https://api.telegram.org/".into(),
            poll_timeout_secs: 30,
        })
        .unwrap();
        assert_eq!(
            client.method_url("getUpdates").unwrap().as_str(),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_parse_updates() {
        let body = r#"{"ok": true, "result": [
            {"update_id": 10, "message": {"message_id": 1, "date": 0,
                "chat": {"id": 555, "type": "private"},
                "from": {"id": 42, "is_bot": false, "first_name": "A"},
                "text": "Hello - Adele"}},
            {"update_id": 11, "message": {"message_id": 2, "date": 0,
                "chat": {"id": 555, "type": "private"},
                "from": {"id": 42, "is_bot": false, "first_name": "A"},
                "sticker": {}}},
            {"update_id": 12, "edited_message": {}}
        ]}"#;
        let envelope: ApiResponse<Vec<Update>> = serde_json::from_str(body).unwrap();
        let updates = decode_envelope("getUpdates", envelope).unwrap();
        assert_eq!(updates.len(), 3);

        let inbound: Vec<Inbound> = updates.into_iter().filter_map(Update::into_inbound).collect();
        assert_eq!(
            inbound,
            vec![Inbound {
                user_id: 42,
                chat_id: 555,
                text: "Hello - Adele".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_per_chat() {
        let client = TelegramClient::new(&TelegramConfig {
            token: Some("123:abc".into()),
            api_url: "http://127.0.0.1:9".into(),
            poll_timeout_secs: 1,
        })
        .unwrap();
        let delivery = TelegramDelivery::new(Arc::new(client), 555);

        match delivery.send("hello").await {
            Err(LyricsBotError::Delivery(msg)) => {
                assert!(msg.starts_with("chat 555: "));
                assert!(!msg.contains("123:abc"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let envelope: ApiResponse<Vec<Update>> = serde_json::from_str(body).unwrap();
        match decode_envelope("getUpdates", envelope) {
            Err(LyricsBotError::Telegram(msg)) => assert_eq!(msg, "getUpdates: Unauthorized"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
