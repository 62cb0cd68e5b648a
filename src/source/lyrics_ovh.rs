use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::app::{LyricsBotError, Result};
use crate::config::LyricsOvhConfig;
use crate::source::{non_blank, DirectLookup};

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    lyrics: Option<String>,
}

/// Direct artist/title lookup against the lyrics.ovh API.
pub struct LyricsOvh {
    client: Client,
    base_url: Url,
}

impl LyricsOvh {
    pub fn new(config: &LyricsOvhConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .user_agent(concat!("lyricsbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(LyricsBotError::Config(format!(
                "lyrics.ovh base_url cannot carry path segments: {}",
                config.base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// `{base}/{artist}/{title}` with both segments percent-escaped.
    pub fn lookup_url(&self, artist: &str, title: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(artist).push(title);
        }
        url
    }

    fn parse_body(body: &[u8]) -> Result<Option<String>> {
        let response: LyricsResponse = serde_json::from_slice(body)?;
        Ok(non_blank(response.lyrics))
    }
}

#[async_trait]
impl DirectLookup for LyricsOvh {
    fn name(&self) -> &str {
        "lyrics.ovh"
    }

    async fn lookup(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let url = self.lookup_url(artist, title);
        tracing::debug!("lyrics.ovh lookup: {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            tracing::debug!("lyrics.ovh returned {}", response.status());
            return Ok(None);
        }

        let body = response.bytes().await?;
        Self::parse_body(&body)
    }
}
