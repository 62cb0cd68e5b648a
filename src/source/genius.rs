use std::time::Duration;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::app::{LyricsBotError, Result};
use crate::config::GeniusConfig;
use crate::domain::Song;
use crate::source::{non_blank, SearchLookup};

const LYRICS_CONTAINER_ATTR: &str = "data-lyrics-container=\"true\"";

/// Title fragments that mark a hit as something other than a song.
const NON_SONG_TERMS: &[&str] = &[
    "track list",
    "tracklist",
    "album art",
    "liner notes",
    "booklet",
    "credits",
    "interview",
    "skit",
    "instrumental",
    "setlist",
];

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "type")]
    kind: String,
    result: SongHit,
}

#[derive(Debug, Clone, Deserialize)]
struct SongHit {
    title: String,
    url: String,
    primary_artist: ArtistHit,
}

#[derive(Debug, Clone, Deserialize)]
struct ArtistHit {
    name: String,
}

/// Free-text search against the Genius API, with lyrics scraped from the
/// song page. Without a token every search is absent and nothing is sent
/// over the network.
pub struct GeniusSearch {
    client: Client,
    api_url: Url,
    token: Option<String>,
    excluded_terms: Vec<String>,
    skip_non_songs: bool,
}

impl GeniusSearch {
    pub fn new(config: &GeniusConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("lyricsbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_url = Url::parse(&config.api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(LyricsBotError::Config(format!(
                "Genius api_url cannot carry path segments: {}",
                config.api_url
            )));
        }

        Ok(Self {
            client,
            api_url,
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            excluded_terms: config
                .excluded_terms
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            skip_non_songs: config.skip_non_songs,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// `{api_url}/search?q=...`, keeping any path prefix on the base.
    fn search_url(&self, query: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("search");
        }
        url.query_pairs_mut().append_pair("q", query);
        url
    }

    fn select_hit(&self, hits: Vec<SearchHit>) -> Option<SongHit> {
        hits.into_iter()
            .filter(|hit| hit.kind == "song")
            .map(|hit| hit.result)
            .find(|song| self.accepts_title(&song.title))
    }

    fn accepts_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        if self.excluded_terms.iter().any(|term| title.contains(term)) {
            return false;
        }
        !(self.skip_non_songs && NON_SONG_TERMS.iter().any(|term| title.contains(term)))
    }
}

#[async_trait]
impl SearchLookup for GeniusSearch {
    fn name(&self) -> &str {
        "genius"
    }

    async fn search(&self, query: &str) -> Result<Option<Song>> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };

        let response = self
            .client
            .get(self.search_url(query))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?
            .error_for_status()?;

        let envelope: SearchEnvelope = serde_json::from_slice(&response.bytes().await?)?;
        let Some(hit) = self.select_hit(envelope.response.hits) else {
            tracing::debug!("genius: no song hit for {:?}", query);
            return Ok(None);
        };

        let page = self
            .client
            .get(&hit.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let lyrics = non_blank(extract_lyrics(&page));
        Ok(lyrics.map(|lyrics| Song::new(hit.title, hit.primary_artist.name, lyrics)))
    }
}

/// Pulls the lyrics text out of a Genius song page.
///
/// Every element tagged as a lyrics container contributes its text; `<br>`
/// becomes a newline and all other markup is dropped.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let mut sections = Vec::new();
    let mut cursor = 0;

    while let Some(found) = html[cursor..].find(LYRICS_CONTAINER_ATTR) {
        let attr_at = cursor + found;
        let Some(tag_start) = html[..attr_at].rfind('<') else {
            break;
        };
        let Some(open_end) = html[attr_at..].find('>').map(|i| attr_at + i + 1) else {
            break;
        };
        let tag_name: String = html[tag_start + 1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();

        let close_at = matching_close(html, open_end, &tag_name).unwrap_or(html.len());
        sections.push(html_to_text(&html[open_end..close_at]));
        cursor = close_at.max(open_end);
    }

    let text = sections.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Byte offset of the closing tag that balances an element opened just
/// before `from`.
fn matching_close(html: &str, from: usize, tag: &str) -> Option<usize> {
    if tag.is_empty() {
        return None;
    }
    let open = format!("<{}", tag);
    let close = format!("</{}", tag);
    let mut depth = 1usize;
    let mut pos = from;

    loop {
        let next_close = html[pos..].find(&close)? + pos;
        let next_open = html[pos..]
            .find(&open)
            .map(|i| i + pos)
            .filter(|&i| i < next_close && is_tag_boundary(html, i + open.len()));

        match next_open {
            Some(i) => {
                depth += 1;
                pos = i + open.len();
            }
            None => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_close);
                }
                pos = next_close + close.len();
            }
        }
    }
}

fn is_tag_boundary(html: &str, at: usize) -> bool {
    html[at..]
        .chars()
        .next()
        .is_some_and(|c| c == '>' || c == '/' || c.is_whitespace())
}

fn html_to_text(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
        if tag == "br" || tag.starts_with("br ") || tag.starts_with("br/") {
            text.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    text.push_str(rest);

    decode_html_entities(&text).into_owned()
}

impl std::fmt::Debug for GeniusSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeniusSearch")
            .field("api_url", &self.api_url.as_str())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
