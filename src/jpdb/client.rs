//! jpdb API client
//!
//! Rate limited client for the jpdb REST API. Every request passes through a
//! shared throttle so parse and deck traffic together stay inside the
//! service's rate limit, and successful parse results are cached by text
//! digest. Failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use serde_json::json;

use super::cache::ParseCache;
use super::types::{
    DeckId, DeckUpdateMode, JpdbDeck, JpdbError, JpdbParseResult, DECK_FIELDS, TOKEN_FIELDS,
    VOCABULARY_FIELDS,
};

/// Minimum spacing between outgoing requests.
const REQUEST_INTERVAL: Duration = Duration::from_millis(250);

type Throttle = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared jpdb client. Cloning is cheap and clones share the throttle and
/// the parse cache.
#[derive(Clone)]
pub struct JpdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: ParseCache,
    throttle: Arc<Throttle>,
}

#[derive(Deserialize)]
struct DecksResponse {
    #[serde(default)]
    decks: Vec<JpdbDeck>,
}

impl JpdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let quota = Quota::with_period(REQUEST_INTERVAL).expect("non-zero request interval");
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cache: ParseCache::new(),
            throttle: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Whether an API key is configured at all.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    /// Tokenize `text`, serving repeated requests from the cache. Tokens in
    /// the returned result are ordered by position.
    pub async fn parse(&self, text: &str) -> Result<Arc<JpdbParseResult>, JpdbError> {
        if text.is_empty() {
            return Ok(Arc::new(JpdbParseResult::default()));
        }

        let key = ParseCache::key_for(text);
        if let Some(result) = self.cache.get(&key).await {
            tracing::debug!(%key, "parse cache hit");
            return Ok(result);
        }
        tracing::debug!(%key, "parse cache miss");

        let body = json!({
            "text": text,
            "token_fields": TOKEN_FIELDS,
            "vocabulary_fields": VOCABULARY_FIELDS,
        });
        let response = self.post("/api/v1/parse", &self.api_key, &body).await?;
        let mut result: JpdbParseResult = response.json().await?;
        result.tokens.sort_by_key(|token| token.position);

        Ok(self.cache.insert(key, result).await)
    }

    /// Add or remove one word in a deck. A successful mutation clears the
    /// parse cache, since cached card states may no longer be accurate.
    pub async fn modify_deck(
        &self,
        deck_id: DeckId,
        vid: u64,
        sid: u64,
        mode: DeckUpdateMode,
    ) -> Result<(), JpdbError> {
        let body = json!({
            "id": deck_id,
            "vocabulary": [[vid, sid]],
        });
        let path = format!("/api/v1/deck/{}", mode.endpoint());
        self.post(&path, &self.api_key, &body).await?;

        self.cache.clear().await;
        tracing::info!(deck = %deck_id, vid, sid, endpoint = mode.endpoint(), "updated deck");
        Ok(())
    }

    /// List the user's decks. A non-empty `override_api_key` is used instead
    /// of the configured key, which lets a frontend probe a key before
    /// saving it.
    pub async fn list_decks(
        &self,
        override_api_key: Option<&str>,
    ) -> Result<Vec<JpdbDeck>, JpdbError> {
        let api_key = match override_api_key {
            Some(key) if !key.is_empty() => key,
            _ => &self.api_key,
        };
        let body = json!({ "fields": DECK_FIELDS });
        let response = self.post("/api/v1/list-user-decks", api_key, &body).await?;
        let decoded: DecksResponse = response.json().await?;
        Ok(decoded.decks)
    }

    async fn post(
        &self,
        path: &str,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, JpdbError> {
        if api_key.is_empty() {
            return Err(JpdbError::NotConfigured);
        }

        self.throttle.until_ready().await;
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JpdbError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
