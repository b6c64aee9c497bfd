use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use super::{Store, CHAT_TABLE, ODDS_CONFLICT_KEY, ODDS_TABLE, PICKS_CONFLICT_KEY, PICKS_TABLE};
use crate::error::{AppError, Result};
use crate::types::{ChatMessage, NewChatMessage, OddsRecord, PickRecord};

/// Hosted backend: Supabase tables through the PostgREST API.
///
/// Expects `odds_data` unique on `(event_id, bookmaker, markets)` with jsonb
/// `h2h`/`spreads`, `scraped_picks` unique on `dedup_key`, and
/// `chat_messages` with an identity `id` and a defaulted `created_at`.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn upsert<T: Serialize + Sync>(
        &self,
        table: &str,
        on_conflict: &str,
        rows: &[T],
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let response = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        check_status(table, response).await?;
        Ok(())
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let response = self
            .request(Method::GET, table)
            .query(params)
            .send()
            .await?;
        let response = check_status(table, response).await?;
        Ok(response.json().await?)
    }
}

/// Non-2xx responses become `AppError::Store` carrying the PostgREST body.
async fn check_status(table: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Store(format!("{table}: {status}: {body}")))
}

#[async_trait]
impl Store for SupabaseStore {
    async fn upsert_odds(&self, records: &[OddsRecord]) -> Result<()> {
        self.upsert(ODDS_TABLE, ODDS_CONFLICT_KEY, records).await
    }

    async fn upsert_picks(&self, picks: &[PickRecord]) -> Result<()> {
        self.upsert(PICKS_TABLE, PICKS_CONFLICT_KEY, picks).await
    }

    async fn list_odds(&self) -> Result<Vec<OddsRecord>> {
        self.select(ODDS_TABLE, &[("select", "*"), ("order", "id.asc")]).await
    }

    async fn list_picks(&self) -> Result<Vec<PickRecord>> {
        self.select(PICKS_TABLE, &[("select", "*"), ("order", "scraped_at.asc")]).await
    }

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<ChatMessage> {
        let response = self
            .request(Method::POST, CHAT_TABLE)
            .header("Prefer", "return=representation")
            .json(message)
            .send()
            .await?;
        let response = check_status(CHAT_TABLE, response).await?;
        let mut rows: Vec<ChatMessage> = response.json().await?;
        rows.pop()
            .ok_or_else(|| AppError::Store(format!("{CHAT_TABLE}: insert returned no row")))
    }

    async fn chat_history(&self, user_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        let user_filter = format!("eq.{user_id}");
        let limit = limit.to_string();
        let mut messages: Vec<ChatMessage> = self
            .select(
                CHAT_TABLE,
                &[
                    ("select", "*"),
                    ("user_id", user_filter.as_str()),
                    ("order", "id.desc"),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;
        messages.reverse();
        Ok(messages)
    }
}
