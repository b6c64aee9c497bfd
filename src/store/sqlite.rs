use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::models::{ChatMessageRow, OddsRow, PickRow};
use super::Store;
use crate::error::Result;
use crate::types::{ChatMessage, NewChatMessage, OddsRecord, PickRecord};

/// Local backend: one SQLite file, schema from `migrations/`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Single-connection in-memory database; every pool connection would
    /// otherwise see its own empty database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_odds(&self, records: &[OddsRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for r in records {
            let h2h = r.h2h.as_ref().map(serde_json::to_string).transpose()?;
            let spreads = r.spreads.as_ref().map(serde_json::to_string).transpose()?;

            sqlx::query(
                r#"
                INSERT INTO odds_data (
                    sport, event_id, bookmaker, markets, home_team, away_team,
                    commence_time, h2h, spreads, region, odds_format, retrieved_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (event_id, bookmaker, markets) DO UPDATE SET
                    sport = excluded.sport,
                    home_team = excluded.home_team,
                    away_team = excluded.away_team,
                    commence_time = excluded.commence_time,
                    h2h = excluded.h2h,
                    spreads = excluded.spreads,
                    region = excluded.region,
                    odds_format = excluded.odds_format,
                    retrieved_at = excluded.retrieved_at
                "#,
            )
            .bind(r.sport.key())
            .bind(&r.event_id)
            .bind(&r.bookmaker)
            .bind(&r.markets)
            .bind(&r.home_team)
            .bind(&r.away_team)
            .bind(r.commence_time)
            .bind(h2h)
            .bind(spreads)
            .bind(&r.region)
            .bind(&r.odds_format)
            .bind(r.retrieved_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn upsert_picks(&self, picks: &[PickRecord]) -> Result<()> {
        if picks.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for p in picks {
            sqlx::query(
                r#"
                INSERT INTO scraped_picks (dedup_key, source, source_url, event, prediction, scraped_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT (dedup_key) DO UPDATE SET
                    source_url = excluded.source_url,
                    scraped_at = excluded.scraped_at
                "#,
            )
            .bind(&p.dedup_key)
            .bind(&p.source)
            .bind(&p.source_url)
            .bind(&p.event)
            .bind(&p.prediction)
            .bind(p.scraped_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn list_odds(&self) -> Result<Vec<OddsRecord>> {
        let rows = sqlx::query_as::<_, OddsRow>(
            r#"
            SELECT sport, event_id, bookmaker, markets, home_team, away_team,
                   commence_time, h2h, spreads, region, odds_format, retrieved_at
            FROM odds_data
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OddsRecord::try_from).collect()
    }

    async fn list_picks(&self) -> Result<Vec<PickRecord>> {
        let rows = sqlx::query_as::<_, PickRow>(
            r#"
            SELECT dedup_key, source, source_url, event, prediction, scraped_at
            FROM scraped_picks
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PickRecord::from).collect())
    }

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<ChatMessage> {
        let row = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            INSERT INTO chat_messages (user_id, role, content, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, role, content, created_at
            "#,
        )
        .bind(&message.user_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn chat_history(&self, user_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            SELECT id, user_id, role, content, created_at
            FROM chat_messages
            WHERE user_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .into_iter()
            .map(ChatMessage::try_from)
            .collect::<Result<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }
}
