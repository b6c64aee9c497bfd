//! SQLite row types for the three tables in `migrations/`.
//! JSON columns (`h2h`, `spreads`) are stored as TEXT.
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::types::{ChatMessage, OddsRecord, PickRecord};

#[derive(Debug, sqlx::FromRow)]
pub struct OddsRow {
    pub sport: String,
    pub event_id: String,
    pub bookmaker: String,
    pub markets: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: Option<DateTime<Utc>>,
    pub h2h: Option<String>,
    pub spreads: Option<String>,
    pub region: String,
    pub odds_format: String,
    pub retrieved_at: DateTime<Utc>,
}

impl TryFrom<OddsRow> for OddsRecord {
    type Error = AppError;

    fn try_from(row: OddsRow) -> Result<Self, Self::Error> {
        let sport = row
            .sport
            .parse()
            .map_err(|_| AppError::Store(format!("unknown sport in odds_data: {}", row.sport)))?;
        let h2h = row.h2h.as_deref().map(serde_json::from_str).transpose()?;
        let spreads = row.spreads.as_deref().map(serde_json::from_str).transpose()?;

        Ok(OddsRecord {
            sport,
            event_id: row.event_id,
            bookmaker: row.bookmaker,
            markets: row.markets,
            home_team: row.home_team,
            away_team: row.away_team,
            commence_time: row.commence_time,
            h2h,
            spreads,
            region: row.region,
            odds_format: row.odds_format,
            retrieved_at: row.retrieved_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PickRow {
    pub dedup_key: String,
    pub source: String,
    pub source_url: String,
    pub event: String,
    pub prediction: String,
    pub scraped_at: DateTime<Utc>,
}

impl From<PickRow> for PickRecord {
    fn from(row: PickRow) -> Self {
        PickRecord {
            dedup_key: row.dedup_key,
            source: row.source,
            source_url: row.source_url,
            event: row.event,
            prediction: row.prediction,
            scraped_at: row.scraped_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ChatMessageRow {
    pub id: i64,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ChatMessageRow> for ChatMessage {
    type Error = AppError;

    fn try_from(row: ChatMessageRow) -> Result<Self, Self::Error> {
        Ok(ChatMessage {
            id: row.id,
            user_id: row.user_id,
            role: row.role.parse()?,
            content: row.content,
            created_at: row.created_at,
        })
    }
}
