use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use super::{OddsSource, SportFetch};
use crate::error::Result;
use crate::types::{OddsRecord, OutcomePrice, Sport, ODDS_FORMAT, ODDS_MARKETS, ODDS_REGION};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OddsApiEvent {
    pub id: String,
    pub commence_time: Option<DateTime<Utc>>,
    pub home_team: String,
    pub away_team: String,
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Bookmaker {
    pub key: String,
    pub markets: Vec<Market>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Market {
    pub key: String,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Outcome {
    pub name: String,
    pub price: Option<i32>,
    pub point: Option<f64>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OddsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OddsApiClient {
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
}

#[async_trait]
impl OddsSource for OddsApiClient {
    async fn fetch_sport(&self, sport: Sport) -> Result<SportFetch> {
        let url = format!("{}/{}/odds", self.base_url.trim_end_matches('/'), sport.key());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", ODDS_REGION),
                ("markets", ODDS_MARKETS),
                ("oddsFormat", ODDS_FORMAT),
            ])
            .send()
            .await?;

        if let Some(remaining) = response.headers().get("x-requests-remaining") {
            info!(
                sport = %sport,
                "Odds API requests remaining: {}",
                remaining.to_str().unwrap_or("?")
            );
        }

        let status = response.status();
        if status != StatusCode::OK {
            warn!(sport = %sport, status = %status, "Odds API returned non-200, skipping sport");
            return Ok(SportFetch::Skipped(status));
        }

        let events: Vec<OddsApiEvent> = response.json().await?;
        info!(sport = %sport, events = events.len(), "Fetched {} events for {sport}", events.len());
        Ok(SportFetch::Fetched(events))
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Flatten events into one record per (event, bookmaker). Bookmakers offering
/// neither h2h nor spreads are dropped.
pub fn normalize_events(
    sport: Sport,
    events: &[OddsApiEvent],
    retrieved_at: DateTime<Utc>,
) -> Vec<OddsRecord> {
    let mut records = Vec::new();

    for event in events {
        for bookmaker in &event.bookmakers {
            let h2h = market_prices(bookmaker, "h2h");
            let spreads = market_prices(bookmaker, "spreads");
            if h2h.is_none() && spreads.is_none() {
                continue;
            }

            records.push(OddsRecord {
                sport,
                event_id: event.id.clone(),
                bookmaker: bookmaker.key.clone(),
                markets: ODDS_MARKETS.to_string(),
                home_team: event.home_team.clone(),
                away_team: event.away_team.clone(),
                commence_time: event.commence_time,
                h2h,
                spreads,
                region: ODDS_REGION.to_string(),
                odds_format: ODDS_FORMAT.to_string(),
                retrieved_at,
            });
        }
    }

    records
}

fn market_prices(bookmaker: &Bookmaker, key: &str) -> Option<Vec<OutcomePrice>> {
    bookmaker.markets.iter().find(|m| m.key == key).map(|m| {
        m.outcomes
            .iter()
            .map(|o| OutcomePrice {
                name: o.name.clone(),
                price: o.price,
                point: o.point,
            })
            .collect()
    })
}
