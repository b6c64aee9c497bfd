//! Fixtures and fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::{AppError, Result};
use crate::sources::{OddsApiEvent, OddsSource, PicksSource, SportFetch};
use crate::store::Store;
use crate::types::{ChatMessage, NewChatMessage, OddsRecord, OutcomePrice, PickRecord, Sport};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// One event, one bookmaker, h2h + spreads markets.
pub fn sample_event_json(event_id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": event_id,
        "sport_key": "basketball_nba",
        "sport_title": "NBA",
        "commence_time": "2026-01-02T00:10:00Z",
        "home_team": "Boston Celtics",
        "away_team": "Los Angeles Lakers",
        "bookmakers": [{
            "key": "draftkings",
            "title": "DraftKings",
            "last_update": "2026-01-01T12:00:00Z",
            "markets": [
                {
                    "key": "h2h",
                    "outcomes": [
                        {"name": "Boston Celtics", "price": -150},
                        {"name": "Los Angeles Lakers", "price": 130}
                    ]
                },
                {
                    "key": "spreads",
                    "outcomes": [
                        {"name": "Boston Celtics", "price": -110, "point": -3.5},
                        {"name": "Los Angeles Lakers", "price": -110, "point": 3.5}
                    ]
                }
            ]
        }]
    })
}

pub fn sample_events(event_ids: &[&str]) -> Vec<OddsApiEvent> {
    let raw: Vec<_> = event_ids.iter().map(|id| sample_event_json(id)).collect();
    serde_json::from_value(serde_json::Value::Array(raw)).unwrap()
}

pub fn odds_record(sport: Sport, event_id: &str, bookmaker: &str) -> OddsRecord {
    OddsRecord {
        sport,
        event_id: event_id.into(),
        bookmaker: bookmaker.into(),
        markets: "h2h,spreads".into(),
        home_team: "Home".into(),
        away_team: "Away".into(),
        commence_time: Some(fixed_time()),
        h2h: Some(vec![OutcomePrice {
            name: "Home".into(),
            price: Some(-110),
            point: None,
        }]),
        spreads: Some(vec![OutcomePrice {
            name: "Home".into(),
            price: Some(-105),
            point: Some(-1.5),
        }]),
        region: "us".into(),
        odds_format: "american".into(),
        retrieved_at: fixed_time(),
    }
}

pub fn pick_record(event: &str, prediction: &str) -> PickRecord {
    PickRecord::new("pickdawgz", "https://pickdawgz.com", event, prediction, fixed_time())
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Canned per-sport responses; sports without an entry fail with a transport-like error.
#[derive(Default)]
pub struct FakeOddsSource {
    pub responses: HashMap<Sport, SportFetch>,
    pub calls: Mutex<Vec<Sport>>,
}

impl FakeOddsSource {
    pub fn with(mut self, sport: Sport, fetch: SportFetch) -> Self {
        self.responses.insert(sport, fetch);
        self
    }
}

#[async_trait]
impl OddsSource for FakeOddsSource {
    async fn fetch_sport(&self, sport: Sport) -> Result<SportFetch> {
        self.calls.lock().unwrap().push(sport);
        self.responses
            .get(&sport)
            .cloned()
            .ok_or_else(|| AppError::Store(format!("no canned response for {sport}")))
    }
}

pub struct FakePicksSource {
    pub page: Result<String>,
}

impl FakePicksSource {
    pub fn ok(page: &str) -> Self {
        Self { page: Ok(page.to_string()) }
    }

    pub fn failing() -> Self {
        Self {
            page: Err(AppError::Scrape("connection reset".into())),
        }
    }
}

#[async_trait]
impl PicksSource for FakePicksSource {
    fn url(&self) -> &str {
        "https://picks.test"
    }

    async fn fetch_page(&self) -> Result<String> {
        match &self.page {
            Ok(page) => Ok(page.clone()),
            Err(e) => Err(AppError::Scrape(e.to_string())),
        }
    }
}

/// In-memory store recording every write call.
#[derive(Default)]
pub struct RecordingStore {
    pub odds_upserts: Mutex<Vec<Vec<OddsRecord>>>,
    pub pick_upserts: Mutex<Vec<Vec<PickRecord>>>,
    pub chat: Mutex<Vec<ChatMessage>>,
    pub fail_writes: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes {
            Err(AppError::Store("write rejected".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn upsert_odds(&self, records: &[OddsRecord]) -> Result<()> {
        self.check()?;
        self.odds_upserts.lock().unwrap().push(records.to_vec());
        Ok(())
    }

    async fn upsert_picks(&self, picks: &[PickRecord]) -> Result<()> {
        self.check()?;
        self.pick_upserts.lock().unwrap().push(picks.to_vec());
        Ok(())
    }

    async fn list_odds(&self) -> Result<Vec<OddsRecord>> {
        Ok(self.odds_upserts.lock().unwrap().concat())
    }

    async fn list_picks(&self) -> Result<Vec<PickRecord>> {
        Ok(self.pick_upserts.lock().unwrap().concat())
    }

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<ChatMessage> {
        self.check()?;
        let mut chat = self.chat.lock().unwrap();
        let stored = ChatMessage {
            id: chat.len() as i64 + 1,
            user_id: message.user_id.clone(),
            role: message.role,
            content: message.content.clone(),
            created_at: fixed_time(),
        };
        chat.push(stored.clone());
        Ok(stored)
    }

    async fn chat_history(&self, user_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        let chat = self.chat.lock().unwrap();
        let mine: Vec<_> = chat.iter().filter(|m| m.user_id == user_id).cloned().collect();
        let skip = mine.len().saturating_sub(limit.max(0) as usize);
        Ok(mine.into_iter().skip(skip).collect())
    }
}
