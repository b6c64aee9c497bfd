use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Sport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    #[serde(rename = "basketball_nba")]
    BasketballNba,
    #[serde(rename = "baseball_mlb")]
    BaseballMlb,
    #[serde(rename = "football_nfl")]
    FootballNfl,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::BasketballNba, Sport::BaseballMlb, Sport::FootballNfl];

    /// Path segment used by the odds API.
    pub fn key(&self) -> &'static str {
        match self {
            Sport::BasketballNba => "basketball_nba",
            Sport::BaseballMlb => "baseball_mlb",
            Sport::FootballNfl => "football_nfl",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for Sport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sport::ALL
            .into_iter()
            .find(|sport| sport.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Config(format!("unknown sport key: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

/// Query parameters sent with every odds request.
pub const ODDS_REGION: &str = "us";
pub const ODDS_MARKETS: &str = "h2h,spreads";
pub const ODDS_FORMAT: &str = "american";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomePrice {
    pub name: String,
    /// American odds, e.g. -110 or +145.
    pub price: Option<i32>,
    /// Handicap for spread outcomes; absent for head-to-head.
    pub point: Option<f64>,
}

/// One bookmaker's h2h + spread prices for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub sport: Sport,
    pub event_id: String,
    pub bookmaker: String,
    /// Requested market set; part of the unique key.
    pub markets: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: Option<DateTime<Utc>>,
    pub h2h: Option<Vec<OutcomePrice>>,
    pub spreads: Option<Vec<OutcomePrice>>,
    pub region: String,
    pub odds_format: String,
    pub retrieved_at: DateTime<Utc>,
}

impl OddsRecord {
    pub fn unique_key(&self) -> (&str, &str, &str) {
        (&self.event_id, &self.bookmaker, &self.markets)
    }
}

// ---------------------------------------------------------------------------
// Scraped picks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickRecord {
    pub dedup_key: String,
    pub source: String,
    pub source_url: String,
    pub event: String,
    pub prediction: String,
    pub scraped_at: DateTime<Utc>,
}

impl PickRecord {
    pub fn new(
        source: &str,
        source_url: &str,
        event: impl Into<String>,
        prediction: impl Into<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let event = event.into();
        let prediction = prediction.into();
        Self {
            dedup_key: pick_dedup_key(source, &event, &prediction),
            source: source.to_string(),
            source_url: source_url.to_string(),
            event,
            prediction,
            scraped_at,
        }
    }
}

/// SHA-256 hex over `source \n event \n prediction`.
pub fn pick_dedup_key(source: &str, event: &str, prediction: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\n");
    hasher.update(event.as_bytes());
    hasher.update(b"\n");
    hasher.update(prediction.as_bytes());
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Generated picks (HTTP output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickOrigin {
    /// Priced from `odds_data` by an odds-aware ranker. The default
    /// passthrough ranker only emits `Scraper`.
    #[allow(dead_code)]
    OddsApi,
    Scraper,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPick {
    pub sport: Option<Sport>,
    pub event: String,
    pub prediction: String,
    pub odds: Option<i32>,
    pub confidence: Option<u8>,
    pub source: PickOrigin,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChatRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(AppError::Store(format!("unknown chat role: {other}"))),
        }
    }
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewChatMessage {
    pub user_id: String,
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Monotonic insertion order.
    pub id: i64,
    pub user_id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sport_keys_parse_back() {
        for sport in Sport::ALL {
            assert_eq!(sport.key().parse::<Sport>().unwrap(), sport);
        }
        assert!("icehockey_nhl".parse::<Sport>().is_err());
    }

    #[test]
    fn sport_serializes_as_api_key() {
        let json = serde_json::to_string(&Sport::BaseballMlb).unwrap();
        assert_eq!(json, "\"baseball_mlb\"");
    }

    #[test]
    fn pick_origin_uses_snake_case_tags() {
        assert_eq!(serde_json::to_string(&PickOrigin::OddsApi).unwrap(), "\"odds_api\"");
        assert_eq!(serde_json::to_string(&PickOrigin::Scraper).unwrap(), "\"scraper\"");
    }

    #[test]
    fn dedup_key_is_stable_and_field_sensitive() {
        let a = pick_dedup_key("pickdawgz", "Lakers vs Celtics", "Lakers -3.5");
        let b = pick_dedup_key("pickdawgz", "Lakers vs Celtics", "Lakers -3.5");
        let c = pick_dedup_key("pickdawgz", "Lakers vs Celtics", "Celtics +3.5");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn dedup_key_separates_fields() {
        // "ab" + "c" must not collide with "a" + "bc".
        assert_ne!(pick_dedup_key("s", "ab", "c"), pick_dedup_key("s", "a", "bc"));
    }

    #[test]
    fn chat_role_round_trips_through_str() {
        assert_eq!("assistant".parse::<ChatRole>().unwrap(), ChatRole::Assistant);
        assert_eq!(ChatRole::User.to_string(), "user");
        assert!("system".parse::<ChatRole>().is_err());
    }
}
