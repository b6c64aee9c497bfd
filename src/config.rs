use crate::error::{AppError, Result};
use crate::types::Sport;

pub const ODDS_API_URL: &str = "https://api.the-odds-api.com/v4/sports";
pub const PICKS_URL: &str = "https://pickdawgz.com";
pub const PICKS_SOURCE: &str = "pickdawgz";

/// Default CSS selectors for the picks page.
pub mod pick_selectors {
    pub const CARD: &str = ".pick-card";
    pub const EVENT: &str = ".event-name";
    pub const PREDICTION: &str = ".prediction";
}

/// Odds refresh: daily at 00:00 local time (sec min hour dom mon dow).
pub const ODDS_REFRESH_CRON: &str = "0 0 0 * * *";

/// Picks scrape: 00:00, 08:00 and 16:00 local time.
pub const PICKS_SCRAPE_CRON: &str = "0 0 */8 * * *";

pub const DEFAULT_CHAT_REPLY: &str = "I'm analyzing the odds and my crystal ball...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    Sqlite,
}

impl std::str::FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(AppError::Config(format!(
                "STORE_BACKEND must be `supabase` or `sqlite`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Not validated; an empty value fails on first store call.
    pub supabase_url: String,
    pub supabase_key: String,
    pub store_backend: StoreBackend,
    /// SQLite file used when STORE_BACKEND=sqlite.
    pub db_path: String,
    pub odds_api_url: String,
    pub odds_api_key: String,
    /// Sports fetched each odds cycle (ODDS_SPORTS, comma-separated).
    pub sports: Vec<Sport>,
    pub picks_url: String,
    pub picks_source: String,
    pub picks_card_selector: String,
    pub picks_event_selector: String,
    pub picks_prediction_selector: String,
    pub http_timeout_secs: u64,
    pub chat_history_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            supabase_url: std::env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_key: std::env::var("SUPABASE_KEY").unwrap_or_default(),
            store_backend: std::env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "supabase".to_string())
                .parse()?,
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "picks.db".to_string()),
            odds_api_url: std::env::var("ODDS_API_URL")
                .unwrap_or_else(|_| ODDS_API_URL.to_string()),
            odds_api_key: std::env::var("ODDS_API_KEY").unwrap_or_default(),
            sports: parse_sports(&std::env::var("ODDS_SPORTS").unwrap_or_default())?,
            picks_url: std::env::var("PICKS_URL").unwrap_or_else(|_| PICKS_URL.to_string()),
            picks_source: std::env::var("PICKS_SOURCE")
                .unwrap_or_else(|_| PICKS_SOURCE.to_string()),
            picks_card_selector: std::env::var("PICKS_CARD_SELECTOR")
                .unwrap_or_else(|_| pick_selectors::CARD.to_string()),
            picks_event_selector: std::env::var("PICKS_EVENT_SELECTOR")
                .unwrap_or_else(|_| pick_selectors::EVENT.to_string()),
            picks_prediction_selector: std::env::var("PICKS_PREDICTION_SELECTOR")
                .unwrap_or_else(|_| pick_selectors::PREDICTION.to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .map_err(|_| AppError::Config("HTTP_TIMEOUT_SECS must be an integer".to_string()))?,
            chat_history_limit: std::env::var("CHAT_HISTORY_LIMIT")
                .unwrap_or_else(|_| "50".to_string())
                .parse::<i64>()
                .map_err(|_| {
                    AppError::Config("CHAT_HISTORY_LIMIT must be an integer".to_string())
                })?,
        })
    }
}

/// Empty input selects every sport.
pub fn parse_sports(raw: &str) -> Result<Vec<Sport>> {
    let sports = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<Sport>)
        .collect::<Result<Vec<_>>>()?;
    if sports.is_empty() {
        Ok(Sport::ALL.to_vec())
    } else {
        Ok(sports)
    }
}
