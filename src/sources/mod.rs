//! Outbound clients for the two external data sources.

pub mod odds_api;
pub mod picks_page;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::Result;
use crate::types::Sport;

pub use odds_api::{OddsApiClient, OddsApiEvent};
pub use picks_page::PicksPageClient;

/// Outcome of one per-sport odds request.
#[derive(Debug, Clone)]
pub enum SportFetch {
    Fetched(Vec<OddsApiEvent>),
    /// Non-200 response; skipped for this cycle.
    Skipped(StatusCode),
}

#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Transport and decode failures are `Err`; a non-200 status is `Ok(Skipped)`.
    async fn fetch_sport(&self, sport: Sport) -> Result<SportFetch>;
}

#[async_trait]
pub trait PicksSource: Send + Sync {
    /// URL reported on every scraped pick.
    fn url(&self) -> &str;

    async fn fetch_page(&self) -> Result<String>;
}

pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}
