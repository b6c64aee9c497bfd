use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use tracing::info;

use super::RefreshTask;
use crate::api::health::TaskKind;
use crate::context::ServiceContext;
use crate::error::Result;
use crate::sources::odds_api::normalize_events;
use crate::sources::{OddsSource, SportFetch};
use crate::store::Store;
use crate::types::{OddsRecord, Sport};

#[derive(Debug, Default)]
pub struct OddsCycleReport {
    pub fetched: Vec<Sport>,
    pub skipped: Vec<(Sport, StatusCode)>,
    pub records: usize,
}

/// Fetches every configured sport, then writes the union in one upsert.
pub struct OddsRefresher {
    source: Arc<dyn OddsSource>,
    store: Arc<dyn Store>,
    sports: Vec<Sport>,
}

impl OddsRefresher {
    pub fn new(source: Arc<dyn OddsSource>, store: Arc<dyn Store>, sports: Vec<Sport>) -> Self {
        Self { source, store, sports }
    }

    pub fn from_context(ctx: &ServiceContext) -> Self {
        Self::new(Arc::clone(&ctx.odds_source), Arc::clone(&ctx.store), ctx.sports.clone())
    }

    /// A non-200 sport is skipped; any `Err` aborts the cycle before the upsert.
    pub async fn refresh(&self) -> Result<OddsCycleReport> {
        let mut report = OddsCycleReport::default();
        let mut all_odds = Vec::new();

        for &sport in &self.sports {
            match self.source.fetch_sport(sport).await? {
                SportFetch::Fetched(events) => {
                    all_odds.extend(normalize_events(sport, &events, Utc::now()));
                    report.fetched.push(sport);
                }
                SportFetch::Skipped(status) => report.skipped.push((sport, status)),
            }
        }

        let all_odds = dedupe_by_key(all_odds);
        self.store.upsert_odds(&all_odds).await?;
        report.records = all_odds.len();

        Ok(report)
    }
}

#[async_trait]
impl RefreshTask for OddsRefresher {
    fn kind(&self) -> TaskKind {
        TaskKind::Odds
    }

    async fn run_cycle(&self) -> Result<usize> {
        let report = self.refresh().await?;
        info!(
            records = report.records,
            fetched = report.fetched.len(),
            skipped = report.skipped.len(),
            "Odds refresh complete: {} records from {} sports ({} skipped)",
            report.records,
            report.fetched.len(),
            report.skipped.len(),
        );
        Ok(report.records)
    }
}

/// Collapse records sharing (event_id, bookmaker, markets); the last one wins
/// and keeps the position of the first.
pub fn dedupe_by_key(records: Vec<OddsRecord>) -> Vec<OddsRecord> {
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();
    let mut out: Vec<OddsRecord> = Vec::with_capacity(records.len());

    for record in records {
        let (event_id, bookmaker, markets) = record.unique_key();
        let key = (event_id.to_owned(), bookmaker.to_owned(), markets.to_owned());
        match index.get(&key) {
            Some(&i) => out[i] = record,
            None => {
                index.insert(key, out.len());
                out.push(record);
            }
        }
    }

    out
}
