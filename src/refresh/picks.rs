use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::RefreshTask;
use crate::api::health::TaskKind;
use crate::context::ServiceContext;
use crate::error::Result;
use crate::extract::PickExtractor;
use crate::sources::PicksSource;
use crate::store::Store;
use crate::types::PickRecord;

/// Scrapes the picks page and upserts whatever the extractor finds.
pub struct PicksRefresher {
    source: Arc<dyn PicksSource>,
    extractor: Arc<dyn PickExtractor>,
    store: Arc<dyn Store>,
}

impl PicksRefresher {
    pub fn new(
        source: Arc<dyn PicksSource>,
        extractor: Arc<dyn PickExtractor>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self { source, extractor, store }
    }

    pub fn from_context(ctx: &ServiceContext) -> Self {
        Self::new(
            Arc::clone(&ctx.picks_source),
            Arc::clone(&ctx.extractor),
            Arc::clone(&ctx.store),
        )
    }

    /// Returns the number of picks upserted.
    pub async fn refresh(&self) -> Result<usize> {
        let markup = self.source.fetch_page().await?;
        let picks = self.extractor.extract(&markup, self.source.url(), Utc::now())?;
        let picks = dedupe_by_key(picks);

        self.store.upsert_picks(&picks).await?;
        Ok(picks.len())
    }
}

#[async_trait]
impl RefreshTask for PicksRefresher {
    fn kind(&self) -> TaskKind {
        TaskKind::Picks
    }

    async fn run_cycle(&self) -> Result<usize> {
        let count = self.refresh().await?;
        info!(
            picks = count,
            url = %self.source.url(),
            "Picks scrape complete: {count} picks",
        );
        Ok(count)
    }
}

/// A page can list the same pick twice; keep one row per dedup_key.
fn dedupe_by_key(picks: Vec<PickRecord>) -> Vec<PickRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<PickRecord> = Vec::with_capacity(picks.len());

    for pick in picks {
        match index.get(&pick.dedup_key) {
            Some(&i) => out[i] = pick,
            None => {
                index.insert(pick.dedup_key.clone(), out.len());
                out.push(pick);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SelectorExtractor;
    use crate::store::SqliteStore;
    use crate::testutil::{pick_record, FakePicksSource, RecordingStore};

    const PAGE: &str = r#"
        <div class="pick-card"><span class="event-name">A vs B</span><span class="prediction">A ML</span></div>
        <div class="pick-card"><span class="event-name">A vs B</span><span class="prediction">A ML</span></div>
        <div class="pick-card"><span class="event-name">C vs D</span><span class="prediction">Under 8.5</span></div>
    "#;

    fn extractor() -> Arc<dyn PickExtractor> {
        Arc::new(
            SelectorExtractor::new("pickdawgz", ".pick-card", ".event-name", ".prediction")
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn scrape_upserts_unique_picks_once() {
        let store = Arc::new(RecordingStore::default());
        let task =
            PicksRefresher::new(Arc::new(FakePicksSource::ok(PAGE)), extractor(), store.clone());

        assert_eq!(task.refresh().await.unwrap(), 2);

        let upserts = store.pick_upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0][0].source_url, "https://picks.test");
    }

    #[tokio::test]
    async fn unparseable_markup_keeps_existing_picks() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .upsert_picks(&[pick_record("Old vs Pick", "Old ML")])
            .await
            .unwrap();
        let store: Arc<dyn Store> = Arc::new(store);

        let task = PicksRefresher::new(
            Arc::new(FakePicksSource::ok("\u{0}<<</div>>> garbage {{{")),
            extractor(),
            store.clone(),
        );
        assert_eq!(task.run_cycle().await.unwrap(), 0);

        let stored = store.list_picks().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].event, "Old vs Pick");
    }

    #[tokio::test]
    async fn fetch_failure_skips_the_write() {
        let store = Arc::new(RecordingStore::default());
        let task =
            PicksRefresher::new(Arc::new(FakePicksSource::failing()), extractor(), store.clone());

        assert!(task.refresh().await.is_err());
        assert!(store.pick_upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rescrape_is_idempotent_in_the_store() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().await.unwrap());
        let task =
            PicksRefresher::new(Arc::new(FakePicksSource::ok(PAGE)), extractor(), store.clone());

        task.refresh().await.unwrap();
        task.refresh().await.unwrap();

        assert_eq!(store.list_picks().await.unwrap().len(), 2);
    }
}
