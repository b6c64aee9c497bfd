use std::sync::Arc;

use crate::api::health::HealthState;
use crate::config::Config;
use crate::error::Result;
use crate::extract::{PickExtractor, SelectorExtractor};
use crate::sources::{http_client, OddsApiClient, OddsSource, PicksPageClient, PicksSource};
use crate::store::{self, Store};
use crate::strategy::{CannedResponder, PassthroughRanker, PickRanker, ResponseGenerator};
use crate::types::Sport;

/// Process-wide handles, built once in `main` and shared by the refresh
/// tasks and the HTTP handlers.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn Store>,
    pub odds_source: Arc<dyn OddsSource>,
    pub picks_source: Arc<dyn PicksSource>,
    pub extractor: Arc<dyn PickExtractor>,
    pub ranker: Arc<dyn PickRanker>,
    pub responder: Arc<dyn ResponseGenerator>,
    pub health: Arc<HealthState>,
    pub sports: Vec<Sport>,
    pub chat_history_limit: i64,
}

impl ServiceContext {
    pub async fn from_config(cfg: &Config) -> Result<Self> {
        let client = http_client(cfg.http_timeout_secs)?;

        let store = store::connect(cfg, client.clone()).await?;
        let extractor = SelectorExtractor::new(
            cfg.picks_source.clone(),
            cfg.picks_card_selector.clone(),
            cfg.picks_event_selector.clone(),
            cfg.picks_prediction_selector.clone(),
        )?;

        Ok(Self {
            store,
            odds_source: Arc::new(OddsApiClient::new(
                client.clone(),
                cfg.odds_api_url.clone(),
                cfg.odds_api_key.clone(),
            )),
            picks_source: Arc::new(PicksPageClient::new(client, cfg.picks_url.clone())),
            extractor: Arc::new(extractor),
            ranker: Arc::new(PassthroughRanker),
            responder: Arc::new(CannedResponder::default()),
            health: Arc::new(HealthState::new()),
            sports: cfg.sports.clone(),
            chat_history_limit: cfg.chat_history_limit,
        })
    }
}

#[cfg(test)]
impl ServiceContext {
    /// Context over the given store and sources with the default strategies.
    pub fn for_tests(
        store: Arc<dyn Store>,
        odds_source: Arc<dyn OddsSource>,
        picks_source: Arc<dyn PicksSource>,
    ) -> Self {
        use crate::config::{pick_selectors, PICKS_SOURCE};

        let extractor = SelectorExtractor::new(
            PICKS_SOURCE,
            pick_selectors::CARD,
            pick_selectors::EVENT,
            pick_selectors::PREDICTION,
        )
        .expect("default selectors are valid");

        Self {
            store,
            odds_source,
            picks_source,
            extractor: Arc::new(extractor),
            ranker: Arc::new(PassthroughRanker),
            responder: Arc::new(CannedResponder::default()),
            health: Arc::new(HealthState::new()),
            sports: Sport::ALL.to_vec(),
            chat_history_limit: 50,
        }
    }
}
