//! Pluggable business logic behind the HTTP surface.

use async_trait::async_trait;

use crate::config::DEFAULT_CHAT_REPLY;
use crate::error::Result;
use crate::types::{GeneratedPick, OddsRecord, PickOrigin, PickRecord};

/// Combines stored odds and scraped picks into the `/api/picks` payload.
pub trait PickRanker: Send + Sync {
    fn rank(&self, odds: &[OddsRecord], scraped: &[PickRecord]) -> Vec<GeneratedPick>;
}

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn respond(&self, user_id: &str, message: &str) -> Result<String>;
}

/// Returns scraped picks unchanged, in stored order. Odds are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughRanker;

impl PickRanker for PassthroughRanker {
    fn rank(&self, _odds: &[OddsRecord], scraped: &[PickRecord]) -> Vec<GeneratedPick> {
        scraped
            .iter()
            .map(|p| GeneratedPick {
                sport: None,
                event: p.event.clone(),
                prediction: p.prediction.clone(),
                odds: None,
                confidence: None,
                source: PickOrigin::Scraper,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CannedResponder {
    reply: String,
}

impl CannedResponder {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_REPLY)
    }
}

#[async_trait]
impl ResponseGenerator for CannedResponder {
    async fn respond(&self, _user_id: &str, _message: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn passthrough_keeps_order_and_marks_scraper_origin() {
        let now = Utc::now();
        let scraped = vec![
            PickRecord::new("s", "u", "A vs B", "A ML", now),
            PickRecord::new("s", "u", "C vs D", "Under 8.5", now),
        ];
        let picks = PassthroughRanker.rank(&[], &scraped);

        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].event, "A vs B");
        assert_eq!(picks[1].prediction, "Under 8.5");
        assert!(picks.iter().all(|p| p.source == PickOrigin::Scraper));
    }

    #[test]
    fn passthrough_of_nothing_is_empty() {
        assert!(PassthroughRanker.rank(&[], &[]).is_empty());
    }

    #[tokio::test]
    async fn canned_responder_uses_default_reply() {
        let reply = CannedResponder::default().respond("u1", "who wins?").await.unwrap();
        assert_eq!(reply, DEFAULT_CHAT_REPLY);
    }
}
