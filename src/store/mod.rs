//! Persistent store: `odds_data`, `scraped_picks` and `chat_messages`.

pub mod models;
pub mod sqlite;
pub mod supabase;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::error::Result;
use crate::types::{ChatMessage, NewChatMessage, OddsRecord, PickRecord};

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

pub const ODDS_TABLE: &str = "odds_data";
pub const PICKS_TABLE: &str = "scraped_picks";
pub const CHAT_TABLE: &str = "chat_messages";

pub const ODDS_CONFLICT_KEY: &str = "event_id,bookmaker,markets";
pub const PICKS_CONFLICT_KEY: &str = "dedup_key";

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert-or-replace by (event_id, bookmaker, markets). Empty input is a no-op.
    async fn upsert_odds(&self, records: &[OddsRecord]) -> Result<()>;

    /// Insert-or-replace by dedup_key. Empty input is a no-op.
    async fn upsert_picks(&self, picks: &[PickRecord]) -> Result<()>;

    async fn list_odds(&self) -> Result<Vec<OddsRecord>>;

    async fn list_picks(&self) -> Result<Vec<PickRecord>>;

    /// Append-only; returns the stored row with its assigned id.
    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<ChatMessage>;

    /// Latest `limit` messages for the user, oldest first.
    async fn chat_history(&self, user_id: &str, limit: i64) -> Result<Vec<ChatMessage>>;
}

pub async fn connect(cfg: &Config, client: reqwest::Client) -> Result<Arc<dyn Store>> {
    match cfg.store_backend {
        StoreBackend::Supabase => {
            info!("Using Supabase store at {:?}", cfg.supabase_url);
            Ok(Arc::new(SupabaseStore::new(
                client,
                cfg.supabase_url.clone(),
                cfg.supabase_key.clone(),
            )))
        }
        StoreBackend::Sqlite => {
            let store = SqliteStore::connect(&cfg.db_path).await?;
            info!("Database ready at {}", cfg.db_path);
            Ok(Arc::new(store))
        }
    }
}
