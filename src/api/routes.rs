use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::health::HealthResponse;
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::types::{ChatMessage, ChatRole, GeneratedPick, NewChatMessage};

pub fn router(ctx: ServiceContext) -> Router {
    Router::new()
        .route("/api/picks", get(get_picks))
        .route("/api/chat", post(post_chat))
        .route("/api/chat/:user_id", get(get_chat_history))
        .route("/health", get(get_health))
        .with_state(ctx)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_picks(
    State(ctx): State<ServiceContext>,
) -> Result<Json<Vec<GeneratedPick>>, AppError> {
    let odds = ctx.store.list_odds().await?;
    let scraped = ctx.store.list_picks().await?;

    Ok(Json(ctx.ranker.rank(&odds, &scraped)))
}

async fn post_chat(
    State(ctx): State<ServiceContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let message = required("message", req.message)?;
    let user_id = required("user_id", req.user_id)?;

    ctx.store
        .insert_chat_message(&NewChatMessage {
            user_id: user_id.clone(),
            role: ChatRole::User,
            content: message.clone(),
        })
        .await?;

    let response = ctx.responder.respond(&user_id, &message).await?;

    ctx.store
        .insert_chat_message(&NewChatMessage {
            user_id: user_id.clone(),
            role: ChatRole::Assistant,
            content: response.clone(),
        })
        .await?;

    info!(user_id = %user_id, "Chat reply sent");
    Ok(Json(ChatResponse { response }))
}

async fn get_chat_history(
    State(ctx): State<ServiceContext>,
    Path(user_id): Path<String>,
    params: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(ctx.chat_history_limit);
    if limit <= 0 {
        return Err(AppError::Validation("limit must be positive".into()));
    }

    Ok(Json(ctx.store.chat_history(&user_id, limit).await?))
}

async fn get_health(State(ctx): State<ServiceContext>) -> Json<HealthResponse> {
    Json(HealthResponse::from(ctx.health.as_ref()))
}
