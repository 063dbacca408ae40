//! Chat REST endpoints: the chat list, search, history, and read state.

use agora_chats::{ChatSummary, MessagePage};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::GatewayResult;
use crate::middleware::AuthenticatedUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub skip: u32,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    pub chat_id: String,
    pub updated: u64,
}

pub fn create_chat_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/api/chats", get(list_chats))
        .route("/api/chats/search", get(search_chats))
        .route("/api/chats/:chat_id/messages", get(list_messages))
        .route("/api/chats/:chat_id/read", post(mark_read))
}

pub async fn list_chats(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> GatewayResult<Json<Vec<ChatSummary>>> {
    Ok(Json(state.chats.chat_list.chat_list(&user_id).await?))
}

pub async fn search_chats(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Query(query): Query<SearchQuery>,
) -> GatewayResult<Json<Vec<ChatSummary>>> {
    Ok(Json(state.chats.chat_list.search(&user_id, &query.q).await?))
}

pub async fn list_messages(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(chat_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> GatewayResult<Json<MessagePage>> {
    state.chats.authorize(&chat_id, &user_id).await?;

    let history = &state.chats.history;
    let page_size = query.limit.unwrap_or_else(|| history.default_page_size());
    let page = history.page_sized(&chat_id, query.skip, page_size).await?;

    debug!(chat_id = %chat_id, skip = query.skip, returned = page.messages.len(), "served history page");
    Ok(Json(page))
}

pub async fn mark_read(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(chat_id): Path<String>,
) -> GatewayResult<Json<ReadResponse>> {
    let updated = state.chats.read_state.mark_read(&chat_id, &user_id).await?;
    Ok(Json(ReadResponse { chat_id, updated }))
}
