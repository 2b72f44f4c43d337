use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use super::extract::AppJson;
use super::response::{ApiError, ApiResult, ok};
use super::state::AppState;
use crate::social::LikeAction;

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    action: Option<LikeAction>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Response> {
    let entries = state.store.list_catalog().await?;
    ok(json!({ "data": entries }))
}

/// Generates full content for one curated entry without persisting it.
pub async fn static_full(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::bad_request("Recipe ID is required"));
    }
    let content = state
        .generator
        .expand_catalog_entry(id)
        .await
        .map_err(|err| ApiError::generation("Failed to generate recipe", err))?;
    ok(json!({ "data": content }))
}

/// Counter-based like: `like` increments, `unlike` decrements to a floor of 0.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<LikeRequest>,
) -> ApiResult<Response> {
    let action = req
        .action
        .ok_or_else(|| ApiError::bad_request("action must be 'like' or 'unlike'"))?;
    let entry = state
        .store
        .adjust_catalog_likes(&id, action)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;
    ok(json!({ "likes": entry.likes }))
}
