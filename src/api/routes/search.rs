use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::PlayerSummary;

const MAX_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    /// Taken as text so a malformed value falls back to the default
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub result: Vec<PlayerSummary>,
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.unwrap_or_default();
    let limit = params
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<u32>().ok())
        .unwrap_or(state.search_limit)
        .clamp(1, MAX_LIMIT);

    let result = state
        .search
        .search_players(&query, limit)
        .await
        .map_err(|e| {
            error!("Search request failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(SearchResponse { result }))
}
