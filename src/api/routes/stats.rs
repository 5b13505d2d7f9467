use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::AggregateStats;

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub username: Option<String>,
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<AggregateStats>, ApiError> {
    let stats = state
        .stats
        .get_stats(params.username.as_deref())
        .await
        .map_err(|e| {
            error!("Stats request failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(stats))
}
