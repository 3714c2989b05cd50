//! Statistics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::DailyStatRepository as _;
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult};
use shared::models::DailyStat;

/// Query params for daily stats
#[derive(Debug, Deserialize)]
pub struct DailyStatsQuery {
    pub branch_id: i64,
    /// YYYY-MM-DD (inclusive)
    pub start: String,
    /// YYYY-MM-DD (inclusive)
    pub end: String,
}

/// Daily aggregates for one branch over a day range
pub async fn get_daily_stats(
    State(state): State<ServerState>,
    Query(query): Query<DailyStatsQuery>,
) -> AppResult<Json<Vec<DailyStat>>> {
    let start = parse_date(&query.start)
        .ok_or_else(|| AppError::validation(format!("Invalid date: {}", query.start)))?;
    let end = parse_date(&query.end)
        .ok_or_else(|| AppError::validation(format!("Invalid date: {}", query.end)))?;
    if start > end {
        return Err(AppError::validation("start must not be after end"));
    }

    let stats = state
        .stats
        .range(query.branch_id, start, end)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(stats))
}

/// Rebuild response
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub orders_folded: usize,
}

/// Repair path: refold every order into fresh buckets
pub async fn rebuild(State(state): State<ServerState>) -> AppResult<Json<RebuildResponse>> {
    let orders_folded = state
        .engine
        .rebuild_from_orders(state.orders.as_ref())
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(RebuildResponse { orders_folded }))
}
