//! Financial-health snapshot handlers
//!
//! The snapshot store belongs to the upstream statement processor; these
//! endpoints are its ingest and read surface.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use vitta_core::models::FinancialHealthSnapshot;

/// GET /api/financial-health/:msme_id - Most recent snapshot for an MSME
pub async fn get_financial_health(
    State(state): State<Arc<AppState>>,
    Path(msme_id): Path<String>,
) -> Result<Json<FinancialHealthSnapshot>, AppError> {
    let snapshot = state.db.latest_snapshot(&msme_id)?.ok_or_else(|| {
        AppError::not_found(&format!(
            "Financial health data not found for MSME: {}",
            msme_id
        ))
    })?;

    Ok(Json(snapshot))
}

/// Query parameters for snapshot history
#[derive(Debug, Deserialize)]
pub struct SnapshotHistoryQuery {
    /// Number of snapshots to return (default 10)
    pub limit: Option<i64>,
}

/// GET /api/financial-health/:msme_id/history - Snapshots newest first
///
/// List views omit the full metadata document; fetch the latest snapshot
/// endpoint for the complete record.
pub async fn get_financial_health_history(
    State(state): State<Arc<AppState>>,
    Path(msme_id): Path<String>,
    Query(params): Query<SnapshotHistoryQuery>,
) -> Result<Json<Vec<FinancialHealthSnapshot>>, AppError> {
    let limit = params.limit.unwrap_or(10).min(MAX_PAGE_LIMIT);
    let history = state.db.snapshot_history(&msme_id, limit)?;
    Ok(Json(history))
}

/// POST /api/financial-health - Create or update a snapshot
///
/// A payload carrying a `report_id` that matches a stored snapshot updates
/// it in place; otherwise a new record is appended.
pub async fn upsert_financial_health(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<FinancialHealthSnapshot>,
) -> Result<Json<FinancialHealthSnapshot>, AppError> {
    if snapshot.msme_id.trim().is_empty() {
        return Err(AppError::bad_request("msme_id is required"));
    }

    let stored = state.db.upsert_snapshot(&snapshot)?;

    info!(msme_id = %stored.msme_id, "financial health snapshot stored");

    Ok(Json(stored))
}
