//! Health analysis handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use vitta_core::analysis::AnalysisEngine;
use vitta_core::models::HealthAnalysisReport;

/// GET /api/health-analysis/:msme_id/latest - Most recent report for an MSME
pub async fn get_latest_analysis(
    State(state): State<Arc<AppState>>,
    Path(msme_id): Path<String>,
) -> Result<Json<HealthAnalysisReport>, AppError> {
    let report = state.db.latest_report(&msme_id)?;
    Ok(Json(report))
}

/// Query parameters for report history
#[derive(Debug, Deserialize)]
pub struct AnalysisHistoryQuery {
    /// Number of reports to return (default 10)
    pub limit: Option<i64>,
}

/// GET /api/health-analysis/:msme_id/history - Reports newest first
///
/// An MSME with no reports yields an empty list, not an error.
pub async fn get_analysis_history(
    State(state): State<Arc<AppState>>,
    Path(msme_id): Path<String>,
    Query(params): Query<AnalysisHistoryQuery>,
) -> Result<Json<Vec<HealthAnalysisReport>>, AppError> {
    let limit = params.limit.unwrap_or(10).min(MAX_PAGE_LIMIT);
    let history = state.db.report_history(&msme_id, limit)?;
    Ok(Json(history))
}

/// POST /api/health-analysis/:msme_id/run - Derive and persist a new report
///
/// Reads the MSME's newest snapshot, derives a report (defaults where the
/// snapshot is sparse or absent), and appends it as a new immutable record.
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Path(msme_id): Path<String>,
) -> Result<Json<HealthAnalysisReport>, AppError> {
    let engine = AnalysisEngine::new(&state.db);
    let report = engine.run(&msme_id)?;

    info!(msme_id = %report.msme_id, report_id = %report.report_id, "analysis run completed");

    Ok(Json(report))
}
