//! Integration tests for vitta-core
//!
//! These tests exercise the full snapshot → run → read workflow.

use serde_json::json;

use vitta_core::{
    analysis::AnalysisEngine,
    db::Database,
    models::{FinancialHealthSnapshot, GstAnalysis},
    Error,
};

/// Snapshot with a two-month breakdown and no declared net cashflow,
/// so the engine has to derive the series and the net figure itself.
fn seeded_snapshot(msme_id: &str) -> FinancialHealthSnapshot {
    let mut snapshot = FinancialHealthSnapshot::new(msme_id);
    snapshot.average_balance = Some(82_500.0);
    snapshot.metadata = Some(json!({
        "cashflow_volatility": 0.18,
        "low_balance_days": 5,
        "pattern_analysis": {
            "monthly_breakdown": {
                "2025-01": { "credits": 100.0, "debits": 40.0 },
                "2025-02": { "credits": 120.0, "debits": 50.0 }
            }
        }
    }));
    snapshot
}

#[test]
fn test_full_analysis_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");

    db.upsert_snapshot(&seeded_snapshot("M1")).unwrap();

    let engine = AnalysisEngine::new(&db);
    let report = engine.run("M1").expect("Analysis run failed");

    assert_eq!(report.msme_id, "M1");
    assert_eq!(report.net_cashflow, 130.0);
    assert_eq!(report.cashflow_volatility, 0.18);
    assert_eq!(report.avg_balance, 82_500.0);
    assert_eq!(report.low_balance_days, 5);

    // Read-after-write: the latest report is the one just created.
    let latest = db.latest_report("M1").unwrap();
    assert_eq!(latest.report_id, report.report_id);
    assert_eq!(latest.monthly_inflow, report.monthly_inflow);
}

#[test]
fn test_repeated_runs_append_history() {
    let db = Database::in_memory().unwrap();
    db.upsert_snapshot(&seeded_snapshot("M1")).unwrap();

    let engine = AnalysisEngine::new(&db);
    let first = engine.run("M1").unwrap();
    let second = engine.run("M1").unwrap();

    assert_ne!(first.report_id, second.report_id);

    // Newest first; exact timestamp ties resolve to the later insertion.
    let history = db.report_history("M1", 10).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].report_id, second.report_id);
    assert_eq!(history[1].report_id, first.report_id);
}

#[test]
fn test_run_without_snapshot_uses_defaults() {
    let db = Database::in_memory().unwrap();

    let engine = AnalysisEngine::new(&db);
    let report = engine.run("M2").unwrap();

    assert!(report.monthly_inflow.is_empty());
    assert!(report.monthly_outflow.is_empty());
    assert_eq!(report.net_cashflow, 0.0);
    assert_eq!(report.cashflow_volatility, 0.12);
    assert_eq!(report.low_balance_days, 2);
    assert_eq!(report.emi_transactions, 8);
    assert_eq!(report.gst_analysis, Some(GstAnalysis::sample()));

    let latest = db.latest_report("M2").unwrap();
    assert_eq!(latest.report_id, report.report_id);
}

#[test]
fn test_run_rejects_empty_msme_id() {
    let db = Database::in_memory().unwrap();
    let engine = AnalysisEngine::new(&db);

    assert!(matches!(engine.run(""), Err(Error::InvalidInput(_))));

    // Nothing was written.
    assert!(db.report_history("", 10).unwrap().is_empty());
}

#[test]
fn test_run_uses_newest_snapshot() {
    let db = Database::in_memory().unwrap();

    let mut stale = seeded_snapshot("M1");
    stale.generated_at = stale.generated_at - chrono::Duration::days(30);
    stale.average_balance = Some(1.0);
    db.upsert_snapshot(&stale).unwrap();

    db.upsert_snapshot(&seeded_snapshot("M1")).unwrap();

    let engine = AnalysisEngine::new(&db);
    let report = engine.run("M1").unwrap();
    assert_eq!(report.avg_balance, 82_500.0);
}
