//! Health analysis computation and run orchestration

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{FinancialHealthSnapshot, GstAnalysis, HealthAnalysisReport};

use super::series::{build_monthly_series, MonthlySeries};

/// Volatility fraction assumed when the snapshot carries none
pub const DEFAULT_CASHFLOW_VOLATILITY: f64 = 0.12;

/// Low-balance day count assumed when the snapshot carries none
pub const DEFAULT_LOW_BALANCE_DAYS: i64 = 2;

/// EMI transaction count assumed when the snapshot carries none
pub const DEFAULT_EMI_TRANSACTIONS: i64 = 8;

/// Report identifier prefix
const REPORT_ID_PREFIX: &str = "HA";

/// Mint a report identifier: `HA-{msme_id}-{millis}-{suffix}`
///
/// The random suffix keeps ids unique even when two runs for the same MSME
/// land on the same millisecond.
fn mint_report_id(msme_id: &str, generated_at: &DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}-{}",
        REPORT_ID_PREFIX,
        msme_id,
        generated_at.timestamp_millis(),
        &suffix[..8]
    )
}

/// Index-aligned sum of monthly inflow minus outflow
///
/// Pairs by position, matching the historical computation. The series
/// builder emits both maps in one pass over a single breakdown, so their key
/// sequences are identical and positional pairing cannot diverge from
/// key pairing here.
fn positional_net_cashflow(series: &MonthlySeries) -> f64 {
    let outflow: Vec<f64> = series.outflow.values().copied().collect();
    series
        .inflow
        .values()
        .enumerate()
        .map(|(idx, inflow)| inflow - outflow.get(idx).copied().unwrap_or(0.0))
        .sum()
}

/// Derive a health analysis report from an MSME's latest snapshot
///
/// Pure apart from timestamp/id generation; persisting the result is the
/// caller's job. Missing optional data degrades to documented defaults:
/// borrowers routinely have incomplete statement processing, and a sparse
/// report is more useful than no report. Fails only when `msme_id` is empty.
///
/// Fallback orders:
/// - `net_cashflow`: snapshot value verbatim (zero included), else the
///   positional sum over the derived series
/// - `cashflow_volatility`: `metadata.cashflow_volatility`, then
///   `volatility_score`, then [`DEFAULT_CASHFLOW_VOLATILITY`]
/// - counters: the matching `metadata` field, then their documented default
/// - `gst_analysis`: snapshot block verbatim, else [`GstAnalysis::sample`]
/// - period bounds: snapshot values, else generation time for both
pub fn compute_report(
    msme_id: &str,
    snapshot: Option<&FinancialHealthSnapshot>,
) -> Result<HealthAnalysisReport> {
    let msme_id = msme_id.trim();
    if msme_id.is_empty() {
        return Err(Error::InvalidInput("msme_id is required".to_string()));
    }

    let now = Utc::now();
    let series = build_monthly_series(snapshot);

    let net_cashflow = snapshot
        .and_then(|s| s.net_cashflow)
        .unwrap_or_else(|| positional_net_cashflow(&series));

    let cashflow_volatility = snapshot
        .and_then(|s| {
            s.metadata_f64(&["cashflow_volatility"])
                .or(s.volatility_score)
        })
        .unwrap_or(DEFAULT_CASHFLOW_VOLATILITY);

    let gst_analysis = snapshot
        .and_then(|s| s.gst_analysis.clone())
        .unwrap_or_else(GstAnalysis::sample);

    Ok(HealthAnalysisReport {
        msme_id: msme_id.to_string(),
        report_id: mint_report_id(msme_id, &now),
        monthly_inflow: series.inflow,
        monthly_outflow: series.outflow,
        net_cashflow,
        cashflow_volatility,
        avg_balance: snapshot.and_then(|s| s.average_balance).unwrap_or(0.0),
        low_balance_days: snapshot
            .and_then(|s| s.metadata_i64(&["low_balance_days"]))
            .unwrap_or(DEFAULT_LOW_BALANCE_DAYS),
        emi_transactions: snapshot
            .and_then(|s| s.metadata_i64(&["emi_transactions"]))
            .unwrap_or(DEFAULT_EMI_TRANSACTIONS),
        cheque_bounces: snapshot
            .and_then(|s| s.metadata_i64(&["cheque_bounces"]))
            .unwrap_or(0),
        overdraft_days: snapshot
            .and_then(|s| s.metadata_i64(&["overdraft_days"]))
            .unwrap_or(0),
        gst_analysis: Some(gst_analysis),
        period_start: snapshot.and_then(|s| s.period_start).unwrap_or(now),
        period_end: snapshot.and_then(|s| s.period_end).unwrap_or(now),
        generated_at: now,
    })
}

/// Runs the health analysis pipeline against the store
///
/// Each run is single-shot and request-scoped: read the newest snapshot,
/// derive one report, write one record. Concurrent runs for the same MSME
/// mint distinct report ids and append independently; the history simply
/// shows two near-simultaneous reports.
pub struct AnalysisEngine<'a> {
    db: &'a Database,
}

impl<'a> AnalysisEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Run one analysis for an MSME and persist the resulting report
    ///
    /// The write is a single insert, so a failed run never leaves a partial
    /// report behind. Store faults propagate unmodified - a visible failure
    /// beats a run that silently dropped data.
    pub fn run(&self, msme_id: &str) -> Result<HealthAnalysisReport> {
        let msme_id = msme_id.trim();
        if msme_id.is_empty() {
            return Err(Error::InvalidInput("msme_id is required".to_string()));
        }

        let snapshot = self.db.latest_snapshot(msme_id)?;
        if snapshot.is_none() {
            debug!(msme_id, "no financial-health snapshot; deriving report from defaults");
        }

        let report = compute_report(msme_id, snapshot.as_ref())?;
        let stored = self.db.insert_report(&report)?;

        info!(msme_id, report_id = %stored.report_id, "health analysis completed");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_with_breakdown() -> FinancialHealthSnapshot {
        let mut snapshot = FinancialHealthSnapshot::new("M1");
        snapshot.metadata = Some(json!({
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
    fn test_computed_net_cashflow_from_series() {
        let snapshot = snapshot_with_breakdown();
        let report = compute_report("M1", Some(&snapshot)).unwrap();

        assert_eq!(report.monthly_inflow.get("2025-01"), Some(&100.0));
        assert_eq!(report.monthly_inflow.get("2025-02"), Some(&120.0));
        assert_eq!(report.monthly_outflow.get("2025-01"), Some(&40.0));
        assert_eq!(report.monthly_outflow.get("2025-02"), Some(&50.0));
        // (100 - 40) + (120 - 50)
        assert_eq!(report.net_cashflow, 130.0);
    }

    #[test]
    fn test_declared_net_cashflow_used_verbatim() {
        let mut snapshot = snapshot_with_breakdown();
        snapshot.net_cashflow = Some(999.0);

        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.net_cashflow, 999.0);
    }

    #[test]
    fn test_declared_zero_net_cashflow_is_not_recomputed() {
        // Zero is a valid explicit value, distinct from absent.
        let mut snapshot = snapshot_with_breakdown();
        snapshot.net_cashflow = Some(0.0);

        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.net_cashflow, 0.0);
    }

    #[test]
    fn test_absent_snapshot_yields_documented_defaults() {
        let report = compute_report("M2", None).unwrap();

        assert!(report.monthly_inflow.is_empty());
        assert!(report.monthly_outflow.is_empty());
        assert_eq!(report.net_cashflow, 0.0);
        assert_eq!(report.cashflow_volatility, DEFAULT_CASHFLOW_VOLATILITY);
        assert_eq!(report.avg_balance, 0.0);
        assert_eq!(report.low_balance_days, DEFAULT_LOW_BALANCE_DAYS);
        assert_eq!(report.emi_transactions, DEFAULT_EMI_TRANSACTIONS);
        assert_eq!(report.cheque_bounces, 0);
        assert_eq!(report.overdraft_days, 0);
        assert_eq!(report.gst_analysis, Some(GstAnalysis::sample()));
        // Snapshot-less analysis reports a zero-width period at "now".
        assert_eq!(report.period_start, report.period_end);
        assert_eq!(report.period_start, report.generated_at);
    }

    #[test]
    fn test_empty_msme_id_is_rejected() {
        assert!(matches!(
            compute_report("", None),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            compute_report("   ", None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_volatility_fallback_order() {
        // metadata.cashflow_volatility wins over volatility_score
        let mut snapshot = FinancialHealthSnapshot::new("M1");
        snapshot.volatility_score = Some(0.5);
        snapshot.metadata = Some(json!({ "cashflow_volatility": 0.25 }));
        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.cashflow_volatility, 0.25);

        // volatility_score when metadata has no figure
        snapshot.metadata = None;
        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.cashflow_volatility, 0.5);

        // documented default when neither exists
        snapshot.volatility_score = None;
        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.cashflow_volatility, DEFAULT_CASHFLOW_VOLATILITY);
    }

    #[test]
    fn test_explicit_zero_volatility_survives() {
        let mut snapshot = FinancialHealthSnapshot::new("M1");
        snapshot.volatility_score = Some(0.9);
        snapshot.metadata = Some(json!({ "cashflow_volatility": 0.0 }));

        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.cashflow_volatility, 0.0);
    }

    #[test]
    fn test_metadata_counters_are_copied() {
        let mut snapshot = FinancialHealthSnapshot::new("M1");
        snapshot.average_balance = Some(54_000.0);
        snapshot.metadata = Some(json!({
            "low_balance_days": 6,
            "emi_transactions": 3,
            "cheque_bounces": 1,
            "overdraft_days": 4
        }));

        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.avg_balance, 54_000.0);
        assert_eq!(report.low_balance_days, 6);
        assert_eq!(report.emi_transactions, 3);
        assert_eq!(report.cheque_bounces, 1);
        assert_eq!(report.overdraft_days, 4);
    }

    #[test]
    fn test_snapshot_gst_block_used_verbatim() {
        let mut gst = GstAnalysis::sample();
        gst.filed_count = 9;
        gst.pending_count = 3;
        gst.compliance_rate = 75.0;

        let mut snapshot = FinancialHealthSnapshot::new("M1");
        snapshot.gst_analysis = Some(gst.clone());

        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.gst_analysis, Some(gst));
    }

    #[test]
    fn test_period_bounds_copied_from_snapshot() {
        let start = "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let end = "2025-06-30T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let mut snapshot = FinancialHealthSnapshot::new("M1");
        snapshot.period_start = Some(start);
        snapshot.period_end = Some(end);

        let report = compute_report("M1", Some(&snapshot)).unwrap();
        assert_eq!(report.period_start, start);
        assert_eq!(report.period_end, end);
    }

    #[test]
    fn test_report_id_shape_and_uniqueness() {
        let first = compute_report("M1", None).unwrap();
        let second = compute_report("M1", None).unwrap();

        assert!(first.report_id.starts_with("HA-M1-"));
        assert_ne!(first.report_id, second.report_id);
    }

    #[test]
    fn test_msme_id_is_trimmed() {
        let report = compute_report("  M1  ", None).unwrap();
        assert_eq!(report.msme_id, "M1");
        assert!(report.report_id.starts_with("HA-M1-"));
    }
}
