//! Domain models for Vitta

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point-in-time financial-health summary for an MSME, produced upstream
/// by bank-statement analysis.
///
/// Everything beyond `msme_id` is optional: borrowers frequently have
/// incomplete statement processing, and the analysis pipeline substitutes
/// documented defaults rather than rejecting sparse snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialHealthSnapshot {
    pub msme_id: String,
    /// Upstream record key. When present, re-submitting the same key updates
    /// the stored snapshot in place instead of appending a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_cashflow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<DateTime<Utc>>,
    /// Fallback location for the monthly breakdown when the statement
    /// processor emits it at the top level rather than inside `metadata`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_breakdown: Option<Value>,
    /// Free-form analysis document from the statement processor. Known keys:
    /// `pattern_analysis.monthly_breakdown`, `cashflow_volatility`,
    /// `low_balance_days`, `emi_transactions`, `cheque_bounces`,
    /// `overdraft_days`. Object key order is preserved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_analysis: Option<GstAnalysis>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl FinancialHealthSnapshot {
    /// A snapshot with only the MSME identifier set.
    pub fn new(msme_id: &str) -> Self {
        Self {
            msme_id: msme_id.to_string(),
            report_id: None,
            net_cashflow: None,
            average_balance: None,
            volatility_score: None,
            period_start: None,
            period_end: None,
            monthly_breakdown: None,
            metadata: None,
            gst_analysis: None,
            generated_at: Utc::now(),
        }
    }

    /// Walk a key path into the free-form metadata document.
    pub fn metadata_path(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self.metadata.as_ref()?;
        for key in path {
            current = current.get(key)?;
        }
        Some(current)
    }

    /// Numeric metadata lookup; non-numeric values read as absent.
    pub fn metadata_f64(&self, path: &[&str]) -> Option<f64> {
        self.metadata_path(path).and_then(Value::as_f64)
    }

    /// Integer metadata lookup. Counts sometimes arrive as JSON floats, so
    /// whole-number floats are accepted too.
    pub fn metadata_i64(&self, path: &[&str]) -> Option<i64> {
        let value = self.metadata_path(path)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
    }
}

/// GST filing compliance summary for an MSME.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstAnalysis {
    pub total_filings: i64,
    pub filed_count: i64,
    pub pending_count: i64,
    pub nil_returns: i64,
    pub avg_monthly_sales: f64,
    pub avg_monthly_purchases: f64,
    pub avg_monthly_tax_paid: f64,
    /// Percentage, 0-100
    pub compliance_rate: f64,
    pub total_sales: f64,
    pub total_purchases: f64,
    pub total_net_tax_paid: f64,
    /// Fraction, 0-1
    pub b2b_sales_ratio: f64,
}

impl GstAnalysis {
    /// Placeholder compliance block substituted when a borrower has no real
    /// GST filing data. Values are fixed and documented; they stand in for
    /// a fully compliant filer until statement processing catches up.
    pub fn sample() -> Self {
        Self {
            total_filings: 12,
            filed_count: 12,
            pending_count: 0,
            nil_returns: 0,
            avg_monthly_sales: 481_875.0,
            avg_monthly_purchases: 240_937.5,
            avg_monthly_tax_paid: 43_368.75,
            compliance_rate: 100.0,
            total_sales: 5_782_500.0,
            total_purchases: 2_891_250.0,
            total_net_tax_paid: 520_425.0,
            b2b_sales_ratio: 0.79,
        }
    }
}

/// A derived health analysis record for an MSME. Immutable once stored,
/// except for the documented upsert-by-`report_id` path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAnalysisReport {
    pub msme_id: String,
    /// Globally unique: `HA-{msme_id}-{millis}-{suffix}`.
    pub report_id: String,
    /// Month (`YYYY-MM`) to total credits. Key order follows the source
    /// breakdown and always matches `monthly_outflow`.
    pub monthly_inflow: IndexMap<String, f64>,
    /// Month (`YYYY-MM`) to total debits.
    pub monthly_outflow: IndexMap<String, f64>,
    pub net_cashflow: f64,
    /// Fraction, conceptually 0-1
    pub cashflow_volatility: f64,
    pub avg_balance: f64,
    pub low_balance_days: i64,
    pub emi_transactions: i64,
    pub cheque_bounces: i64,
    pub overdraft_days: i64,
    /// Always populated by a run: the snapshot's block, or the sample block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_analysis: Option<GstAnalysis>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}
