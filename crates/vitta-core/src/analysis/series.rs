//! Monthly series normalization
//!
//! Statement processors emit monthly breakdowns in more than one shape; this
//! module flattens whatever arrived into two aligned month -> amount maps.

use indexmap::IndexMap;
use serde_json::Value;

use crate::models::FinancialHealthSnapshot;

/// Aligned monthly credit/debit totals, keyed by `YYYY-MM`
///
/// Both maps always carry the same keys in the same order. Order follows the
/// source breakdown's own iteration order; months are deliberately not
/// re-sorted, since downstream consumers slice keys by substring assuming
/// the source's `YYYY-MM` sequencing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MonthlySeries {
    pub inflow: IndexMap<String, f64>,
    pub outflow: IndexMap<String, f64>,
}

/// Locate the monthly breakdown object within a snapshot
///
/// Lookup order, first match wins:
/// 1. `metadata.pattern_analysis.monthly_breakdown`
/// 2. the top-level `monthly_breakdown` field
fn breakdown_source(snapshot: &FinancialHealthSnapshot) -> Option<&Value> {
    snapshot
        .metadata_path(&["pattern_analysis", "monthly_breakdown"])
        .or(snapshot.monthly_breakdown.as_ref())
}

/// Normalize a snapshot's monthly breakdown into aligned inflow/outflow maps
///
/// Pure and total: an absent snapshot, a missing breakdown, or a malformed
/// entry degrades to empty maps or zero values, never an error. Each month's
/// `credits` lands in the inflow map and `debits` in the outflow map under
/// the same key; values are floored at zero.
pub fn build_monthly_series(snapshot: Option<&FinancialHealthSnapshot>) -> MonthlySeries {
    let mut series = MonthlySeries::default();

    let Some(snapshot) = snapshot else {
        return series;
    };
    let Some(breakdown) = breakdown_source(snapshot).and_then(Value::as_object) else {
        return series;
    };

    for (month, entry) in breakdown {
        let credits = entry
            .get("credits")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            .max(0.0);
        let debits = entry
            .get("debits")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            .max(0.0);

        series.inflow.insert(month.clone(), credits);
        series.outflow.insert(month.clone(), debits);
    }

    series
}
