//! Health analysis derivation pipeline
//!
//! Turns a raw financial-health snapshot into a normalized
//! `HealthAnalysisReport`:
//! - `series` - monthly inflow/outflow normalization
//! - `engine` - report computation, defaulting rules, and the run
//!   orchestration (read snapshot, derive, persist)

pub mod engine;
pub mod series;

pub use engine::{compute_report, AnalysisEngine};
pub use series::{build_monthly_series, MonthlySeries};
