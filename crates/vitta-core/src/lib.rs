//! Vitta Core Library
//!
//! Shared functionality for the Vitta MSME lending marketplace:
//! - Database access and migrations
//! - Financial-health snapshot store (bank-statement-derived summaries)
//! - Health analysis derivation pipeline and report store

pub mod analysis;
pub mod db;
pub mod error;
pub mod models;

pub use analysis::{build_monthly_series, compute_report, AnalysisEngine, MonthlySeries};
pub use db::Database;
pub use error::{Error, Result};
pub use models::{FinancialHealthSnapshot, GstAnalysis, HealthAnalysisReport};
