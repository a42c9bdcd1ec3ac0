//! API route handlers
//!
//! Organized by domain:
//! - `financial_health` - Snapshot read/upsert (upstream statement summaries)
//! - `health_analysis` - Report run/latest/history

mod financial_health;
mod health_analysis;

pub use financial_health::*;
pub use health_analysis::*;
