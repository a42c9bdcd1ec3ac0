//! Financial-health snapshot commands

use std::path::Path;

use anyhow::{Context, Result};
use vitta_core::db::Database;
use vitta_core::models::FinancialHealthSnapshot;

pub fn cmd_snapshot_import(db: &Database, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let snapshot: FinancialHealthSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid snapshot JSON in {}", file.display()))?;

    if snapshot.msme_id.trim().is_empty() {
        anyhow::bail!("Snapshot payload is missing msme_id");
    }

    let stored = db.upsert_snapshot(&snapshot)?;

    println!("✅ Snapshot stored for {}", stored.msme_id);
    if let Some(report_id) = &stored.report_id {
        println!("   Key: {}", report_id);
    }

    Ok(())
}

pub fn cmd_snapshot_show(db: &Database, msme_id: &str) -> Result<()> {
    let snapshot = db
        .latest_snapshot(msme_id)?
        .with_context(|| format!("No financial health data found for MSME: {}", msme_id))?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

pub fn cmd_snapshot_history(db: &Database, msme_id: &str, limit: i64) -> Result<()> {
    let history = db.snapshot_history(msme_id, limit)?;

    println!();
    println!("🗂  Snapshot History: {}", msme_id);
    println!("   ─────────────────────────────────────────────────────────────");

    if history.is_empty() {
        println!("   No snapshots found for this MSME.");
        return Ok(());
    }

    println!(
        "   {:24} │ {:>14} │ {:20}",
        "Key", "Avg Balance", "Generated"
    );
    println!("   ─────────────────────────┼────────────────┼─────────────────────");

    for snapshot in &history {
        println!(
            "   {:24} │ {:>14} │ {:20}",
            super::truncate(snapshot.report_id.as_deref().unwrap_or("-"), 24),
            snapshot
                .average_balance
                .map(|b| format!("{:.2}", b))
                .unwrap_or_else(|| "-".to_string()),
            snapshot.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    println!();
    Ok(())
}
