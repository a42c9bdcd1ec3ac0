//! Analysis run and report display commands

use anyhow::Result;
use vitta_core::analysis::AnalysisEngine;
use vitta_core::db::Database;
use vitta_core::models::HealthAnalysisReport;

pub fn cmd_run(db: &Database, msme_id: &str) -> Result<()> {
    let engine = AnalysisEngine::new(db);
    let report = engine.run(msme_id)?;

    println!("✅ Health analysis completed for {}", report.msme_id);
    println!();
    print_report(&report);

    Ok(())
}

pub fn cmd_report_latest(db: &Database, msme_id: &str, as_json: bool) -> Result<()> {
    let report = db.latest_report(msme_id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

pub fn cmd_report_history(db: &Database, msme_id: &str, limit: i64) -> Result<()> {
    let history = db.report_history(msme_id, limit)?;

    println!();
    println!("📈 Health Analysis History: {}", msme_id);
    println!("   ─────────────────────────────────────────────────────────────");

    if history.is_empty() {
        println!("   No reports found for this MSME.");
        return Ok(());
    }

    println!(
        "   {:32} │ {:>12} │ {:>6} │ {:20}",
        "Report", "Net Flow", "Vol.", "Generated"
    );
    println!("   ─────────────────────────────────┼──────────────┼────────┼─────────────────────");

    for report in &history {
        println!(
            "   {:32} │ {:>12.2} │ {:>6.2} │ {:20}",
            super::truncate(&report.report_id, 32),
            report.net_cashflow,
            report.cashflow_volatility,
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    println!();
    Ok(())
}

/// Print a single report as a summary table
fn print_report(report: &HealthAnalysisReport) {
    println!("📊 Health Analysis Report");
    println!("   Report: {}", report.report_id);
    println!(
        "   Period: {} to {}",
        report.period_start.format("%Y-%m-%d"),
        report.period_end.format("%Y-%m-%d")
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Net cashflow: {:.2}", report.net_cashflow);
    println!("   Cashflow volatility: {:.2}", report.cashflow_volatility);
    println!("   Average balance: {:.2}", report.avg_balance);
    println!("   Low balance days: {}", report.low_balance_days);
    println!("   EMI transactions: {}", report.emi_transactions);
    println!("   Cheque bounces: {}", report.cheque_bounces);
    println!("   Overdraft days: {}", report.overdraft_days);

    if !report.monthly_inflow.is_empty() {
        println!();
        println!("   {:10} │ {:>12} │ {:>12}", "Month", "Inflow", "Outflow");
        println!("   ───────────┼──────────────┼─────────────");
        for (month, inflow) in &report.monthly_inflow {
            let outflow = report.monthly_outflow.get(month).copied().unwrap_or(0.0);
            println!("   {:10} │ {:>12.2} │ {:>12.2}", month, inflow, outflow);
        }
    }

    if let Some(gst) = &report.gst_analysis {
        println!();
        println!(
            "   GST: {}/{} filings, {:.0}% compliant, B2B ratio {:.2}",
            gst.filed_count, gst.total_filings, gst.compliance_rate, gst.b2b_sales_ratio
        );
    }

    println!();
}
