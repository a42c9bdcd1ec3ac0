//! Vitta CLI - MSME financial health analysis
//!
//! Usage:
//!   vitta init                      Initialize database
//!   vitta run MSME-001              Run a health analysis
//!   vitta report latest MSME-001    Show the newest report
//!   vitta serve --port 3000         Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, static_dir.as_deref()).await,
        Commands::Run { msme_id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_run(&db, &msme_id)
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match report_type {
                ReportType::Latest { msme_id, json } => {
                    commands::cmd_report_latest(&db, &msme_id, json)
                }
                ReportType::History { msme_id, limit } => {
                    commands::cmd_report_history(&db, &msme_id, limit)
                }
            }
        }
        Commands::Snapshot { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                SnapshotAction::Import { file } => commands::cmd_snapshot_import(&db, &file),
                SnapshotAction::Show { msme_id } => commands::cmd_snapshot_show(&db, &msme_id),
                SnapshotAction::History { msme_id, limit } => {
                    commands::cmd_snapshot_history(&db, &msme_id, limit)
                }
            }
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
    }
}
