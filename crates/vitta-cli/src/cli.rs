//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vitta - MSME lending marketplace backend
#[derive(Parser)]
#[command(name = "vitta")]
#[command(about = "Financial health analysis for MSME borrowers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "vitta.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set VITTA_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Run a health analysis for an MSME
    Run {
        /// MSME identifier
        msme_id: String,
    },

    /// Show health analysis reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Manage financial-health snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Show database status (encryption, record counts)
    Status,
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Show the most recent report for an MSME
    Latest {
        /// MSME identifier
        msme_id: String,

        /// Print the raw report JSON instead of the summary table
        #[arg(long)]
        json: bool,
    },

    /// Show report history for an MSME, newest first
    History {
        /// MSME identifier
        msme_id: String,

        /// Number of reports to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// Import a snapshot from a JSON file (updates in place when the payload
    /// carries a report_id that already exists)
    Import {
        /// JSON file containing the snapshot payload
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the most recent snapshot for an MSME
    Show {
        /// MSME identifier
        msme_id: String,
    },

    /// Show snapshot history for an MSME, newest first
    History {
        /// MSME identifier
        msme_id: String,

        /// Number of snapshots to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}
