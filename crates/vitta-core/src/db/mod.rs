//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `snapshots` - Financial-health snapshot store (upstream summaries)
//! - `reports` - Health analysis report store (latest/history/upsert)

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod reports;
mod snapshots;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "VITTA_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path. This allows moving/renaming/restoring the database freely.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Fixed application salt - changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"vitta-salt-v1-00";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    // Derive key using Argon2id
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    // Extract the hash portion for use as SQLCipher key (hex encoded)
    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Timestamp column format. Microsecond precision keeps near-simultaneous
/// reports ordered; the format stays lexicographically sortable.
const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Render a timestamp for the `generated_at` ordering columns
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(SQL_DATETIME_FORMAT).to_string()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `VITTA_DB_KEY` environment variable to be set.
    /// The database will be encrypted using SQLCipher with a key derived
    /// from the passphrase via Argon2.
    ///
    /// Returns an error if `VITTA_DB_KEY` is not set. Use `new_unencrypted()`
    /// for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        let encryption_key = std::env::var(DB_KEY_ENV).ok();
        match encryption_key {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    ///
    /// WARNING: This creates an unencrypted database. Only use for development
    /// or testing. For production, use `new()` with `VITTA_DB_KEY` set.
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Use with_init to set the key on every new connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because SQLCipher
    /// has issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!("/tmp/vitta_test_{}.db", id);

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Check if the database is encrypted
    pub fn is_encrypted(&self) -> Result<bool> {
        let conn = self.conn()?;
        // SQLCipher sets cipher_version if encryption is active
        let result: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(result.is_ok() && std::env::var(DB_KEY_ENV).is_ok())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Record counts for status displays
    pub fn get_store_stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;

        let snapshot_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM financial_health_snapshots",
            [],
            |row| row.get(0),
        )?;
        let report_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM health_analysis_reports",
            [],
            |row| row.get(0),
        )?;
        let msme_count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT msme_id) FROM financial_health_snapshots",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            snapshot_count,
            report_count,
            msme_count,
        })
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Financial-health snapshots (raw upstream summaries)
            -- The full record lives in payload as JSON; the extracted columns
            -- exist for querying and ordering only.
            CREATE TABLE IF NOT EXISTS financial_health_snapshots (
                id INTEGER PRIMARY KEY,
                msme_id TEXT NOT NULL,
                report_id TEXT UNIQUE,              -- optional upstream upsert key
                payload TEXT NOT NULL,              -- full snapshot JSON
                generated_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_snapshots_msme_generated
                ON financial_health_snapshots(msme_id, generated_at DESC);

            -- Health analysis reports (derived, append-only per MSME)
            CREATE TABLE IF NOT EXISTS health_analysis_reports (
                id INTEGER PRIMARY KEY,
                msme_id TEXT NOT NULL,
                report_id TEXT NOT NULL UNIQUE,
                payload TEXT NOT NULL,              -- full report JSON
                generated_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_msme_generated
                ON health_analysis_reports(msme_id, generated_at DESC);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

/// Store record counts
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub snapshot_count: i64,
    pub report_count: i64,
    pub msme_count: i64,
}
