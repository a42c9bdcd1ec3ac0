//! Financial-health snapshot store operations
//!
//! Snapshots are written by the upstream statement processor and read by
//! both the analysis pipeline and the marketplace UI. The engine treats this
//! store as an external collaborator: it only ever reads the newest snapshot
//! and never mutates one.

use rusqlite::params;

use super::{format_datetime, Database};
use crate::error::{Error, Result};
use crate::models::FinancialHealthSnapshot;

impl Database {
    /// Store a snapshot
    ///
    /// When the payload carries a `report_id`, a matching stored snapshot is
    /// updated in place; otherwise a new record is appended.
    pub fn upsert_snapshot(
        &self,
        snapshot: &FinancialHealthSnapshot,
    ) -> Result<FinancialHealthSnapshot> {
        let conn = self.conn()?;
        let payload = serde_json::to_string(snapshot)?;
        let generated_at = format_datetime(&snapshot.generated_at);

        let result = match &snapshot.report_id {
            Some(report_id) => conn.execute(
                r#"
                INSERT INTO financial_health_snapshots (msme_id, report_id, payload, generated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(report_id) DO UPDATE SET
                    msme_id = excluded.msme_id,
                    payload = excluded.payload,
                    generated_at = excluded.generated_at
                "#,
                params![snapshot.msme_id, report_id, payload, generated_at],
            ),
            None => conn.execute(
                r#"
                INSERT INTO financial_health_snapshots (msme_id, payload, generated_at)
                VALUES (?1, ?2, ?3)
                "#,
                params![snapshot.msme_id, payload, generated_at],
            ),
        };

        match result {
            Ok(_) => Ok(snapshot.clone()),
            Err(rusqlite::Error::SqliteFailure(e, msg))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::DuplicateKey(msg.unwrap_or_else(|| {
                    format!("constraint violation storing snapshot for {}", snapshot.msme_id)
                })))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent snapshot for an MSME, if any
    ///
    /// Absence is a normal outcome here (the analysis pipeline falls back to
    /// defaults), so this returns `Option` rather than `NotFound`.
    pub fn latest_snapshot(&self, msme_id: &str) -> Result<Option<FinancialHealthSnapshot>> {
        let conn = self.conn()?;

        let payload: Option<String> = conn
            .query_row(
                r#"
                SELECT payload FROM financial_health_snapshots
                WHERE msme_id = ?1
                ORDER BY generated_at DESC, id DESC
                LIMIT 1
                "#,
                params![msme_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Snapshot history for an MSME, newest first
    ///
    /// The full `metadata` document is omitted from list views; fetch the
    /// latest snapshot for the complete record.
    pub fn snapshot_history(
        &self,
        msme_id: &str,
        limit: i64,
    ) -> Result<Vec<FinancialHealthSnapshot>> {
        let conn = self.conn()?;
        let limit = limit.max(1);

        let mut stmt = conn.prepare(
            r#"
            SELECT payload FROM financial_health_snapshots
            WHERE msme_id = ?1
            ORDER BY generated_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![msme_id, limit], |row| row.get::<_, String>(0))?;

        let mut snapshots = Vec::new();
        for payload in rows {
            let mut snapshot: FinancialHealthSnapshot = serde_json::from_str(&payload?)?;
            snapshot.metadata = None;
            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }
}
