//! Health analysis report store operations

use rusqlite::params;

use super::{format_datetime, Database};
use crate::error::{Error, Result};
use crate::models::HealthAnalysisReport;

impl Database {
    /// Persist a report, upserting on `report_id`
    ///
    /// A colliding `report_id` replaces the stored fields in place
    /// (last-write-wins); it is not an error and does not create a new
    /// version. Any other uniqueness violation from the storage layer
    /// surfaces as `DuplicateKey`.
    pub fn insert_report(&self, report: &HealthAnalysisReport) -> Result<HealthAnalysisReport> {
        let conn = self.conn()?;
        let payload = serde_json::to_string(report)?;

        let result = conn.execute(
            r#"
            INSERT INTO health_analysis_reports (msme_id, report_id, payload, generated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(report_id) DO UPDATE SET
                msme_id = excluded.msme_id,
                payload = excluded.payload,
                generated_at = excluded.generated_at
            "#,
            params![
                report.msme_id,
                report.report_id,
                payload,
                format_datetime(&report.generated_at)
            ],
        );

        match result {
            Ok(_) => Ok(report.clone()),
            Err(rusqlite::Error::SqliteFailure(e, msg))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::DuplicateKey(msg.unwrap_or_else(|| {
                    format!("constraint violation storing report {}", report.report_id)
                })))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent report for an MSME
    ///
    /// "Most recent" is the maximum `generated_at`; exact ties resolve to the
    /// later insertion. Returns the payload fields only - storage row ids
    /// never leave this layer.
    pub fn latest_report(&self, msme_id: &str) -> Result<HealthAnalysisReport> {
        let conn = self.conn()?;

        let payload: String = conn
            .query_row(
                r#"
                SELECT payload FROM health_analysis_reports
                WHERE msme_id = ?1
                ORDER BY generated_at DESC, id DESC
                LIMIT 1
                "#,
                params![msme_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::NotFound(format!("No health analysis found for MSME: {}", msme_id))
                }
                other => other.into(),
            })?;

        Ok(serde_json::from_str(&payload)?)
    }

    /// Report history for an MSME, newest first
    ///
    /// `limit` is floored at 1; an MSME with stored reports never gets an
    /// empty page because a caller passed zero. No reports is an empty list,
    /// not an error.
    pub fn report_history(&self, msme_id: &str, limit: i64) -> Result<Vec<HealthAnalysisReport>> {
        let conn = self.conn()?;
        let limit = limit.max(1);

        let mut stmt = conn.prepare(
            r#"
            SELECT payload FROM health_analysis_reports
            WHERE msme_id = ?1
            ORDER BY generated_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![msme_id, limit], |row| row.get::<_, String>(0))?;

        let mut reports = Vec::new();
        for payload in rows {
            reports.push(serde_json::from_str(&payload?)?);
        }

        Ok(reports)
    }
}
