use chrono::Utc;
use sqlx::SqlitePool;

use super::manager::DatabaseError;
use super::models::{NewReport, Report};
use super::repository::Repository;
use crate::filter::types::format_timestamp;
use crate::filter::FilterWhereInfo;
use crate::reports::ReportQuery;

pub struct ReportRepository {
    reports: Repository<Report>,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { reports: Repository::new("reports", pool) }
    }

    /// Stamps `created_at` from the process clock. Creation order and `created_at`
    /// order agree only while that clock never steps backwards.
    pub async fn insert(&self, report: NewReport) -> Result<Report, DatabaseError> {
        let row = sqlx::query_as::<_, Report>(
            r#"INSERT INTO reports (
                user_id, media_type, media_path, thumbnail_path, description,
                behavior_rating, severity_index, latitude, longitude,
                device_info, camera_used, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            RETURNING *"#,
        )
        .bind(report.user_id)
        .bind(report.media_type)
        .bind(report.media_path)
        .bind(report.thumbnail_path)
        .bind(report.description)
        .bind(report.behavior_rating)
        .bind(report.severity_index)
        .bind(report.latitude)
        .bind(report.longitude)
        .bind(report.device_info)
        .bind(report.camera_used)
        .bind(format_timestamp(&Utc::now()))
        .fetch_one(self.reports.pool())
        .await?;
        Ok(row)
    }

    /// Reports owned by `owner_id`, filtered, ordered and paginated per `query`.
    pub async fn list(&self, owner_id: i64, query: &ReportQuery) -> Result<Vec<Report>, DatabaseError> {
        self.reports.select_any(query.to_filter(owner_id)).await
    }

    /// A report exists for the caller only if they own it.
    pub async fn find_owned(&self, owner_id: i64, id: i64) -> Result<Report, DatabaseError> {
        self.reports
            .select_where(vec![
                FilterWhereInfo::eq("id", id),
                FilterWhereInfo::eq("user_id", owner_id),
            ])
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Report not found".to_string()))
    }

    /// Delete an owned report row and return it, so the caller can clean up its files.
    pub async fn delete_owned(&self, owner_id: i64, id: i64) -> Result<Report, DatabaseError> {
        let report = self.find_owned(owner_id, id).await?;
        let result = sqlx::query("DELETE FROM reports WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(owner_id)
            .execute(self.reports.pool())
            .await?;
        // Lost a race with a concurrent delete
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Report not found".to_string()));
        }
        Ok(report)
    }
}
