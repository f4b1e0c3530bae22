use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub media_type: String,
    pub media_path: String,
    pub thumbnail_path: Option<String>,
    pub description: String,
    pub behavior_rating: i64,
    pub severity_index: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub device_info: Option<String>,
    pub camera_used: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Column values for an insert; `id` and `created_at` are assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: i64,
    pub media_type: String,
    pub media_path: String,
    pub thumbnail_path: Option<String>,
    pub description: String,
    pub behavior_rating: i64,
    pub severity_index: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub device_info: Option<String>,
    pub camera_used: Option<String>,
}
