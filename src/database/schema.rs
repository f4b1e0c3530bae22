use sqlx::SqlitePool;
use tracing::info;

use super::manager::DatabaseError;

const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        hashed_password TEXT NOT NULL,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        media_type TEXT NOT NULL CHECK (media_type IN ('image', 'video')),
        media_path TEXT NOT NULL,
        thumbnail_path TEXT,
        description TEXT NOT NULL,
        behavior_rating INTEGER NOT NULL CHECK (behavior_rating BETWEEN 1 AND 5),
        severity_index INTEGER NOT NULL CHECK (severity_index BETWEEN 0 AND 100),
        latitude REAL,
        longitude REAL,
        device_info TEXT,
        camera_used TEXT,
        created_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    "CREATE INDEX IF NOT EXISTS idx_reports_user_id ON reports(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at)",
];

/// Create tables and indexes when absent. Safe to run on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Database schema ready");
    Ok(())
}
