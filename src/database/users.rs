use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::manager::DatabaseError;
use super::models::User;
use super::repository::Repository;
use crate::auth::UserDirectory;
use crate::filter::types::format_timestamp;
use crate::filter::FilterWhereInfo;

pub struct UserRepository {
    users: Repository<User>,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { users: Repository::new("users", pool) }
    }

    /// Insert a user. A taken email is reported as [`DatabaseError::Conflict`].
    pub async fn create(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, hashed_password, created_at) VALUES (?1, ?2, ?3) RETURNING *",
        )
        .bind(email)
        .bind(hashed_password)
        .bind(format_timestamp(&Utc::now()))
        .fetch_one(self.users.pool())
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) => {
                let err = DatabaseError::from(e);
                if err.is_unique_violation() {
                    Err(DatabaseError::Conflict("Email already registered".to_string()))
                } else {
                    Err(err)
                }
            }
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.users.select_where(vec![FilterWhereInfo::eq("email", email)]).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        self.users.select_where(vec![FilterWhereInfo::eq("id", id)]).await
    }

    /// Remove a user; owned reports go with it through the foreign-key cascade.
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(self.users.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        UserRepository::find_by_email(self, email).await
    }
}
