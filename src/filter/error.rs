use thiserror::Error;

/// Rejected filter input. Raised before any SQL reaches the database.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
}
