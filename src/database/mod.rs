pub mod manager;
pub mod models;
pub mod query_builder;
pub mod reports;
pub mod repository;
pub mod schema;
pub mod users;

pub use manager::{connect, health_check, DatabaseError};
pub use reports::ReportRepository;
pub use repository::Repository;
pub use schema::ensure_schema;
pub use users::UserRepository;
