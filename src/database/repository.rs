use sqlx::{sqlite::SqliteRow, FromRow, SqlitePool};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::{FilterData, FilterWhereInfo};

/// Generic filtered reads over one table.
pub struct Repository<T> {
    table_name: String,
    pool: SqlitePool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, pool: SqlitePool) -> Self {
        Self {
            table_name: table_name.into(),
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_all(&self.pool)
            .await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_optional(&self.pool)
            .await
    }

    /// Single row matching every `column = value` pair.
    pub async fn select_where(&self, conditions: Vec<FilterWhereInfo>) -> Result<Option<T>, DatabaseError> {
        self.select_one(FilterData {
            where_clause: conditions,
            limit: Some(1),
            ..Default::default()
        })
        .await
    }
}
