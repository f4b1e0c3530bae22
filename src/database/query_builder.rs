use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{self, FromRow, Sqlite, SqlitePool};

use crate::database::manager::DatabaseError;
use crate::filter::types::{format_timestamp, FilterValue, SqlResult};
use crate::filter::{Filter, FilterData};

pub struct QueryBuilder<T> {
    table_name: String,
    filter: Option<Filter>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = table_name.into();
        // Reuse Filter table name validation
        Filter::new(&name).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(Self {
            table_name: name,
            filter: None,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        let mut filter = Filter::new(&self.table_name).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter
            .assign(filter_data)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        self.filter = Some(filter);
        Ok(self)
    }

    pub async fn select_all(self, pool: &SqlitePool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.sql_result()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn select_optional(self, pool: &SqlitePool) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.sql_result()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(pool).await?;
        Ok(row)
    }

    fn sql_result(&self) -> Result<SqlResult, DatabaseError> {
        if let Some(filter) = &self.filter {
            filter
                .to_sql()
                .map_err(|e| DatabaseError::QueryError(e.to_string()))
        } else {
            Ok(SqlResult { query: format!("SELECT * FROM \"{}\"", self.table_name), params: vec![] })
        }
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    v: &FilterValue,
) -> sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> FromRow<'r, SqliteRow>,
{
    match v {
        FilterValue::Integer(i) => q.bind(*i),
        FilterValue::Text(s) => q.bind(s.clone()),
        // Stored as fixed-width text, so compare as text
        FilterValue::Timestamp(ts) => q.bind(format_timestamp(ts)),
    }
}
