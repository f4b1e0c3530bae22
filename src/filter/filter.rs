use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, FilterWhereInfo, SqlResult};

/// `SELECT *` builder over a single table.
pub struct Filter {
    table_name: String,
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name).map_err(FilterError::InvalidTableName)?;
        Ok(Self {
            table_name,
            where_data: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        self.where_clause(data.where_clause)?;
        self.order(data.order)?;
        if let Some(limit) = data.limit { self.limit(limit, data.offset)?; }
        else if let Some(offset) = data.offset { self.offset(offset)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Vec<FilterWhereInfo>) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = conditions;
        Ok(self)
    }

    pub fn order(&mut self, order: Vec<FilterOrderInfo>) -> Result<&mut Self, FilterError> {
        FilterOrder::validate(&order)?;
        self.order_data = order;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        if let Some(off) = offset { self.offset(off)?; }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn offset(&mut self, offset: i64) -> Result<&mut Self, FilterError> {
        if offset < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); }
        self.offset = Some(offset);
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
            (None, Some(o)) => format!("LIMIT -1 OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`; returns the offending name otherwise.
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if valid { Ok(()) } else { Err(format!("Invalid identifier format: '{}'", name)) }
}
