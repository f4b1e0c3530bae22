use chrono::{DateTime, Utc};

/// Storage format for timestamps. Fixed width, so text comparison follows time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Integer(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(v)
    }
}

/// One comparison against a single bound value; a filter's conditions are joined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub value: FilterValue,
}

impl FilterWhereInfo {
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::single(column, FilterOp::Eq, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::single(column, FilterOp::Gte, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::single(column, FilterOp::Lte, value)
    }

    fn single(column: impl Into<String>, operator: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

impl FilterOrderInfo {
    pub fn new(column: impl Into<String>, sort: SortDirection) -> Self {
        Self { column: column.into(), sort }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterData {
    pub where_clause: Vec<FilterWhereInfo>,
    pub order: Vec<FilterOrderInfo>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterValue>,
}
