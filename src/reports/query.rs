use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::ValidationError;
use crate::filter::{FilterData, FilterOrderInfo, FilterWhereInfo, SortDirection};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Query string of the report listing, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReportsParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub rating_min: Option<i64>,
    pub rating_max: Option<i64>,
    pub severity_min: Option<i64>,
    pub severity_max: Option<i64>,
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    BehaviorRating,
    SeverityIndex,
}

impl SortKey {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "created_at" => Ok(SortKey::CreatedAt),
            "behavior_rating" => Ok(SortKey::BehaviorRating),
            "severity_index" => Ok(SortKey::SeverityIndex),
            other => Err(ValidationError::new(
                "sort_by",
                format!("must be one of created_at, behavior_rating, severity_index (got '{}')", other),
            )),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::BehaviorRating => "behavior_rating",
            SortKey::SeverityIndex => "severity_index",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ValidationError::new(
                "sort_order",
                format!("must be 'asc' or 'desc' (got '{}')", other),
            )),
        }
    }

    fn direction(&self) -> SortDirection {
        match self {
            SortOrder::Asc => SortDirection::Asc,
            SortOrder::Desc => SortDirection::Desc,
        }
    }
}

/// A validated, owner-independent listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    pub skip: i64,
    pub limit: i64,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub rating_min: Option<i64>,
    pub rating_max: Option<i64>,
    pub severity_min: Option<i64>,
    pub severity_max: Option<i64>,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
            date_from: None,
            date_to: None,
            rating_min: None,
            rating_max: None,
            severity_min: None,
            severity_max: None,
        }
    }
}

impl ReportQuery {
    pub fn from_params(params: ListReportsParams) -> Result<Self, ValidationError> {
        let skip = params.skip.unwrap_or(0);
        if skip < 0 {
            return Err(ValidationError::new("skip", "must be greater than or equal to 0"));
        }
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::new("limit", format!("must be between 1 and {}", MAX_LIMIT)));
        }

        let sort_by = match params.sort_by.as_deref() {
            Some(raw) => SortKey::parse(raw)?,
            None => SortKey::default(),
        };
        let sort_order = match params.sort_order.as_deref() {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::default(),
        };

        let date_from = params
            .date_from
            .as_deref()
            .map(|raw| parse_date_bound("date_from", raw, false))
            .transpose()?;
        let date_to = params
            .date_to
            .as_deref()
            .map(|raw| parse_date_bound("date_to", raw, true))
            .transpose()?;

        Ok(Self {
            skip,
            limit,
            sort_by,
            sort_order,
            date_from,
            date_to,
            rating_min: bounded("rating_min", params.rating_min, 1, 5)?,
            rating_max: bounded("rating_max", params.rating_max, 1, 5)?,
            severity_min: bounded("severity_min", params.severity_min, 0, 100)?,
            severity_max: bounded("severity_max", params.severity_max, 0, 100)?,
        })
    }

    /// Filter for this query, always scoped to `owner_id`.
    pub fn to_filter(&self, owner_id: i64) -> FilterData {
        let mut conditions = vec![FilterWhereInfo::eq("user_id", owner_id)];
        if let Some(from) = self.date_from {
            conditions.push(FilterWhereInfo::gte("created_at", from));
        }
        if let Some(to) = self.date_to {
            conditions.push(FilterWhereInfo::lte("created_at", to));
        }
        if let Some(min) = self.rating_min {
            conditions.push(FilterWhereInfo::gte("behavior_rating", min));
        }
        if let Some(max) = self.rating_max {
            conditions.push(FilterWhereInfo::lte("behavior_rating", max));
        }
        if let Some(min) = self.severity_min {
            conditions.push(FilterWhereInfo::gte("severity_index", min));
        }
        if let Some(max) = self.severity_max {
            conditions.push(FilterWhereInfo::lte("severity_index", max));
        }

        let direction = self.sort_order.direction();
        FilterData {
            where_clause: conditions,
            order: vec![
                FilterOrderInfo::new(self.sort_by.column(), direction),
                FilterOrderInfo::new("id", direction),
            ],
            limit: Some(self.limit),
            offset: Some(self.skip),
        }
    }
}

fn bounded(field: &str, value: Option<i64>, min: i64, max: i64) -> Result<Option<i64>, ValidationError> {
    match value {
        Some(v) if v < min || v > max => Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        )),
        other => Ok(other),
    }
}

/// Bare dates cover the whole day: midnight for a lower bound, the last
/// microsecond for an upper bound. Stored timestamps have microsecond
/// precision, so a finer lower bound is rounded up to the next microsecond
/// and a finer upper bound is truncated.
fn parse_date_bound(field: &str, raw: &str, upper: bool) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    let parsed = parse_instant(raw).or_else(|| {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        let naive = if upper {
            date.and_hms_micro_opt(23, 59, 59, 999_999)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        naive.map(|n| n.and_utc())
    });
    let ts = parsed.ok_or_else(|| ValidationError::new(field, format!("invalid date '{}'", raw)))?;

    let sub_micro = i64::from(ts.timestamp_subsec_nanos() % 1_000);
    if sub_micro == 0 {
        Ok(ts)
    } else if upper {
        Ok(ts - Duration::nanoseconds(sub_micro))
    } else {
        Ok(ts + Duration::nanoseconds(1_000 - sub_micro))
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOp, FilterValue};
    use chrono::TimeZone;

    #[test]
    fn defaults() {
        let query = ReportQuery::from_params(ListReportsParams::default()).unwrap();
        assert_eq!(query, ReportQuery::default());
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort_by, SortKey::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn pagination_bounds() {
        let bad = [
            ListReportsParams { skip: Some(-1), ..Default::default() },
            ListReportsParams { limit: Some(0), ..Default::default() },
            ListReportsParams { limit: Some(101), ..Default::default() },
        ];
        for params in bad {
            assert!(ReportQuery::from_params(params).is_err());
        }
        let ok = ListReportsParams { skip: Some(0), limit: Some(100), ..Default::default() };
        assert_eq!(ReportQuery::from_params(ok).unwrap().limit, 100);
    }

    #[test]
    fn unknown_sort_values_are_rejected() {
        let params = ListReportsParams { sort_by: Some("description".to_string()), ..Default::default() };
        assert_eq!(ReportQuery::from_params(params).unwrap_err().field, "sort_by");

        let params = ListReportsParams { sort_order: Some("up".to_string()), ..Default::default() };
        assert_eq!(ReportQuery::from_params(params).unwrap_err().field, "sort_order");
    }

    #[test]
    fn range_bounds() {
        let params = ListReportsParams { rating_min: Some(0), ..Default::default() };
        assert_eq!(ReportQuery::from_params(params).unwrap_err().field, "rating_min");
        let params = ListReportsParams { severity_max: Some(101), ..Default::default() };
        assert_eq!(ReportQuery::from_params(params).unwrap_err().field, "severity_max");
        // Inverted ranges are allowed and simply match nothing.
        let params = ListReportsParams { rating_min: Some(5), rating_max: Some(1), ..Default::default() };
        assert!(ReportQuery::from_params(params).is_ok());
    }

    #[test]
    fn date_formats() {
        let params = ListReportsParams {
            date_from: Some("2024-03-01".to_string()),
            date_to: Some("2024-03-01".to_string()),
            ..Default::default()
        };
        let query = ReportQuery::from_params(params).unwrap();
        assert_eq!(query.date_from, Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        let end = query.date_to.unwrap();
        assert_eq!(end.format("%H:%M:%S%.6f").to_string(), "23:59:59.999999");

        let params = ListReportsParams { date_from: Some("2024-03-01T10:00:00+02:00".to_string()), ..Default::default() };
        let query = ReportQuery::from_params(params).unwrap();
        assert_eq!(query.date_from, Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()));

        let params = ListReportsParams { date_to: Some("2024-03-01T10:30:00".to_string()), ..Default::default() };
        let query = ReportQuery::from_params(params).unwrap();
        assert_eq!(query.date_to, Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()));

        let params = ListReportsParams { date_to: Some("yesterday".to_string()), ..Default::default() };
        assert_eq!(ReportQuery::from_params(params).unwrap_err().field, "date_to");
    }

    #[test]
    fn sub_microsecond_bounds_stay_inclusive_of_stored_precision() {
        let params = ListReportsParams {
            date_from: Some("2024-03-01T10:00:00.000000500Z".to_string()),
            date_to: Some("2024-03-01T10:00:00.000001500Z".to_string()),
            ..Default::default()
        };
        let query = ReportQuery::from_params(params).unwrap();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        // A row stored at .000000 lies before the requested lower bound and must not match.
        assert_eq!(query.date_from, Some(base + Duration::microseconds(1)));
        assert_eq!(query.date_to, Some(base + Duration::microseconds(1)));

        let params = ListReportsParams {
            date_from: Some("2024-03-01T10:00:00.000002Z".to_string()),
            ..Default::default()
        };
        let query = ReportQuery::from_params(params).unwrap();
        assert_eq!(query.date_from, Some(base + Duration::microseconds(2)));
    }

    #[test]
    fn filter_is_always_owner_scoped() {
        let query = ReportQuery {
            rating_min: Some(2),
            severity_max: Some(40),
            sort_by: SortKey::SeverityIndex,
            sort_order: SortOrder::Asc,
            skip: 5,
            limit: 20,
            ..Default::default()
        };
        let filter = query.to_filter(42);

        assert_eq!(filter.where_clause[0].column, "user_id");
        assert_eq!(filter.where_clause[0].operator, FilterOp::Eq);
        assert_eq!(filter.where_clause[0].value, FilterValue::Integer(42));
        assert_eq!(filter.where_clause.len(), 3);

        assert_eq!(filter.order[0], FilterOrderInfo::new("severity_index", SortDirection::Asc));
        assert_eq!(filter.order[1], FilterOrderInfo::new("id", SortDirection::Asc));
        assert_eq!(filter.limit, Some(20));
        assert_eq!(filter.offset, Some(5));
    }

    #[test]
    fn default_filter_only_scopes_owner() {
        let filter = ReportQuery::default().to_filter(1);
        assert_eq!(filter.where_clause.len(), 1);
        assert_eq!(filter.order[0], FilterOrderInfo::new("created_at", SortDirection::Desc));
    }
}
