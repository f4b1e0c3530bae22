use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOp, FilterValue, FilterWhereInfo};

/// Renders a conjunction of conditions into a parameterised WHERE body.
pub struct FilterWhere {
    param_values: Vec<FilterValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<FilterValue>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    pub fn validate(conditions: &[FilterWhereInfo]) -> Result<(), FilterError> {
        for condition in conditions {
            validate_identifier(&condition.column).map_err(FilterError::InvalidColumn)?;
        }
        Ok(())
    }

    fn build(&mut self, conditions: &[FilterWhereInfo]) -> Result<(String, Vec<FilterValue>), FilterError> {
        Self::validate(conditions)?;

        let sql_conditions: Vec<String> = conditions.iter().map(|c| self.build_sql_condition(c)).collect();
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, std::mem::take(&mut self.param_values)))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let operator = match condition.operator {
            FilterOp::Eq => "=",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
        };
        let placeholder = self.param(condition.value.clone());
        format!("\"{}\" {} {}", condition.column, operator, placeholder)
    }

    fn param(&mut self, value: FilterValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("?{}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_conditions_match_everything() {
        let (sql, params) = FilterWhere::generate(&[], 0).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn joins_conditions_with_and() {
        let conditions = vec![
            FilterWhereInfo::eq("user_id", 7i64),
            FilterWhereInfo::gte("behavior_rating", 3i64),
            FilterWhereInfo::lte("severity_index", 90i64),
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(
            sql,
            "\"user_id\" = ?1 AND \"behavior_rating\" >= ?2 AND \"severity_index\" <= ?3"
        );
        assert_eq!(
            params,
            vec![FilterValue::Integer(7), FilterValue::Integer(3), FilterValue::Integer(90)]
        );
    }

    #[test]
    fn numbering_continues_from_start_index() {
        let conditions = vec![FilterWhereInfo::eq("email", "a@x.com")];
        let (sql, params) = FilterWhere::generate(&conditions, 4).unwrap();
        assert_eq!(sql, "\"email\" = ?5");
        assert_eq!(params, vec![FilterValue::Text("a@x.com".to_string())]);
    }

    #[test]
    fn rejects_bad_column() {
        let bad_column = vec![FilterWhereInfo::eq("id; DROP TABLE users", 1i64)];
        assert!(matches!(FilterWhere::generate(&bad_column, 0), Err(FilterError::InvalidColumn(_))));
    }
}
