use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate(infos: &[FilterOrderInfo]) -> Result<(), FilterError> {
        for info in infos {
            validate_identifier(&info.column).map_err(FilterError::InvalidColumn)?;
        }
        Ok(())
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
