use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // "created_at desc, id asc"
        let infos = match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Null => vec![],
            _ => return Err(FilterError::InvalidOrder("order must be a string".to_string())),
        };

        for info in &infos {
            validate_identifier(&info.column).map_err(|_| FilterError::InvalidColumn(info.column.clone()))?;
        }
        Ok(infos)
    }

    fn parse_order_string(s: &str) -> Vec<FilterOrderInfo> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let mut it = part.split_whitespace();
            if let Some(col) = it.next() {
                out.push(FilterOrderInfo {
                    column: col.to_string(),
                    sort: Self::direction(it.next().unwrap_or("asc")),
                });
            }
        }
        out
    }

    fn direction(dir: &str) -> SortDirection {
        if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc }
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_column_direction_list() {
        let infos = FilterOrder::validate_and_parse(&json!("created_at desc, id")).unwrap();
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"created_at\" DESC, \"id\" ASC");
        assert_eq!(infos[0].sort, SortDirection::Desc);

        assert!(FilterOrder::validate_and_parse(&json!({ "title": "desc" })).is_err());
    }

    #[test]
    fn rejects_injected_column() {
        assert!(FilterOrder::validate_and_parse(&json!("id; DROP TABLE users")).is_err());
    }
}
