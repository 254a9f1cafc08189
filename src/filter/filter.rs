use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{FilterWhere, WhereNode};
use super::types::{FilterData, FilterOrderInfo, SqlResult};

/// A validated query against one table, renderable as SQL or evaluated in memory.
pub struct Filter {
    table_name: String,
    where_node: Option<WhereNode>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name)
            .map_err(|msg| FilterError::InvalidTableName(format!("{}: {}", msg, table_name)))?;
        Ok(Self {
            table_name,
            where_node: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    /// Shorthand for `new` followed by `assign`.
    pub fn build(table_name: impl Into<String>, data: FilterData) -> Result<Self, FilterError> {
        let mut filter = Self::new(table_name)?;
        filter.assign(data)?;
        Ok(filter)
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if let Some(limit) = data.limit { self.limit(limit)?; }
        if let Some(offset) = data.offset { self.offset(offset)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        self.where_node = Some(FilterWhere::parse(&conditions)?);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i32) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }

        // Apply max limit from config
        let max_limit = crate::config::CONFIG.filter.max_limit.unwrap_or(i32::MAX);
        let applied_limit = if limit > max_limit {
            if crate::config::CONFIG.filter.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            }
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        Ok(self)
    }

    pub fn offset(&mut self, offset: i32) -> Result<&mut Self, FilterError> {
        if offset < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); }
        self.offset = Some(offset);
        Ok(self)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn where_node(&self) -> Option<&WhereNode> {
        self.where_node.as_ref()
    }

    pub fn order_data(&self) -> &[FilterOrderInfo] {
        &self.order_data
    }

    pub fn limit_value(&self) -> Option<i32> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i32> {
        self.offset
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql(0);
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params: where_result.params })
    }

    /// The bare predicate (no `WHERE` keyword); empty when there is no where clause.
    pub fn to_where_sql(&self, starting_param_index: usize) -> SqlResult {
        match &self.where_node {
            Some(node) => {
                let (query, params) = FilterWhere::generate_node(node, starting_param_index);
                SqlResult { query, params }
            }
            None => SqlResult { query: String::new(), params: vec![] },
        }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql(0);
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_result.query)
        };
        SqlResult { query, params: where_result.params }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}

/// Table and column names are interpolated into SQL, so they are restricted
/// to `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err("identifier cannot be empty"),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => Err("invalid identifier format"),
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => Err("invalid identifier format"),
        Some(_) => Ok(()),
    }
}
