use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOp, FilterWhereInfo};

/// Parsed form of a JSON where clause.
#[derive(Debug, Clone)]
pub enum WhereNode {
    And(Vec<WhereNode>),
    Condition(FilterWhereInfo),
}

/// Parses where clauses and renders them as parameterized Postgres SQL.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    /// Render `where_data` as SQL. Placeholders are numbered after `starting_param_index`,
    /// so a caller that already bound N values passes N.
    #[cfg(test)]
    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let node = Self::parse(where_data)?;
        Ok(Self::generate_node(&node, starting_param_index))
    }

    pub fn generate_node(node: &WhereNode, starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self {
            param_values: vec![],
            param_index: starting_param_index,
        };
        let sql = filter_where.build(node);
        (sql, filter_where.param_values)
    }

    pub fn parse(where_data: &Value) -> Result<WhereNode, FilterError> {
        match where_data {
            Value::Null => Ok(WhereNode::And(vec![])),
            Value::Object(obj) => {
                let mut nodes = Vec::with_capacity(obj.len());
                for (key, value) in obj {
                    if key.starts_with('$') {
                        nodes.push(Self::parse_logical_operator(key, value)?);
                    } else {
                        nodes.extend(Self::parse_field_condition(key, value)?);
                    }
                }
                Ok(if nodes.len() == 1 { nodes.remove(0) } else { WhereNode::And(nodes) })
            }
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_logical_operator(op: &str, value: &Value) -> Result<WhereNode, FilterError> {
        match op {
            "$and" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$and requires array".to_string()))?;
                let children = arr.iter().map(Self::parse).collect::<Result<Vec<_>, _>>()?;
                Ok(WhereNode::And(children))
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<WhereNode>, FilterError> {
        validate_identifier(field).map_err(|_| FilterError::InvalidColumn(field.to_string()))?;

        match value {
            Value::Object(obj) if obj.keys().all(|k| k.starts_with('$')) && !obj.is_empty() => {
                let mut nodes = Vec::with_capacity(obj.len());
                for (op_key, op_val) in obj {
                    let operator = FilterOp::parse(op_key)
                        .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                    nodes.push(WhereNode::Condition(FilterWhereInfo {
                        column: field.to_string(),
                        operator,
                        data: op_val.clone(),
                    }));
                }
                Ok(nodes)
            }
            // Implicit equality: { field: value }
            _ => Ok(vec![WhereNode::Condition(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            })]),
        }
    }

    fn build(&mut self, node: &WhereNode) -> String {
        match node {
            WhereNode::And(children) => self.join(children, " AND ", "1=1"),
            WhereNode::Condition(condition) => self.build_sql_condition(condition),
        }
    }

    fn join(&mut self, children: &[WhereNode], joiner: &str, empty: &str) -> String {
        match children {
            [] => empty.to_string(),
            [only] => self.build(only),
            _ => children
                .iter()
                .map(|child| format!("({})", self.build(child)))
                .collect::<Vec<_>>()
                .join(joiner),
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() { format!("{} IS NULL", quoted_column) }
                else { format!("{} = {}", quoted_column, self.param(condition.data.clone())) }
            }
            FilterOp::Ne => {
                if condition.data.is_null() { format!("{} IS NOT NULL", quoted_column) }
                else { format!("{} <> {}", quoted_column, self.param(condition.data.clone())) }
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
