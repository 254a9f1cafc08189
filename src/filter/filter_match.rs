//! In-memory evaluation of parsed where clauses, mirroring the SQL that
//! `FilterWhere` renders (including SQL's treatment of NULL).

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::filter_where::WhereNode;
use super::types::{FilterOp, FilterWhereInfo};

pub struct FilterMatch;

impl FilterMatch {
    pub fn matches(node: &WhereNode, row: &Map<String, Value>) -> bool {
        match node {
            WhereNode::And(children) => children.iter().all(|c| Self::matches(c, row)),
            WhereNode::Condition(condition) => Self::matches_condition(condition, row),
        }
    }

    fn matches_condition(condition: &FilterWhereInfo, row: &Map<String, Value>) -> bool {
        let field = row.get(&condition.column).unwrap_or(&Value::Null);
        let data = &condition.data;

        match condition.operator {
            FilterOp::Eq if data.is_null() => field.is_null(),
            FilterOp::Ne if data.is_null() => !field.is_null(),
            // column = x and column <> x are both unknown for a NULL column
            _ if field.is_null() => false,
            FilterOp::Eq => values_equal(field, data),
            FilterOp::Ne => !values_equal(field, data),
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match compare(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

/// Ordering between two JSON scalars of the same kind; `None` when they are not comparable.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
