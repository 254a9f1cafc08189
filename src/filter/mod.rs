pub mod error;
pub mod filter;
pub mod filter_match;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::{validate_identifier, Filter};
pub use filter_match::{compare, FilterMatch};
pub use filter_where::{FilterWhere, WhereNode};
pub use types::*;
