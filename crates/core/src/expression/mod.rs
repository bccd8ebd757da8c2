mod condition;
mod eval;
mod key;
mod projection;
mod render;

pub use condition::{
    begins_with, between, contains, equal, exists, greater_or_equal, greater_than, in_list, is_in,
    less_or_equal, less_than, not_contains, not_equal, not_exists, Condition, FilterBuilder,
    Predicate,
};
pub use eval::compare;
pub use key::{KeyCondition, SortCondition, SortKeyCondition};
pub use projection::Projection;
pub use render::{ExpressionBuilder, Placeholders};
