pub mod expression;
pub mod query;
pub mod schema;
pub mod statement;

pub use expression::{BinaryOperator, Column, Expression, Function, UnaryOperator};
pub use query::{Direction, Ordering, Query, ResultColumn};
pub use schema::{ColumnDef, Schema, is_compatible};
pub use statement::{Action, Delete, Insert, Update};
