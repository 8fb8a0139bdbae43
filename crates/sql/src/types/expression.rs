//! Relational expressions
//!
//! Expressions are pure data: building, comparing or rendering one never
//! touches the storage engine. Equality is structural and order-sensitive,
//! so `a = b` and `b = a` are different expressions.

use crate::render::{Renderer, Sql};
use persist_value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display};

/// A column of a table, identified by both names.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Column {
    pub table: String,
    pub name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Renderer::canonical().column(self))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// NOT a
    Not,
    /// -a
    Negate,
    /// a IS NULL
    IsNull,
    /// a IS NOT NULL
    IsNotNull,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Concatenate,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Concatenate => "||",
        }
    }
}

/// Functions understood by the storage engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    /// Greatest of two or more arguments.
    Max,
    /// Least of two or more arguments.
    Min,
    /// The current moment as real seconds since the Unix epoch, evaluated
    /// by the engine each time the statement runs.
    Now,
    /// First non-null argument.
    Coalesce,
    /// Length of a text or blob.
    Length,
}

impl Function {
    pub fn name(&self) -> &'static str {
        match self {
            Function::Max => "max",
            Function::Min => "min",
            Function::Now => "now",
            Function::Coalesce => "coalesce",
            Function::Length => "length",
        }
    }
}

/// An expression, made up of nested operations, values and column
/// references.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    /// A constant value.
    Value(Value),
    /// A column of the row being evaluated.
    Column(Column),
    /// A unary operation.
    Unary(UnaryOperator, Box<Expression>),
    /// A binary operation.
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    /// A function call.
    Function(Function, Vec<Expression>),
    /// The inner expression evaluated on the row of `to.table` whose `to`
    /// column matches the current row's `from` column.
    Join(Column, Column, Box<Expression>),
}

impl Expression {
    pub fn value(value: impl Into<Value>) -> Self {
        Expression::Value(value.into())
    }

    pub fn null() -> Self {
        Expression::Value(Value::Null)
    }

    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(Column::new(table, name))
    }

    pub fn join(from: Column, to: Column, expression: Expression) -> Self {
        Expression::Join(from, to, Box::new(expression))
    }

    pub fn unary(op: UnaryOperator, expression: Expression) -> Self {
        Expression::Unary(op, Box::new(expression))
    }

    pub fn binary(op: BinaryOperator, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn function(function: Function, args: Vec<Expression>) -> Self {
        Expression::Function(function, args)
    }

    pub fn now() -> Self {
        Expression::Function(Function::Now, Vec::new())
    }

    pub fn and(self, other: Expression) -> Self {
        Self::binary(BinaryOperator::And, self, other)
    }

    pub fn or(self, other: Expression) -> Self {
        Self::binary(BinaryOperator::Or, self, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::unary(UnaryOperator::Not, self)
    }

    pub fn equals(self, other: Expression) -> Self {
        Self::binary(BinaryOperator::Equal, self, other)
    }

    /// Every table read by this expression, including join targets at any
    /// depth.
    pub fn tables(&self) -> BTreeSet<String> {
        let mut tables = BTreeSet::new();
        self.visit_columns(&mut |column| {
            tables.insert(column.table.clone());
        });
        tables
    }

    /// Every column referenced by this expression, including both sides of
    /// every join and everything inside join targets.
    pub fn columns(&self) -> BTreeSet<Column> {
        let mut columns = BTreeSet::new();
        self.visit_columns(&mut |column| {
            columns.insert(column.clone());
        });
        columns
    }

    pub(crate) fn visit_columns(&self, visit: &mut impl FnMut(&Column)) {
        match self {
            Expression::Value(_) => {}
            Expression::Column(column) => visit(column),
            Expression::Unary(_, expr) => expr.visit_columns(visit),
            Expression::Binary(_, lhs, rhs) => {
                lhs.visit_columns(visit);
                rhs.visit_columns(visit);
            }
            Expression::Function(_, args) => {
                for arg in args {
                    arg.visit_columns(visit);
                }
            }
            Expression::Join(from, to, expr) => {
                visit(from);
                visit(to);
                expr.visit_columns(visit);
            }
        }
    }

    /// Tables of columns evaluated against the current row, i.e. everything
    /// outside join targets. These are the tables a statement selects from.
    pub(crate) fn visit_root_tables(&self, visit: &mut impl FnMut(&str)) {
        match self {
            Expression::Value(_) => {}
            Expression::Column(column) => visit(&column.table),
            Expression::Unary(_, expr) => expr.visit_root_tables(visit),
            Expression::Binary(_, lhs, rhs) => {
                lhs.visit_root_tables(visit);
                rhs.visit_root_tables(visit);
            }
            Expression::Function(_, args) => {
                for arg in args {
                    arg.visit_root_tables(visit);
                }
            }
            Expression::Join(from, _, _) => visit(&from.table),
        }
    }

    /// Renders the expression with `?` placeholders and its bound values.
    pub fn sql(&self) -> Sql {
        let mut renderer = Renderer::parameterized();
        renderer.expression(self);
        renderer.finish()
    }
}

/// The canonical text: the rendered SQL with values inlined as literals.
impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut renderer = Renderer::canonical();
        renderer.expression(self);
        f.write_str(&renderer.finish().text)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Value(value)
    }
}

impl From<Column> for Expression {
    fn from(column: Column) -> Self {
        Expression::Column(column)
    }
}
