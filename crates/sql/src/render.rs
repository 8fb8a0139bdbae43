//! Rendering of the IR into statement text
//!
//! Two modes share one renderer: parameterized output binds every non-null
//! value to a positional `?` placeholder, canonical output inlines values as
//! literals and is used for default result column names.

use crate::types::expression::{
    BinaryOperator, Column, Expression, Function, UnaryOperator,
};
use persist_value::Value;

/// Statement text plus the values bound to its placeholders, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sql {
    pub text: String,
    pub parameters: Vec<Value>,
}

/// Quotes an identifier.
pub fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) struct Renderer {
    text: String,
    /// `None` renders values inline.
    parameters: Option<Vec<Value>>,
    /// Alias of each join target currently being rendered, innermost last.
    scopes: Vec<(String, String)>,
    joins: usize,
}

impl Renderer {
    pub(crate) fn parameterized() -> Self {
        Self {
            text: String::new(),
            parameters: Some(Vec::new()),
            scopes: Vec::new(),
            joins: 0,
        }
    }

    pub(crate) fn canonical() -> Self {
        Self {
            parameters: None,
            ..Self::parameterized()
        }
    }

    pub(crate) fn finish(self) -> Sql {
        Sql {
            text: self.text,
            parameters: self.parameters.unwrap_or_default(),
        }
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn identifier(&mut self, name: &str) {
        self.text.push_str(&quote(name));
    }

    /// Qualified column name, resolved against the innermost join that
    /// selects from the column's table.
    pub(crate) fn column(&self, column: &Column) -> String {
        let qualifier = self
            .scopes
            .iter()
            .rev()
            .find(|(table, _)| *table == column.table)
            .map(|(_, alias)| alias.as_str())
            .unwrap_or(&column.table);
        format!("{}.{}", quote(qualifier), quote(&column.name))
    }

    pub(crate) fn value(&mut self, value: &Value) {
        match (&mut self.parameters, value) {
            (_, Value::Null) => self.text.push_str("NULL"),
            (Some(parameters), value) => {
                parameters.push(value.clone());
                self.text.push('?');
            }
            (None, value) => self.text.push_str(&value.to_string()),
        }
    }

    /// Comma separated list
    pub(crate) fn list<T>(&mut self, items: &[T], mut render: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            render(self, item);
        }
    }

    pub(crate) fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Value(value) => self.value(value),
            Expression::Column(column) => {
                let column = self.column(column);
                self.push(&column);
            }

            Expression::Unary(op, expr) => match op {
                UnaryOperator::Not => {
                    self.push("(NOT ");
                    self.expression(expr);
                    self.push(")");
                }
                UnaryOperator::Negate => {
                    self.push("(-");
                    self.expression(expr);
                    self.push(")");
                }
                UnaryOperator::IsNull => self.null_test(expr, "IS NULL"),
                UnaryOperator::IsNotNull => self.null_test(expr, "IS NOT NULL"),
            },

            // `= NULL` never matches in SQL, comparing against null means a null test
            Expression::Binary(BinaryOperator::Equal, lhs, rhs) if is_null(rhs) => {
                self.null_test(lhs, "IS NULL")
            }
            Expression::Binary(BinaryOperator::Equal, lhs, rhs) if is_null(lhs) => {
                self.null_test(rhs, "IS NULL")
            }
            Expression::Binary(BinaryOperator::NotEqual, lhs, rhs) if is_null(rhs) => {
                self.null_test(lhs, "IS NOT NULL")
            }
            Expression::Binary(BinaryOperator::NotEqual, lhs, rhs) if is_null(lhs) => {
                self.null_test(rhs, "IS NOT NULL")
            }
            Expression::Binary(op, lhs, rhs) => {
                self.push("(");
                self.expression(lhs);
                self.push(" ");
                self.push(op.symbol());
                self.push(" ");
                self.expression(rhs);
                self.push(")");
            }

            Expression::Function(Function::Now, _) => {
                self.push("((julianday('now') - 2440587.5) * 86400.0)")
            }
            Expression::Function(function, args) => {
                self.push(function.name());
                self.push("(");
                self.list(args, |r, arg| r.expression(arg));
                self.push(")");
            }

            Expression::Join(from, to, expr) => {
                self.joins += 1;
                let alias = format!("{}#{}", to.table, self.joins);
                let outer = self.column(from);

                self.push("(SELECT ");
                self.scopes.push((to.table.clone(), alias.clone()));
                self.expression(expr);
                self.push(" FROM ");
                self.identifier(&to.table);
                self.push(" AS ");
                self.identifier(&alias);
                self.push(" WHERE ");
                let inner = self.column(to);
                self.push(&inner);
                self.scopes.pop();
                self.push(" = ");
                self.push(&outer);
                self.push(")");
            }
        }
    }

    fn null_test(&mut self, expr: &Expression, test: &str) {
        self.push("(");
        self.expression(expr);
        self.push(" ");
        self.push(test);
        self.push(")");
    }
}

fn is_null(expr: &Expression) -> bool {
    matches!(expr, Expression::Value(Value::Null))
}
