//! Mutation statements and the action log entry that wraps them

use super::expression::Expression;
use crate::render::{Renderer, Sql};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// INSERT INTO table (columns) VALUES (expressions)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Insert {
    pub table: String,
    pub values: BTreeMap<String, Expression>,
}

/// UPDATE table SET column = expression, ... [WHERE predicate]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Update {
    pub table: String,
    pub values: BTreeMap<String, Expression>,
    pub predicate: Option<Expression>,
}

/// DELETE FROM table [WHERE predicate]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delete {
    pub table: String,
    pub predicate: Option<Expression>,
}

impl Insert {
    pub fn new(table: impl Into<String>, values: BTreeMap<String, Expression>) -> Self {
        Self {
            table: table.into(),
            values,
        }
    }

    pub fn sql(&self) -> Sql {
        let mut r = Renderer::parameterized();
        r.push("INSERT INTO ");
        r.identifier(&self.table);
        if self.values.is_empty() {
            r.push(" DEFAULT VALUES");
            return r.finish();
        }

        let (columns, values): (Vec<_>, Vec<_>) = self.values.iter().unzip();
        r.push(" (");
        r.list(&columns, |r, column| r.identifier(column));
        r.push(") VALUES (");
        r.list(&values, |r, value| r.expression(value));
        r.push(")");
        r.finish()
    }
}

impl Update {
    pub fn new(
        table: impl Into<String>,
        values: BTreeMap<String, Expression>,
        predicate: Option<Expression>,
    ) -> Self {
        Self {
            table: table.into(),
            values,
            predicate,
        }
    }

    pub fn sql(&self) -> Sql {
        let mut r = Renderer::parameterized();
        r.push("UPDATE ");
        r.identifier(&self.table);
        r.push(" SET ");
        let assignments: Vec<_> = self.values.iter().collect();
        r.list(&assignments, |r, (column, value)| {
            r.identifier(column);
            r.push(" = ");
            r.expression(value);
        });
        if let Some(predicate) = &self.predicate {
            r.push(" WHERE ");
            r.expression(predicate);
        }
        r.finish()
    }
}

impl Delete {
    pub fn new(table: impl Into<String>, predicate: Option<Expression>) -> Self {
        Self {
            table: table.into(),
            predicate,
        }
    }

    pub fn sql(&self) -> Sql {
        let mut r = Renderer::parameterized();
        r.push("DELETE FROM ");
        r.identifier(&self.table);
        if let Some(predicate) = &self.predicate {
            r.push(" WHERE ");
            r.expression(predicate);
        }
        r.finish()
    }
}

/// A mutation as applied to storage and published to observers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Action {
    pub fn table(&self) -> &str {
        match self {
            Action::Insert(insert) => &insert.table,
            Action::Update(update) => &update.table,
            Action::Delete(delete) => &delete.table,
        }
    }

    pub fn sql(&self) -> Sql {
        match self {
            Action::Insert(insert) => insert.sql(),
            Action::Update(update) => update.sql(),
            Action::Delete(delete) => delete.sql(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Action::Insert(_) => "insert",
            Action::Update(_) => "update",
            Action::Delete(_) => "delete",
        };
        write!(f, "{} {}", kind, self.table())
    }
}

impl From<Insert> for Action {
    fn from(insert: Insert) -> Self {
        Action::Insert(insert)
    }
}

impl From<Update> for Action {
    fn from(update: Update) -> Self {
        Action::Update(update)
    }
}

impl From<Delete> for Action {
    fn from(delete: Delete) -> Self {
        Action::Delete(delete)
    }
}
