//! Queries: selected results, a conjunction of predicates, and an ordering

use super::expression::Expression;
use crate::render::{Renderer, Sql};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// One key of a sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ordering {
    pub expression: Expression,
    pub direction: Direction,
}

impl Ordering {
    pub fn ascending(expression: Expression) -> Self {
        Self {
            expression,
            direction: Direction::Ascending,
        }
    }

    pub fn descending(expression: Expression) -> Self {
        Self {
            expression,
            direction: Direction::Descending,
        }
    }
}

/// A selected output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultColumn {
    pub expression: Expression,
    pub alias: Option<String>,
}

impl ResultColumn {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            alias: None,
        }
    }

    pub fn aliased(expression: Expression, alias: impl Into<String>) -> Self {
        Self {
            expression,
            alias: Some(alias.into()),
        }
    }

    /// The output column name: the alias, or the expression's canonical text.
    pub fn name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.expression.to_string(),
        }
    }
}

/// A SELECT over one or more tables.
///
/// `filter` and `sorted` are cumulative. Predicates are AND-ed; orderings
/// apply lexicographically in the order they were added. Two queries are
/// equal only if all three lists are equal as sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub results: Vec<ResultColumn>,
    pub predicates: Vec<Expression>,
    pub order: Vec<Ordering>,
}

impl Query {
    pub fn select(results: Vec<ResultColumn>) -> Self {
        Self {
            results,
            predicates: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Expression) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn sorted(mut self, ordering: Ordering) -> Self {
        self.order.push(ordering);
        self
    }

    fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.results
            .iter()
            .map(|r| &r.expression)
            .chain(self.predicates.iter())
            .chain(self.order.iter().map(|o| &o.expression))
    }

    /// Every table the query reads, join targets included.
    pub fn tables(&self) -> BTreeSet<String> {
        self.expressions().flat_map(Expression::tables).collect()
    }

    /// Every column the query references, at any depth.
    pub fn columns(&self) -> BTreeSet<super::expression::Column> {
        self.expressions().flat_map(Expression::columns).collect()
    }

    /// Names of the referenced columns that belong to `table`.
    pub fn columns_of(&self, table: &str) -> BTreeSet<String> {
        self.columns()
            .into_iter()
            .filter(|c| c.table == table)
            .map(|c| c.name)
            .collect()
    }

    /// Tables the rows come from: those referenced outside join targets.
    pub fn root_tables(&self) -> BTreeSet<String> {
        let mut tables = BTreeSet::new();
        for expression in self.expressions() {
            expression.visit_root_tables(&mut |t| {
                tables.insert(t.to_string());
            });
        }
        tables
    }

    pub fn sql(&self) -> Sql {
        let mut r = Renderer::parameterized();
        r.push("SELECT ");
        if self.results.is_empty() {
            r.push("*");
        }
        r.list(&self.results, |r, result| {
            r.expression(&result.expression);
            r.push(" AS ");
            r.identifier(&result.name());
        });

        let tables: Vec<_> = self.root_tables().into_iter().collect();
        if !tables.is_empty() {
            r.push(" FROM ");
            r.list(&tables, |r, table| r.identifier(table));
        }

        for (i, predicate) in self.predicates.iter().enumerate() {
            r.push(if i == 0 { " WHERE " } else { " AND " });
            r.expression(predicate);
        }

        if !self.order.is_empty() {
            r.push(" ORDER BY ");
            r.list(&self.order, |r, ordering| {
                r.expression(&ordering.expression);
                r.push(" ");
                r.push(ordering.direction.keyword());
            });
        }
        r.finish()
    }
}
