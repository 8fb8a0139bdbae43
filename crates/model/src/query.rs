//! Typed queries and projections
//!
//! A [`Query`] collects predicates and sort keys over one model. The rows it
//! returns are shaped by a [`Projection`], which names the expressions it
//! reads through a [`Selection`] and decodes each result [`Row`].

use crate::entity::Model;
use crate::error::{CompileError, Result};
use crate::expr::{Expr, IntoExpr, Predicate};
use persist_sql as sql;
use persist_sql::{Ordering, ResultColumn};
use persist_value::{DecodeError, Field, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

/// One sort key over rows of `M`.
pub struct SortDescriptor<M> {
    inner: Result<Ordering>,
    marker: PhantomData<fn(&M)>,
}

impl<M> SortDescriptor<M> {
    pub(crate) fn new(inner: Result<Ordering>) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }

    pub fn compile(&self) -> Result<Ordering> {
        self.inner.clone()
    }
}

impl<M> Clone for SortDescriptor<M> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

/// A filtered, sorted query over rows of `M`.
///
/// `filter` and `sort` are cumulative: predicates are AND-ed together and
/// sort keys apply in the order they were added.
pub struct Query<M> {
    predicates: Vec<Predicate<M>>,
    order: Vec<SortDescriptor<M>>,
}

impl<M: Model> Query<M> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: impl IntoExpr<M, bool>) -> Self {
        self.predicates.push(predicate.into_expr());
        self
    }

    pub fn sort(mut self, descriptor: SortDescriptor<M>) -> Self {
        self.order.push(descriptor);
        self
    }

    /// The relational query selecting `P`'s results.
    pub fn compile<P: Projection<Model = M>>(&self) -> Result<sql::Query> {
        let mut query = sql::Query::select(P::selection().compile()?);
        for predicate in &self.predicates {
            query = query.filter(predicate.compile()?);
        }
        for descriptor in &self.order {
            query = query.sorted(descriptor.compile()?);
        }
        Ok(query)
    }
}

impl<M: Model> Default for Query<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Query<M> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            order: self.order.clone(),
        }
    }
}

/// The expressions a projection reads, each under an output name.
pub struct Selection<M> {
    results: Vec<(Option<&'static str>, Result<sql::Expression>)>,
    marker: PhantomData<fn(&M)>,
}

impl<M: Model> Selection<M> {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Selects `value` under the output name `name`.
    pub fn field<V>(mut self, name: &'static str, value: impl IntoExpr<M, V>) -> Self {
        self.results
            .push((Some(name), value.into_expr().into_result()));
        self
    }

    /// Selects `value` under its canonical text.
    pub fn expression<V>(mut self, value: impl IntoExpr<M, V>) -> Self {
        self.results.push((None, value.into_expr().into_result()));
        self
    }

    pub fn compile(&self) -> Result<Vec<ResultColumn>> {
        let mut names = BTreeSet::new();
        let mut results = Vec::with_capacity(self.results.len());
        for (alias, expression) in &self.results {
            let expression = expression.clone()?;
            let result = match alias {
                Some(alias) => ResultColumn::aliased(expression, *alias),
                None => ResultColumn::new(expression),
            };
            let name = result.name();
            if !names.insert(name.clone()) {
                return Err(CompileError::DuplicateResultName(name));
            }
            results.push(result);
        }
        Ok(results)
    }
}

impl<M: Model> Default for Selection<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// One result row: output name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get<T: Field>(&self, name: &str) -> std::result::Result<T, DecodeError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| DecodeError::MissingColumn(name.to_string()))?;
        T::from_value(value.clone())
    }

    /// Decodes the column selected unaliased as `expr`.
    pub fn get_expr<M, V: Field>(&self, expr: &Expr<M, V>) -> std::result::Result<V, DecodeError> {
        let expression = expr
            .compile()
            .map_err(|e| DecodeError::InvalidValue(e.to_string()))?;
        self.get(&expression.to_string())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A result shape: a fixed set of expressions over one model, decoded into
/// a host value per row.
pub trait Projection: Clone + PartialEq + Send + Sized + 'static {
    type Model: Model;

    fn selection() -> Selection<Self::Model>;

    fn decode(row: &Row) -> std::result::Result<Self, DecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, Property};
    use crate::path::KeyPath;
    use persist_value::DataType;

    struct Author;

    static AUTHOR: Entity = Entity {
        name: "Author",
        id: "id",
        properties: &[
            Property::value("id", DataType::Integer),
            Property::value("name", DataType::Text),
            Property::value("born", DataType::Integer),
        ],
    };

    impl Model for Author {
        type Id = i64;
        fn entity() -> &'static Entity {
            &AUTHOR
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Name(String);

    impl Projection for Name {
        type Model = Author;

        fn selection() -> Selection<Author> {
            Selection::new().field("name", KeyPath::<Author, String>::new("name"))
        }

        fn decode(row: &Row) -> std::result::Result<Self, DecodeError> {
            Ok(Name(row.get("name")?))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Twice;

    impl Projection for Twice {
        type Model = Author;

        fn selection() -> Selection<Author> {
            Selection::new()
                .expression(KeyPath::<Author, i64>::new("born"))
                .expression(KeyPath::<Author, i64>::new("born"))
        }

        fn decode(_: &Row) -> std::result::Result<Self, DecodeError> {
            Ok(Twice)
        }
    }

    fn born() -> KeyPath<Author, i64> {
        KeyPath::new("born")
    }

    #[test]
    fn test_compile_query() {
        let query = Query::<Author>::new()
            .filter(born().ge(1920))
            .sort(KeyPath::<Author, String>::new("name").ascending());
        let compiled = query.compile::<Name>().unwrap();
        assert_eq!(
            compiled.sql().text,
            r#"SELECT "Author"."name" AS "name" FROM "Author" WHERE ("Author"."born" >= ?) ORDER BY "Author"."name" ASC"#
        );
        assert_eq!(compiled.sql().parameters, vec![Value::Integer(1920)]);
    }

    #[test]
    fn test_filters_are_cumulative() {
        let query = Query::<Author>::new()
            .filter(born().ge(1900))
            .filter(born().lt(2000))
            .sort(born().descending());
        let compiled = query.compile::<Name>().unwrap();
        assert_eq!(compiled.predicates.len(), 2);
        assert_eq!(compiled.order.len(), 1);
        assert_eq!(compiled, query.clone().compile::<Name>().unwrap());
    }

    #[test]
    fn test_duplicate_result_names_are_rejected() {
        let err = Query::<Author>::new().compile::<Twice>().unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateResultName(r#""Author"."born""#.to_string())
        );
    }

    #[test]
    fn test_invalid_predicate_fails_compile() {
        let query = Query::<Author>::new().filter(KeyPath::<Author, i64>::new("height").gt(1));
        assert!(matches!(
            query.compile::<Name>(),
            Err(CompileError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_row_decoding() {
        let row: Row = [
            ("name".to_string(), Value::Text("A".into())),
            (r#""Author"."born""#.to_string(), Value::Integer(1900)),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.get::<String>("name").unwrap(), "A");
        assert_eq!(row.get_expr(&born().expr()).unwrap(), 1900);
        assert_eq!(
            row.get::<i64>("died").unwrap_err(),
            DecodeError::MissingColumn("died".to_string())
        );
        assert!(row.get::<i64>("name").is_err());
        assert_eq!(row.len(), 2);
    }
}
