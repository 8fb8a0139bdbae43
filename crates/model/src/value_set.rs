//! Assignment sets for inserts and updates

use crate::entity::{DefaultValue, Model};
use crate::error::{CompileError, Result};
use crate::expr::{IntoExpr, Predicate};
use crate::path::KeyPath;
use persist_sql::{Delete, Expression, Insert, Update};
use persist_value::{Field, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Values to assign to properties of `M`, keyed by property name.
///
/// Assigning the same property twice keeps the later value.
pub struct ValueSet<M> {
    values: BTreeMap<&'static str, Result<Expression>>,
    /// First invalid assignment, reported when the set is compiled.
    error: Option<CompileError>,
    marker: PhantomData<fn(&M)>,
}

impl<M: Model> ValueSet<M> {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            error: None,
            marker: PhantomData,
        }
    }

    fn assign(mut self, segments: &[&'static str], value: Result<Expression>) -> Self {
        match segments {
            [name] => {
                self.values.insert(*name, value);
            }
            _ => {
                self.error.get_or_insert(CompileError::RelationshipPathAssignment {
                    path: segments.join("."),
                });
            }
        }
        self
    }

    pub fn set<V>(self, path: KeyPath<M, V>, value: impl IntoExpr<M, V>) -> Self {
        let value = value.into_expr().into_result();
        self.assign(path.segments(), value)
    }

    /// Points a to-one relationship at the row identified by `id`.
    pub fn relate<T: Model>(self, path: KeyPath<M, T>, id: T::Id) -> Self {
        self.assign(path.segments(), Ok(Expression::Value(id.into_value())))
    }

    /// Clears a nullable to-one relationship.
    pub fn unrelate<T: Model>(self, path: KeyPath<M, T>) -> Self {
        self.assign(path.segments(), Ok(Expression::null()))
    }

    /// Adds every assignment of `other`, replacing ours where both assign
    /// the same property.
    pub fn merge(mut self, other: ValueSet<M>) -> Self {
        self.values.extend(other.values);
        if self.error.is_none() {
            self.error = other.error;
        }
        self
    }

    /// Names of assigned properties.
    pub fn properties(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    /// Required properties that have no assignment.
    pub fn missing_for_insert(&self) -> Vec<&'static str> {
        M::entity()
            .required_for_insert()
            .into_iter()
            .map(|p| p.name)
            .filter(|name| !self.values.contains_key(name))
            .collect()
    }

    pub fn is_sufficient_for_insert(&self) -> bool {
        self.missing_for_insert().is_empty()
    }

    /// Column assignments, checked against the model.
    pub fn assignments(&self) -> Result<BTreeMap<String, Expression>> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let entity = M::entity();
        let mut assignments = BTreeMap::new();
        for (&name, value) in &self.values {
            let property = entity.lookup(name)?;
            if !property.has_column() {
                return Err(CompileError::ToManyTraversal {
                    entity: entity.name,
                    property: name,
                });
            }
            assignments.insert(name.to_string(), value.clone()?);
        }
        Ok(assignments)
    }

    /// Compiles an insert, filling unassigned properties that declare a
    /// default. Sufficiency is not checked here.
    pub fn insert(&self) -> Result<Insert> {
        let entity = M::entity();
        let mut values = self.assignments()?;
        for property in entity.properties {
            if let Some(default) = property.default {
                values
                    .entry(property.name.to_string())
                    .or_insert_with(|| default_expression(default));
            }
        }
        Ok(Insert::new(entity.name, values))
    }

    /// Compiles an update of the rows matching `predicate`, or of every row.
    pub fn update(&self, predicate: Option<Predicate<M>>) -> Result<Update> {
        let predicate = predicate.map(Predicate::into_result).transpose()?;
        Ok(Update::new(M::entity().name, self.assignments()?, predicate))
    }
}

fn default_expression(default: DefaultValue) -> Expression {
    match default {
        DefaultValue::Now => Expression::now(),
        DefaultValue::Integer(i) => Expression::Value(Value::Integer(i)),
        DefaultValue::Real(r) => Expression::Value(Value::Real(r)),
        DefaultValue::Text(s) => Expression::value(s),
        DefaultValue::Uuid => Expression::Value(Uuid::new_v4().into_value()),
    }
}

/// Compiles a delete of the rows of `M` matching `predicate`, or of every row.
pub fn delete<M: Model>(predicate: Option<Predicate<M>>) -> Result<Delete> {
    let predicate = predicate.map(Predicate::into_result).transpose()?;
    Ok(Delete::new(M::entity().name, predicate))
}

impl<M: Model> Default for ValueSet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for ValueSet<M> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            error: self.error.clone(),
            marker: PhantomData,
        }
    }
}

impl<M> fmt::Debug for ValueSet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSet")
            .field("values", &self.values)
            .field("error", &self.error)
            .finish()
    }
}
