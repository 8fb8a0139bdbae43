//! Typed property paths and their compilation
//!
//! A [`KeyPath`] names a property of `Root` whose host type is `V`, possibly
//! reached through a chain of to-one relationships. Compiling a path walks
//! the descriptor tables forward, then builds the expression from the last
//! hop backward, wrapping one join per relationship crossed.

use crate::entity::{Entity, Model, PropertyKind};
use crate::error::{CompileError, Result};
use persist_sql::{Column, Expression};
use std::fmt;
use std::marker::PhantomData;

pub struct KeyPath<Root, V> {
    segments: Vec<&'static str>,
    marker: PhantomData<fn(&Root) -> V>,
}

impl<Root, V> KeyPath<Root, V> {
    /// A property of `Root` named `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            segments: vec![name],
            marker: PhantomData,
        }
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    /// Continues the path through the to-one relationship this path ends in.
    pub fn then<W>(mut self, next: KeyPath<V, W>) -> KeyPath<Root, W>
    where
        V: Model,
    {
        self.segments.extend(next.segments);
        KeyPath {
            segments: self.segments,
            marker: PhantomData,
        }
    }
}

impl<Root: Model, V> KeyPath<Root, V> {
    pub fn compile(&self) -> Result<Expression> {
        compile_path(Root::entity(), &self.segments)
    }
}

impl<Root, V> Clone for KeyPath<Root, V> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            marker: PhantomData,
        }
    }
}

impl<Root, V> fmt::Debug for KeyPath<Root, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPath({})", self.segments.join("."))
    }
}

/// Compiles a property path rooted at `root`.
pub(crate) fn compile_path(root: &'static Entity, segments: &[&'static str]) -> Result<Expression> {
    let (last, hops) = segments
        .split_last()
        .ok_or(CompileError::EmptyPath { entity: root.name })?;

    // (entity, relationship, target) for each hop
    let mut traversed = Vec::with_capacity(hops.len());
    let mut entity = root;
    for &segment in hops {
        let property = entity.lookup(segment)?;
        match property.kind {
            PropertyKind::ToOne(target) => {
                let target = target();
                traversed.push((entity, property, target));
                entity = target;
            }
            PropertyKind::ToMany(_) => {
                return Err(CompileError::ToManyTraversal {
                    entity: entity.name,
                    property: property.name,
                });
            }
            PropertyKind::Value(_) => {
                return Err(CompileError::TraversalThroughValue {
                    entity: entity.name,
                    property: property.name,
                });
            }
        }
    }

    let property = entity.lookup(last)?;
    if let PropertyKind::ToMany(_) = property.kind {
        return Err(CompileError::ToManyTraversal {
            entity: entity.name,
            property: property.name,
        });
    }

    let mut expression = Expression::column(entity.name, property.name);
    for (entity, relationship, target) in traversed.into_iter().rev() {
        let id = entity.target_id(relationship, target)?;
        expression = Expression::join(
            Column::new(entity.name, relationship.name),
            Column::new(target.name, id.name),
            expression,
        );
    }
    Ok(expression)
}
