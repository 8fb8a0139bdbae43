//! Model descriptors
//!
//! Each model declares a static [`Entity`]: its table name, identifying
//! property and a table of property descriptors. The compiler consults
//! these tables directly; nothing is discovered at runtime.

use crate::error::{CompileError, Result};
use persist_sql::{ColumnDef, Schema};
use persist_value::{DataType, Field};

/// A model type backed by one table.
pub trait Model: 'static {
    /// Host type of the identifying property.
    type Id: Field;

    fn entity() -> &'static Entity;
}

/// Value assigned by the store when an insert leaves a property unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// The engine's current time, as real seconds since the Unix epoch.
    Now,
    Integer(i64),
    Real(f64),
    Text(&'static str),
    /// A freshly generated v4 UUID in hyphenated text form.
    Uuid,
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyKind {
    /// A column holding a value.
    Value(DataType),
    /// A column holding the identifier of exactly one related entity.
    ToOne(fn() -> &'static Entity),
    /// Any number of related entities; has no column of its own.
    ToMany(fn() -> &'static Entity),
}

#[derive(Debug, Clone, Copy)]
pub struct Property {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
}

impl Property {
    pub const fn value(name: &'static str, data_type: DataType) -> Self {
        Self {
            name,
            kind: PropertyKind::Value(data_type),
            nullable: false,
            default: None,
        }
    }

    pub const fn to_one(name: &'static str, target: fn() -> &'static Entity) -> Self {
        Self {
            name,
            kind: PropertyKind::ToOne(target),
            nullable: false,
            default: None,
        }
    }

    pub const fn to_many(name: &'static str, target: fn() -> &'static Entity) -> Self {
        Self {
            name,
            kind: PropertyKind::ToMany(target),
            nullable: true,
            default: None,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn with_default(self, default: DefaultValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Whether the property is stored in a column of its model's table.
    pub fn has_column(&self) -> bool {
        !matches!(self.kind, PropertyKind::ToMany(_))
    }

    /// Whether an insert must assign this property explicitly.
    pub fn is_required_for_insert(&self) -> bool {
        self.has_column() && !self.nullable && self.default.is_none()
    }
}

/// Static description of a model.
#[derive(Debug)]
pub struct Entity {
    /// Table name.
    pub name: &'static str,
    /// Name of the identifying property.
    pub id: &'static str,
    pub properties: &'static [Property],
}

impl Entity {
    pub fn property(&self, name: &str) -> Option<&'static Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub(crate) fn lookup(&self, name: &'static str) -> Result<&'static Property> {
        self.property(name).ok_or(CompileError::UnknownProperty {
            entity: self.name,
            property: name,
        })
    }

    /// Resolves the target of a relationship and its identifying property.
    pub(crate) fn target_id(
        &self,
        relationship: &Property,
        target: &'static Entity,
    ) -> Result<&'static Property> {
        match target.property(target.id) {
            Some(id) if id.has_column() => Ok(id),
            _ => Err(CompileError::UnresolvableTarget {
                entity: self.name,
                property: relationship.name,
                target: target.name,
                id: target.id,
            }),
        }
    }

    /// Column type of a property, following to-one relationships to the
    /// data type of the target's identifier.
    fn data_type(&self, property: &Property) -> Result<Option<DataType>> {
        match property.kind {
            PropertyKind::Value(data_type) => Ok(Some(data_type)),
            PropertyKind::ToOne(target) => {
                let target = target();
                let id = self.target_id(property, target)?;
                match id.kind {
                    PropertyKind::Value(data_type) => Ok(Some(data_type)),
                    // A relationship used as an identifier is not supported
                    _ => Err(CompileError::UnresolvableTarget {
                        entity: self.name,
                        property: property.name,
                        target: target.name,
                        id: target.id,
                    }),
                }
            }
            PropertyKind::ToMany(_) => Ok(None),
        }
    }

    /// The table this model is stored in.
    pub fn schema(&self) -> Result<Schema> {
        self.lookup(self.id)?;

        let mut columns = Vec::with_capacity(self.properties.len());
        for property in self.properties {
            let Some(data_type) = self.data_type(property)? else {
                continue;
            };
            let column = ColumnDef::new(property.name, data_type).nullable(property.nullable);
            columns.push(if property.name == self.id {
                column.primary_key()
            } else {
                column
            });
        }
        Ok(Schema::new(self.name, columns)?)
    }

    /// Properties an insert must assign explicitly.
    pub fn required_for_insert(&self) -> Vec<&'static Property> {
        self.properties
            .iter()
            .filter(|p| p.is_required_for_insert())
            .collect()
    }
}
