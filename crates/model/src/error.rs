//! Compile errors
//!
//! These indicate that a query or mutation disagrees with the declared
//! models. They are never defaulted: no statement is produced.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Empty property path on {entity}")]
    EmptyPath { entity: &'static str },

    #[error("Unknown property {entity}.{property}")]
    UnknownProperty {
        entity: &'static str,
        property: &'static str,
    },

    #[error("To-many relationship {entity}.{property} cannot appear in a property path")]
    ToManyTraversal {
        entity: &'static str,
        property: &'static str,
    },

    #[error("Cannot traverse through value property {entity}.{property}")]
    TraversalThroughValue {
        entity: &'static str,
        property: &'static str,
    },

    #[error("Relationship target {target} of {entity}.{property} has no identifying property {id}")]
    UnresolvableTarget {
        entity: &'static str,
        property: &'static str,
        target: &'static str,
        id: &'static str,
    },

    #[error("Assignment to {path} traverses a relationship")]
    RelationshipPathAssignment { path: String },

    #[error("{function} needs at least {min} arguments, got {got}")]
    TooFewArguments {
        function: &'static str,
        min: usize,
        got: usize,
    },

    #[error("Result name {0} is selected twice")]
    DuplicateResultName(String),

    #[error("Invalid schema: {0}")]
    Schema(#[from] persist_sql::Error),
}
