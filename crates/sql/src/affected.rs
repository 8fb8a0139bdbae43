//! Change-impact analysis between queries and mutations
//!
//! Decides whether applying an [`Action`] could change the result of a
//! [`Query`]. Inserts and deletes are checked at table grain since the
//! affected rows are unknown without evaluating predicates. Updates name
//! the columns they write, so they are checked at column grain.

use crate::types::{Action, Query};

/// Whether `action` could change the result of `query`.
pub fn affected(query: &Query, action: &Action) -> bool {
    let tables = query.tables();
    // Different tables never conflict
    if !tables.contains(action.table()) {
        return false;
    }

    match action {
        Action::Insert(_) | Action::Delete(_) => true,
        Action::Update(update) => {
            let read = query.columns_of(&update.table);
            update.values.keys().any(|column| read.contains(column))
        }
    }
}

impl Query {
    /// Whether `action` could change the result of this query.
    pub fn is_affected_by(&self, action: &Action) -> bool {
        affected(self, action)
    }
}
