//! Error taxonomy for the sync layer.
//!
//! Failures are classified by where in the mutate-then-refetch cycle they
//! happen:
//! - Read: a fetch-all failed; in-memory state is left as it was.
//! - ParentWrite: the parent row write failed; no child writes were attempted,
//!   so no partial state exists.
//! - ChildWrite: a child-relation write failed after the parent row was
//!   already written; the parent reflects the new values while that relation's
//!   children may be stale, empty, or partially replaced until the next
//!   successful write.

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to load {entity} records: {source}")]
    Read {
        entity: &'static str,
        #[source]
        source: DbError,
    },

    #[error("failed to write {entity} record: {source}")]
    ParentWrite {
        entity: &'static str,
        #[source]
        source: DbError,
    },

    #[error("{entity} {id}: '{relation}' update failed after the record was saved: {source}")]
    ChildWrite {
        entity: &'static str,
        id: String,
        relation: &'static str,
        #[source]
        source: DbError,
    },
}

impl SyncError {
    /// True when the parent row was written but a child relation was not —
    /// the caller should warn the user that part of the change is missing.
    pub fn is_partial(&self) -> bool {
        matches!(self, SyncError::ChildWrite { .. })
    }

    /// Single human-readable line for the notification surface. No structured
    /// codes are exposed beyond this.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Read { entity, .. } => {
                format!("Could not load {entity} data. Check the connection and try again.")
            }
            SyncError::ParentWrite { entity, .. } => {
                format!("Could not save the {entity}. Nothing was changed.")
            }
            SyncError::ChildWrite { entity, relation, .. } => format!(
                "The {entity} was saved, but its {relation} could not be updated. \
                 Save again to retry."
            ),
        }
    }
}
