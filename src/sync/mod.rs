//! Entity sync stores: mutate-then-refetch orchestration over the db layer.
//!
//! Each entity (company, system, task, incident) gets a `SyncStore` built
//! around an `EntityAdapter` that knows its parent table and child relations.
//! Every mutation writes the parent row, replaces the declared child sets,
//! then re-fetches the whole list — the post-write shape of a variable number
//! of child tables is only knowable by re-reading, so refetching is what keeps
//! the in-memory list equal to durable state.
//!
//! The adapter is also the injection seam: tests wrap a real adapter to fail
//! child writes and observe the documented partial-failure window.

use parking_lot::Mutex;

use crate::db::{DbError, OpsDb};
use crate::error::SyncError;

pub mod companies;
pub mod incidents;
pub mod systems;
pub mod tasks;

pub use companies::CompanyAdapter;
pub use incidents::IncidentAdapter;
pub use systems::SystemAdapter;
pub use tasks::TaskAdapter;

// ---------------------------------------------------------------------------
// Wire parsing helpers shared by the entity mappers
// ---------------------------------------------------------------------------

use chrono::{DateTime, NaiveDate, Utc};

/// Parse an RFC 3339 timestamp, tolerating malformed rows by falling back to
/// the epoch rather than failing the whole fetch.
pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional timestamp; absent stays absent, never an epoch stand-in.
pub(crate) fn parse_optional_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|v| {
        DateTime::parse_from_rfc3339(v)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Parse a `YYYY-MM-DD` date, tolerating malformed rows.
pub(crate) fn parse_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(DateTime::UNIX_EPOCH.date_naive())
}

/// Parse an optional `YYYY-MM-DD` date; absent stays absent.
pub(crate) fn parse_optional_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

/// Build single-column child rows from a string slice.
pub(crate) fn text_rows(values: &[String]) -> Vec<Vec<rusqlite::types::Value>> {
    values
        .iter()
        .map(|v| vec![rusqlite::types::Value::Text(v.clone())])
        .collect()
}

// ---------------------------------------------------------------------------
// Adapter contract
// ---------------------------------------------------------------------------

/// A child-relation write failure, tagged with the relation that broke.
#[derive(Debug)]
pub struct RelationError {
    pub relation: &'static str,
    pub source: DbError,
}

/// Per-entity glue between the generic store and the db layer.
///
/// `insert_parent` assigns the generated identity (and creation timestamp)
/// and returns the new id; the caller's entity is treated as a draft whose
/// `id`/`created_at` are ignored.
pub trait EntityAdapter {
    type Entity: Clone;

    /// Entity label used in errors and log lines.
    const ENTITY: &'static str;

    /// The identity carried by an existing entity.
    fn entity_id<'a>(&self, entity: &'a Self::Entity) -> &'a str;

    fn fetch_all(&self, db: &OpsDb) -> Result<Vec<Self::Entity>, DbError>;
    fn insert_parent(&self, db: &OpsDb, entity: &Self::Entity) -> Result<String, DbError>;
    fn update_parent(&self, db: &OpsDb, entity: &Self::Entity) -> Result<(), DbError>;
    fn delete_parent(&self, db: &OpsDb, id: &str) -> Result<(), DbError>;

    /// Replace every declared child relation for `id` with the entity's
    /// current child collections.
    fn replace_children(
        &self,
        db: &OpsDb,
        id: &str,
        entity: &Self::Entity,
    ) -> Result<(), RelationError>;
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Snapshot of a store's observable state.
#[derive(Debug, Clone)]
pub struct StoreState<T: Clone> {
    pub items: Vec<T>,
    pub is_loading: bool,
}

impl<T: Clone> Default for StoreState<T> {
    fn default() -> Self {
        StoreState {
            items: Vec::new(),
            is_loading: false,
        }
    }
}

type Subscriber<T> = Box<dyn Fn(&StoreState<T>) + Send>;

/// Generic entity sync store: owns the in-memory list and loading flag,
/// orchestrates fetch-all / create / update / delete.
///
/// Mutations hold the store's operation lock for the whole
/// mutate-then-refetch sequence, so two mutations against the same store
/// cannot interleave their child writes even from separate threads with
/// separate database handles.
pub struct SyncStore<A: EntityAdapter> {
    adapter: A,
    state: Mutex<StoreState<A::Entity>>,
    subscribers: Mutex<Vec<Subscriber<A::Entity>>>,
    /// Held across create/update/delete. Never taken by `fetch_all`, which
    /// mutations call while holding it.
    ops: Mutex<()>,
}

impl<A: EntityAdapter> SyncStore<A> {
    pub fn new(adapter: A) -> Self {
        SyncStore {
            adapter,
            state: Mutex::new(StoreState::default()),
            subscribers: Mutex::new(Vec::new()),
            ops: Mutex::new(()),
        }
    }

    /// Cloned snapshot of the current state. UI layers render from this.
    pub fn snapshot(&self) -> StoreState<A::Entity> {
        self.state.lock().clone()
    }

    /// Register a callback invoked after every state change.
    pub fn subscribe(&self, subscriber: impl Fn(&StoreState<A::Entity>) + Send + 'static) {
        self.subscribers.lock().push(Box::new(subscriber));
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for subscriber in self.subscribers.lock().iter() {
            subscriber(&snapshot);
        }
    }

    /// Load every entity, newest first, and replace `items` wholesale.
    ///
    /// On failure `items` keeps its previous value; the loading flag is
    /// cleared either way.
    pub fn fetch_all(&self, db: &OpsDb) -> Result<(), SyncError> {
        self.state.lock().is_loading = true;
        self.notify();

        let result = self.adapter.fetch_all(db);

        {
            let mut state = self.state.lock();
            state.is_loading = false;
            if let Ok(ref items) = result {
                state.items = items.clone();
            }
        }
        self.notify();

        match result {
            Ok(_) => Ok(()),
            Err(source) => Err(SyncError::Read {
                entity: A::ENTITY,
                source,
            }),
        }
    }

    /// Insert a new entity (the draft's id/created_at are ignored), replace
    /// its child relations, refetch. Returns the generated identity.
    pub fn create(&self, db: &OpsDb, draft: &A::Entity) -> Result<String, SyncError> {
        let _guard = self.ops.lock();
        let id = self
            .adapter
            .insert_parent(db, draft)
            .map_err(|source| SyncError::ParentWrite {
                entity: A::ENTITY,
                source,
            })?;

        if let Err(e) = self.adapter.replace_children(db, &id, draft) {
            log::warn!(
                "{} {id}: relation '{}' left inconsistent after create: {}",
                A::ENTITY,
                e.relation,
                e.source
            );
            return Err(SyncError::ChildWrite {
                entity: A::ENTITY,
                id,
                relation: e.relation,
                source: e.source,
            });
        }

        self.fetch_all(db)?;
        Ok(id)
    }

    /// Update the parent row, replace every child relation, refetch.
    pub fn update(&self, db: &OpsDb, entity: &A::Entity) -> Result<(), SyncError> {
        let _guard = self.ops.lock();
        let id = self.adapter.entity_id(entity).to_string();
        self.adapter
            .update_parent(db, entity)
            .map_err(|source| SyncError::ParentWrite {
                entity: A::ENTITY,
                source,
            })?;

        if let Err(e) = self.adapter.replace_children(db, &id, entity) {
            log::warn!(
                "{} {id}: relation '{}' left inconsistent after update: {}",
                A::ENTITY,
                e.relation,
                e.source
            );
            return Err(SyncError::ChildWrite {
                entity: A::ENTITY,
                id,
                relation: e.relation,
                source: e.source,
            });
        }

        self.fetch_all(db)
    }

    /// Delete the parent row (child rows fall to the schema's ON DELETE
    /// CASCADE), then refetch.
    pub fn delete(&self, db: &OpsDb, id: &str) -> Result<(), SyncError> {
        let _guard = self.ops.lock();
        self.adapter
            .delete_parent(db, id)
            .map_err(|source| SyncError::ParentWrite {
                entity: A::ENTITY,
                source,
            })?;
        self.fetch_all(db)
    }
}

// =============================================================================
// Tests
// =============================================================================
