//! OpsDesk — domain synchronization layer for an IT-support/accounting
//! operations dashboard.
//!
//! Two halves:
//! - `db` + `sync`: SQLite-backed entity stores (companies, systems, tasks,
//!   incidents) with replace-all child-relation writes and refetch-based
//!   consistency.
//! - `mindmap`: an in-memory node/edge document store persisted wholesale as
//!   one JSON collection, with synchronous cascade on node deletion.

pub mod db;
pub mod error;
mod migrations;
pub mod mindmap;
pub mod sync;
pub mod types;
