//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    /// A replace-all child write failed after the delete step already ran.
    /// `inserted` of `expected` rows made it in before the failure, so the
    /// parent is left with a partial (possibly empty) child set until the
    /// next successful write.
    #[error("Replace of {table} rows partially applied ({inserted}/{expected}): {source}")]
    PartialReplace {
        table: &'static str,
        inserted: usize,
        expected: usize,
        #[source]
        source: rusqlite::Error,
    },
}

/// Describes one child relation of a parent table for the replace-all writer.
#[derive(Debug, Clone, Copy)]
pub struct ChildRelation {
    pub table: &'static str,
    pub fk_column: &'static str,
    pub value_columns: &'static [&'static str],
    /// Set-like relations carry a UNIQUE constraint and collapse duplicate
    /// input rows silently; ordered lists (subtasks, notes) insert verbatim.
    pub dedupe: bool,
}

pub const SYSTEM_TAGS: ChildRelation = ChildRelation {
    table: "system_tags",
    fk_column: "system_id",
    value_columns: &["tag"],
    dedupe: true,
};

pub const SYSTEM_COMPANIES: ChildRelation = ChildRelation {
    table: "system_companies",
    fk_column: "system_id",
    value_columns: &["company_id"],
    dedupe: true,
};

pub const SYSTEM_USERS: ChildRelation = ChildRelation {
    table: "system_users",
    fk_column: "system_id",
    value_columns: &["user_id"],
    dedupe: true,
};

pub const TASK_REMINDER_CHANNELS: ChildRelation = ChildRelation {
    table: "task_reminder_channels",
    fk_column: "task_id",
    value_columns: &["channel"],
    dedupe: true,
};

pub const SUBTASKS: ChildRelation = ChildRelation {
    table: "subtasks",
    fk_column: "task_id",
    value_columns: &["id", "title", "completed", "position"],
    dedupe: false,
};

pub const INCIDENT_SYSTEMS: ChildRelation = ChildRelation {
    table: "incident_systems",
    fk_column: "incident_id",
    value_columns: &["system_id"],
    dedupe: true,
};

pub const INCIDENT_NOTES: ChildRelation = ChildRelation {
    table: "incident_notes",
    fk_column: "incident_id",
    value_columns: &["note", "position"],
    dedupe: false,
};

/// A row from the `companies` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbCompany {
    pub id: String,
    pub name: String,
    pub legal_id: String,
    pub responsible: String,
    pub segment: String,
    pub regime: String,
    pub complexity: String,
    pub fiscal_automation: bool,
    pub accounting_automation: bool,
    pub payroll_automation: bool,
    pub billing_automation: bool,
    pub document_automation: bool,
    pub created_at: String,
}

/// A row from the `systems` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSystem {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub responsible: String,
    pub status: String,
    pub start_date: String,
    pub expected_end: String,
    pub actual_end: Option<String>,
    pub progress: i64,
    pub implemented: bool,
    pub url: Option<String>,
    pub created_at: String,
}

/// A row from the `tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub system_id: Option<String>,
    pub company_id: Option<String>,
    pub priority: String,
    pub status: String,
    pub due_date: String,
    pub completed_at: Option<String>,
    pub reminder_enabled: bool,
    pub created_at: String,
}

/// A row from the `subtasks` table, ordered by `position`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSubtask {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub completed: bool,
    pub position: i64,
}

/// A row from the `incidents` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbIncident {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company_id: String,
    pub severity: String,
    pub status: String,
    pub resolved_at: Option<String>,
    pub created_at: String,
}
