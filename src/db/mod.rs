//! SQLite-backed relational store for the dashboard's entities.
//!
//! The database lives at `~/.opsdesk/opsdesk.db`. Parent tables (`companies`,
//! `systems`, `tasks`, `incidents`) hold the scalar fields; child tables hold
//! the tag/company/user/channel sets and the ordered subtask/note lists, all
//! scoped by foreign-key equality. Reads and writes here are row-level only —
//! the nesting into domain entities happens in the `sync` layer.

use std::path::PathBuf;

use rusqlite::{params, params_from_iter, types::Value, Connection};

pub mod types;
pub use types::*;

pub mod companies;
pub mod incidents;
pub mod systems;
pub mod tasks;

pub struct OpsDb {
    conn: Connection,
}

impl OpsDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `~/.opsdesk/opsdesk.db` and apply the
    /// schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Useful for testing.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        // Child tables declare ON DELETE CASCADE; enforcement only happens
        // with this pragma on.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.opsdesk/opsdesk.db`.
    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".opsdesk").join("opsdesk.db"))
    }

    /// Replace the full child set of `parent_id` for one relation.
    ///
    /// Two steps: delete every existing row for the parent, then insert one
    /// row per item. The delete always runs, even for an empty target set, so
    /// stale children drain correctly. The two steps are not wrapped in a
    /// transaction — this mirrors a row-level remote store — so a failed
    /// insert after the delete leaves a partial child set, reported as
    /// `DbError::PartialReplace` with the applied count.
    pub fn replace_children(
        &self,
        relation: &ChildRelation,
        parent_id: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), DbError> {
        self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1",
                relation.table, relation.fk_column
            ),
            params![parent_id],
        )?;

        if rows.is_empty() {
            return Ok(());
        }

        let placeholders = (1..=relation.value_columns.len() + 1)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let verb = if relation.dedupe {
            "INSERT OR IGNORE"
        } else {
            "INSERT"
        };
        let sql = format!(
            "{verb} INTO {} ({}, {}) VALUES ({placeholders})",
            relation.table,
            relation.fk_column,
            relation.value_columns.join(", "),
        );
        let mut stmt = self.conn.prepare(&sql)?;

        for (inserted, row) in rows.iter().enumerate() {
            let mut values = Vec::with_capacity(row.len() + 1);
            values.push(Value::Text(parent_id.to_string()));
            values.extend(row.iter().cloned());
            stmt.execute(params_from_iter(values))
                .map_err(|e| DbError::PartialReplace {
                    table: relation.table,
                    inserted,
                    expected: rows.len(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Load the single-column child values for a parent, e.g. a system's tags.
    pub(crate) fn get_child_values(
        &self,
        relation: &ChildRelation,
        parent_id: &str,
    ) -> Result<Vec<String>, DbError> {
        let order = if relation.dedupe {
            String::new()
        } else {
            " ORDER BY position".to_string()
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} WHERE {} = ?1{order}",
            relation.value_columns[0], relation.table, relation.fk_column,
        ))?;
        let rows = stmt.query_map(params![parent_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Count rows in a child table whose parent row no longer exists.
    /// Diagnostic used by the consistency tests.
    pub fn count_orphans(&self, relation: &ChildRelation, parent_table: &str) -> Result<i64, DbError> {
        let count = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} c
                 LEFT JOIN {parent_table} p ON p.id = c.{}
                 WHERE p.id IS NULL",
                relation.table, relation.fk_column,
            ),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::OpsDb;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the
    /// test. Test temp dirs are cleaned up by the OS.
    pub fn test_db() -> OpsDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        OpsDb::open_at(path).expect("Failed to open test database")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;
    use chrono::Utc;

    fn sample_company(id: &str, name: &str) -> DbCompany {
        DbCompany {
            id: id.to_string(),
            name: name.to_string(),
            legal_id: "12.345.678/0001-90".to_string(),
            responsible: "Ana".to_string(),
            segment: "services".to_string(),
            regime: "simples".to_string(),
            complexity: "low".to_string(),
            fiscal_automation: true,
            accounting_automation: false,
            payroll_automation: false,
            billing_automation: true,
            document_automation: false,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    fn sample_system(id: &str, name: &str) -> DbSystem {
        DbSystem {
            id: id.to_string(),
            name: name.to_string(),
            version: "1.0".to_string(),
            description: "ERP rollout".to_string(),
            responsible: "Bruno".to_string(),
            status: "in_progress".to_string(),
            start_date: "2026-01-15".to_string(),
            expected_end: "2026-06-30".to_string(),
            actual_end: None,
            progress: 40,
            implemented: false,
            url: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_open_creates_tables() {
        let db = test_db();
        for table in [
            "companies",
            "systems",
            "tasks",
            "incidents",
            "system_tags",
            "system_companies",
            "system_users",
            "task_reminder_channels",
            "subtasks",
            "incident_systems",
            "incident_notes",
        ] {
            let count: i64 = db
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap_or_else(|_| panic!("{table} table should exist"));
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_replace_children_inserts_full_set() {
        let db = test_db();
        db.insert_company(&sample_company("c1", "Acme Contábil"))
            .expect("insert company");
        db.insert_system(&sample_system("s1", "ERP")).expect("insert system");

        let rows = vec![
            vec![Value::Text("fiscal".to_string())],
            vec![Value::Text("erp".to_string())],
        ];
        db.replace_children(&SYSTEM_TAGS, "s1", &rows)
            .expect("replace tags");

        let tags = db.get_child_values(&SYSTEM_TAGS, "s1").expect("load tags");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&"fiscal".to_string()));
        assert!(tags.contains(&"erp".to_string()));
    }

    #[test]
    fn test_replace_children_empty_set_drains_existing() {
        let db = test_db();
        db.insert_system(&sample_system("s1", "ERP")).expect("insert system");

        let rows = vec![vec![Value::Text("fiscal".to_string())]];
        db.replace_children(&SYSTEM_TAGS, "s1", &rows)
            .expect("seed tags");

        db.replace_children(&SYSTEM_TAGS, "s1", &[])
            .expect("drain tags");

        let tags = db.get_child_values(&SYSTEM_TAGS, "s1").expect("load tags");
        assert!(tags.is_empty(), "empty target set must remove all children");
    }

    #[test]
    fn test_replace_children_collapses_duplicates() {
        let db = test_db();
        db.insert_system(&sample_system("s1", "ERP")).expect("insert system");

        let rows = vec![
            vec![Value::Text("fiscal".to_string())],
            vec![Value::Text("fiscal".to_string())],
            vec![Value::Text("erp".to_string())],
        ];
        db.replace_children(&SYSTEM_TAGS, "s1", &rows)
            .expect("replace tags");

        let tags = db.get_child_values(&SYSTEM_TAGS, "s1").expect("load tags");
        assert_eq!(tags.len(), 2, "duplicate input rows collapse silently");
    }

    #[test]
    fn test_replace_children_replaces_not_appends() {
        let db = test_db();
        db.insert_system(&sample_system("s1", "ERP")).expect("insert system");

        db.replace_children(
            &SYSTEM_TAGS,
            "s1",
            &[
                vec![Value::Text("fiscal".to_string())],
                vec![Value::Text("erp".to_string())],
            ],
        )
        .expect("first write");

        db.replace_children(&SYSTEM_TAGS, "s1", &[vec![Value::Text("fiscal".to_string())]])
            .expect("second write");

        let tags = db.get_child_values(&SYSTEM_TAGS, "s1").expect("load tags");
        assert_eq!(tags, vec!["fiscal".to_string()]);
    }

    #[test]
    fn test_parent_delete_cascades_to_children() {
        let db = test_db();
        db.insert_system(&sample_system("s1", "ERP")).expect("insert system");
        db.replace_children(&SYSTEM_TAGS, "s1", &[vec![Value::Text("fiscal".to_string())]])
            .expect("tags");

        db.delete_system("s1").expect("delete system");

        let orphans = db
            .count_orphans(&SYSTEM_TAGS, "systems")
            .expect("count orphans");
        assert_eq!(orphans, 0, "cascade must remove child rows with the parent");
        let tags = db.get_child_values(&SYSTEM_TAGS, "s1").expect("load tags");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_idempotent_schema_application() {
        // Opening the same DB twice should not error (migrations run once)
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("idempotent.db");

        let _db1 = OpsDb::open_at(path.clone()).expect("first open");
        let _db2 = OpsDb::open_at(path).expect("second open should not fail");
    }
}
