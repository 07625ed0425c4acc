use super::*;

impl OpsDb {
    // =========================================================================
    // Systems
    // =========================================================================

    /// Helper: map a row to `DbSystem`.
    pub(crate) fn map_system_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbSystem> {
        Ok(DbSystem {
            id: row.get(0)?,
            name: row.get(1)?,
            version: row.get(2)?,
            description: row.get(3)?,
            responsible: row.get(4)?,
            status: row.get(5)?,
            start_date: row.get(6)?,
            expected_end: row.get(7)?,
            actual_end: row.get(8)?,
            progress: row.get(9)?,
            implemented: row.get(10)?,
            url: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    const SYSTEM_COLUMNS: &'static str = "id, name, version, description, responsible, status, \
         start_date, expected_end, actual_end, progress, implemented, url, created_at";

    pub fn insert_system(&self, system: &DbSystem) -> Result<(), DbError> {
        self.conn.execute(
            &format!(
                "INSERT INTO systems ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                Self::SYSTEM_COLUMNS
            ),
            params![
                system.id,
                system.name,
                system.version,
                system.description,
                system.responsible,
                system.status,
                system.start_date,
                system.expected_end,
                system.actual_end,
                system.progress,
                system.implemented,
                system.url,
                system.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn update_system(&self, system: &DbSystem) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE systems SET
                name = ?2, version = ?3, description = ?4, responsible = ?5,
                status = ?6, start_date = ?7, expected_end = ?8, actual_end = ?9,
                progress = ?10, implemented = ?11, url = ?12
             WHERE id = ?1",
            params![
                system.id,
                system.name,
                system.version,
                system.description,
                system.responsible,
                system.status,
                system.start_date,
                system.expected_end,
                system.actual_end,
                system.progress,
                system.implemented,
                system.url,
            ],
        )?;
        Ok(())
    }

    pub fn delete_system(&self, id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM systems WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Get all systems, newest first.
    pub fn get_all_systems(&self) -> Result<Vec<DbSystem>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM systems ORDER BY created_at DESC",
            Self::SYSTEM_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_system_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_system(&self, id: &str) -> Result<Option<DbSystem>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM systems WHERE id = ?1",
            Self::SYSTEM_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_system_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_system_tags(&self, system_id: &str) -> Result<Vec<String>, DbError> {
        self.get_child_values(&SYSTEM_TAGS, system_id)
    }

    pub fn get_system_companies(&self, system_id: &str) -> Result<Vec<String>, DbError> {
        self.get_child_values(&SYSTEM_COMPANIES, system_id)
    }

    pub fn get_system_users(&self, system_id: &str) -> Result<Vec<String>, DbError> {
        self.get_child_values(&SYSTEM_USERS, system_id)
    }
}
