use super::*;

impl OpsDb {
    // =========================================================================
    // Incidents
    // =========================================================================

    /// Helper: map a row to `DbIncident`.
    pub(crate) fn map_incident_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbIncident> {
        Ok(DbIncident {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            company_id: row.get(3)?,
            severity: row.get(4)?,
            status: row.get(5)?,
            resolved_at: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    const INCIDENT_COLUMNS: &'static str =
        "id, title, description, company_id, severity, status, resolved_at, created_at";

    pub fn insert_incident(&self, incident: &DbIncident) -> Result<(), DbError> {
        self.conn.execute(
            &format!(
                "INSERT INTO incidents ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                Self::INCIDENT_COLUMNS
            ),
            params![
                incident.id,
                incident.title,
                incident.description,
                incident.company_id,
                incident.severity,
                incident.status,
                incident.resolved_at,
                incident.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn update_incident(&self, incident: &DbIncident) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE incidents SET
                title = ?2, description = ?3, company_id = ?4, severity = ?5,
                status = ?6, resolved_at = ?7
             WHERE id = ?1",
            params![
                incident.id,
                incident.title,
                incident.description,
                incident.company_id,
                incident.severity,
                incident.status,
                incident.resolved_at,
            ],
        )?;
        Ok(())
    }

    pub fn delete_incident(&self, id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM incidents WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Get all incidents, newest first.
    pub fn get_all_incidents(&self) -> Result<Vec<DbIncident>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM incidents ORDER BY created_at DESC",
            Self::INCIDENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_incident_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_incident(&self, id: &str) -> Result<Option<DbIncident>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM incidents WHERE id = ?1",
            Self::INCIDENT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_incident_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_incident_systems(&self, incident_id: &str) -> Result<Vec<String>, DbError> {
        self.get_child_values(&INCIDENT_SYSTEMS, incident_id)
    }

    /// Get an incident's notes in list order.
    pub fn get_incident_notes(&self, incident_id: &str) -> Result<Vec<String>, DbError> {
        self.get_child_values(&INCIDENT_NOTES, incident_id)
    }
}
