use super::*;

impl OpsDb {
    // =========================================================================
    // Tasks
    // =========================================================================

    /// Helper: map a row to `DbTask`.
    pub(crate) fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbTask> {
        Ok(DbTask {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            system_id: row.get(3)?,
            company_id: row.get(4)?,
            priority: row.get(5)?,
            status: row.get(6)?,
            due_date: row.get(7)?,
            completed_at: row.get(8)?,
            reminder_enabled: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    const TASK_COLUMNS: &'static str = "id, title, description, system_id, company_id, priority, \
         status, due_date, completed_at, reminder_enabled, created_at";

    pub fn insert_task(&self, task: &DbTask) -> Result<(), DbError> {
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                Self::TASK_COLUMNS
            ),
            params![
                task.id,
                task.title,
                task.description,
                task.system_id,
                task.company_id,
                task.priority,
                task.status,
                task.due_date,
                task.completed_at,
                task.reminder_enabled,
                task.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn update_task(&self, task: &DbTask) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE tasks SET
                title = ?2, description = ?3, system_id = ?4, company_id = ?5,
                priority = ?6, status = ?7, due_date = ?8, completed_at = ?9,
                reminder_enabled = ?10
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.description,
                task.system_id,
                task.company_id,
                task.priority,
                task.status,
                task.due_date,
                task.completed_at,
                task.reminder_enabled,
            ],
        )?;
        Ok(())
    }

    pub fn delete_task(&self, id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Get all tasks, newest first.
    pub fn get_all_tasks(&self) -> Result<Vec<DbTask>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY created_at DESC",
            Self::TASK_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_task_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_task(&self, id: &str) -> Result<Option<DbTask>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE id = ?1",
            Self::TASK_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_task_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_task_channels(&self, task_id: &str) -> Result<Vec<String>, DbError> {
        self.get_child_values(&TASK_REMINDER_CHANNELS, task_id)
    }

    /// Get a task's subtasks in list order.
    pub fn get_subtasks(&self, task_id: &str) -> Result<Vec<DbSubtask>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, title, completed, position
             FROM subtasks WHERE task_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![task_id], |row| {
            Ok(DbSubtask {
                id: row.get(0)?,
                task_id: row.get(1)?,
                title: row.get(2)?,
                completed: row.get(3)?,
                position: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
