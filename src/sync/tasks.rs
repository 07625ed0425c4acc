//! Task mapper and adapter.
//!
//! Children: reminder channel set and the ordered subtask list. Subtask rows
//! carry an explicit `position` so the list order survives the round trip.
//! The completion invariant (`completed_at` iff `Completed`) is re-applied
//! before every write.

use chrono::Utc;
use rusqlite::types::Value;
use uuid::Uuid;

use super::{
    parse_date, parse_optional_timestamp, parse_timestamp, text_rows, EntityAdapter, RelationError,
};
use crate::db::{DbError, DbSubtask, DbTask, OpsDb, SUBTASKS, TASK_REMINDER_CHANNELS};
use crate::types::{Priority, ReminderChannel, Subtask, Task, TaskStatus};

/// Raw row plus child rows → nested domain entity.
pub(crate) fn to_domain(row: DbTask, channels: Vec<String>, subtasks: Vec<DbSubtask>) -> Task {
    Task {
        priority: Priority::from_str_lossy(&row.priority),
        status: TaskStatus::from_str_lossy(&row.status),
        due_date: parse_date(&row.due_date),
        completed_at: parse_optional_timestamp(row.completed_at.as_deref()),
        created_at: parse_timestamp(&row.created_at),
        reminder_channels: channels
            .iter()
            .map(|c| ReminderChannel::from_str_lossy(c))
            .collect(),
        subtasks: subtasks
            .into_iter()
            .map(|s| Subtask {
                id: s.id,
                title: s.title,
                completed: s.completed,
            })
            .collect(),
        id: row.id,
        title: row.title,
        description: row.description,
        system_id: row.system_id,
        company_id: row.company_id,
        reminder_enabled: row.reminder_enabled,
    }
}

/// Domain entity → parent-row payload.
pub(crate) fn to_row(task: &Task) -> DbTask {
    DbTask {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        system_id: task.system_id.clone(),
        company_id: task.company_id.clone(),
        priority: task.priority.as_str().to_string(),
        status: task.status.as_str().to_string(),
        due_date: task.due_date.format("%Y-%m-%d").to_string(),
        completed_at: task.completed_at.map(|t| t.to_rfc3339()),
        reminder_enabled: task.reminder_enabled,
        created_at: task.created_at.to_rfc3339(),
    }
}

/// Subtask list → child rows with positions. Subtasks without an id (fresh
/// from the form) get one assigned here.
pub(crate) fn subtask_rows(subtasks: &[Subtask]) -> Vec<Vec<Value>> {
    subtasks
        .iter()
        .enumerate()
        .map(|(position, subtask)| {
            let id = if subtask.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                subtask.id.clone()
            };
            vec![
                Value::Text(id),
                Value::Text(subtask.title.clone()),
                Value::Integer(i64::from(subtask.completed)),
                Value::Integer(position as i64),
            ]
        })
        .collect()
}

pub struct TaskAdapter;

impl EntityAdapter for TaskAdapter {
    type Entity = Task;
    const ENTITY: &'static str = "task";

    fn entity_id<'a>(&self, entity: &'a Task) -> &'a str {
        &entity.id
    }

    fn fetch_all(&self, db: &OpsDb) -> Result<Vec<Task>, DbError> {
        let rows = db.get_all_tasks()?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let channels = db.get_task_channels(&row.id)?;
            let subtasks = db.get_subtasks(&row.id)?;
            items.push(to_domain(row, channels, subtasks));
        }
        Ok(items)
    }

    fn insert_parent(&self, db: &OpsDb, entity: &Task) -> Result<String, DbError> {
        let mut row = to_row(&entity.normalized());
        row.id = Uuid::new_v4().to_string();
        row.created_at = Utc::now().to_rfc3339();
        db.insert_task(&row)?;
        Ok(row.id)
    }

    fn update_parent(&self, db: &OpsDb, entity: &Task) -> Result<(), DbError> {
        db.update_task(&to_row(&entity.normalized()))
    }

    fn delete_parent(&self, db: &OpsDb, id: &str) -> Result<(), DbError> {
        db.delete_task(id)
    }

    fn replace_children(&self, db: &OpsDb, id: &str, entity: &Task) -> Result<(), RelationError> {
        let channels: Vec<String> = entity
            .reminder_channels
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        db.replace_children(&TASK_REMINDER_CHANNELS, id, &text_rows(&channels))
            .map_err(|source| RelationError {
                relation: "reminder channels",
                source,
            })?;
        db.replace_children(&SUBTASKS, id, &subtask_rows(&entity.subtasks))
            .map_err(|source| RelationError {
                relation: "subtasks",
                source,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::sync::SyncStore;

    fn sample() -> Task {
        Task {
            id: "t1".to_string(),
            title: "Monthly closing".to_string(),
            description: "Close the fiscal month".to_string(),
            system_id: Some("s1".to_string()),
            company_id: None,
            priority: Priority::High,
            status: TaskStatus::Pending,
            due_date: parse_date("2026-09-05"),
            completed_at: None,
            reminder_enabled: true,
            created_at: parse_timestamp("2026-08-20T09:00:00+00:00"),
            reminder_channels: vec![ReminderChannel::Email, ReminderChannel::Whatsapp],
            subtasks: vec![
                Subtask {
                    id: "st1".to_string(),
                    title: "Collect invoices".to_string(),
                    completed: true,
                },
                Subtask {
                    id: "st2".to_string(),
                    title: "Reconcile bank".to_string(),
                    completed: false,
                },
            ],
        }
    }

    #[test]
    fn test_round_trip_preserves_scalars_and_subtask_order() {
        let task = sample();
        let row = to_row(&task);
        let subtasks: Vec<DbSubtask> = task
            .subtasks
            .iter()
            .enumerate()
            .map(|(i, s)| DbSubtask {
                id: s.id.clone(),
                task_id: task.id.clone(),
                title: s.title.clone(),
                completed: s.completed,
                position: i as i64,
            })
            .collect();
        let channels = vec!["email".to_string(), "whatsapp".to_string()];

        let round_tripped = to_domain(row, channels, subtasks);
        assert_eq!(round_tripped, task);
    }

    #[test]
    fn test_subtask_rows_assign_missing_ids() {
        let rows = subtask_rows(&[Subtask {
            id: String::new(),
            title: "New".to_string(),
            completed: false,
        }]);
        assert_eq!(rows.len(), 1);
        match &rows[0][0] {
            Value::Text(id) => assert!(!id.is_empty(), "fresh subtask gets an id"),
            other => panic!("expected text id, got {other:?}"),
        }
    }

    #[test]
    fn test_create_persists_subtasks_in_order() {
        let db = test_db();
        let store = SyncStore::new(TaskAdapter);

        store.create(&db, &sample()).expect("create");

        let task = store.snapshot().items[0].clone();
        assert_eq!(task.subtasks.len(), 2);
        assert_eq!(task.subtasks[0].title, "Collect invoices");
        assert_eq!(task.subtasks[1].title, "Reconcile bank");
        assert_eq!(task.reminder_channels.len(), 2);
    }

    #[test]
    fn test_write_normalizes_stray_completed_at() {
        let db = test_db();
        let store = SyncStore::new(TaskAdapter);

        // A pending task arriving from a form with a leftover completed_at
        let mut draft = sample();
        draft.completed_at = Some(Utc::now());
        store.create(&db, &draft).expect("create");

        let task = store.snapshot().items[0].clone();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_completing_task_sets_completed_at() {
        let db = test_db();
        let store = SyncStore::new(TaskAdapter);
        store.create(&db, &sample()).expect("create");

        let mut task = store.snapshot().items[0].clone();
        task.set_status(TaskStatus::Completed);
        store.update(&db, &task).expect("update");

        let task = store.snapshot().items[0].clone();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed_at.is_some());
    }
}
