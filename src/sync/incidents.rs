//! Incident mapper and adapter.
//!
//! Children: linked system ids (set) and the ordered free-text note list.
//! The resolution invariant (`resolved_at` iff `Resolved`) is re-applied
//! before every write.

use chrono::Utc;
use rusqlite::types::Value;
use uuid::Uuid;

use super::{parse_optional_timestamp, parse_timestamp, text_rows, EntityAdapter, RelationError};
use crate::db::{DbError, DbIncident, OpsDb, INCIDENT_NOTES, INCIDENT_SYSTEMS};
use crate::types::{Incident, IncidentStatus, Severity};

/// Raw row plus child rows → nested domain entity.
pub(crate) fn to_domain(row: DbIncident, system_ids: Vec<String>, notes: Vec<String>) -> Incident {
    Incident {
        severity: Severity::from_str_lossy(&row.severity),
        status: IncidentStatus::from_str_lossy(&row.status),
        resolved_at: parse_optional_timestamp(row.resolved_at.as_deref()),
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        title: row.title,
        description: row.description,
        company_id: row.company_id,
        system_ids,
        notes,
    }
}

/// Domain entity → parent-row payload.
pub(crate) fn to_row(incident: &Incident) -> DbIncident {
    DbIncident {
        id: incident.id.clone(),
        title: incident.title.clone(),
        description: incident.description.clone(),
        company_id: incident.company_id.clone(),
        severity: incident.severity.as_str().to_string(),
        status: incident.status.as_str().to_string(),
        resolved_at: incident.resolved_at.map(|t| t.to_rfc3339()),
        created_at: incident.created_at.to_rfc3339(),
    }
}

/// Note list → child rows with positions.
pub(crate) fn note_rows(notes: &[String]) -> Vec<Vec<Value>> {
    notes
        .iter()
        .enumerate()
        .map(|(position, note)| {
            vec![Value::Text(note.clone()), Value::Integer(position as i64)]
        })
        .collect()
}

pub struct IncidentAdapter;

impl EntityAdapter for IncidentAdapter {
    type Entity = Incident;
    const ENTITY: &'static str = "incident";

    fn entity_id<'a>(&self, entity: &'a Incident) -> &'a str {
        &entity.id
    }

    fn fetch_all(&self, db: &OpsDb) -> Result<Vec<Incident>, DbError> {
        let rows = db.get_all_incidents()?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let systems = db.get_incident_systems(&row.id)?;
            let notes = db.get_incident_notes(&row.id)?;
            items.push(to_domain(row, systems, notes));
        }
        Ok(items)
    }

    fn insert_parent(&self, db: &OpsDb, entity: &Incident) -> Result<String, DbError> {
        let mut row = to_row(&entity.normalized());
        row.id = Uuid::new_v4().to_string();
        row.created_at = Utc::now().to_rfc3339();
        db.insert_incident(&row)?;
        Ok(row.id)
    }

    fn update_parent(&self, db: &OpsDb, entity: &Incident) -> Result<(), DbError> {
        db.update_incident(&to_row(&entity.normalized()))
    }

    fn delete_parent(&self, db: &OpsDb, id: &str) -> Result<(), DbError> {
        db.delete_incident(id)
    }

    fn replace_children(
        &self,
        db: &OpsDb,
        id: &str,
        entity: &Incident,
    ) -> Result<(), RelationError> {
        db.replace_children(&INCIDENT_SYSTEMS, id, &text_rows(&entity.system_ids))
            .map_err(|source| RelationError {
                relation: "systems",
                source,
            })?;
        db.replace_children(&INCIDENT_NOTES, id, &note_rows(&entity.notes))
            .map_err(|source| RelationError {
                relation: "notes",
                source,
            })?;
        Ok(())
    }
}
