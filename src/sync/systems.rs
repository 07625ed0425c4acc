//! System mapper and adapter.
//!
//! Children: tag set, linked company ids, access user ids. All three replace
//! wholesale on every write. Progress is clamped to [0, 100] in both mapping
//! directions.

use chrono::Utc;
use uuid::Uuid;

use super::{
    parse_date, parse_optional_date, parse_timestamp, text_rows, EntityAdapter, RelationError,
};
use crate::db::{DbError, DbSystem, OpsDb, SYSTEM_COMPANIES, SYSTEM_TAGS, SYSTEM_USERS};
use crate::types::{clamp_progress, System, SystemStatus};

/// Raw row plus child sets → nested domain entity. Absent child sets arrive
/// as empty vectors from the db layer; this never fails.
pub(crate) fn to_domain(
    row: DbSystem,
    tags: Vec<String>,
    company_ids: Vec<String>,
    user_ids: Vec<String>,
) -> System {
    System {
        status: SystemStatus::from_str_lossy(&row.status),
        start_date: parse_date(&row.start_date),
        expected_end: parse_date(&row.expected_end),
        actual_end: parse_optional_date(row.actual_end.as_deref()),
        progress: clamp_progress(row.progress),
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        name: row.name,
        version: row.version,
        description: row.description,
        responsible: row.responsible,
        implemented: row.implemented,
        url: row.url,
        tags,
        company_ids,
        user_ids,
    }
}

/// Domain entity → parent-row payload. Child payloads are built separately in
/// `replace_children` from the entity's collections.
pub(crate) fn to_row(system: &System) -> DbSystem {
    DbSystem {
        id: system.id.clone(),
        name: system.name.clone(),
        version: system.version.clone(),
        description: system.description.clone(),
        responsible: system.responsible.clone(),
        status: system.status.as_str().to_string(),
        start_date: system.start_date.format("%Y-%m-%d").to_string(),
        expected_end: system.expected_end.format("%Y-%m-%d").to_string(),
        actual_end: system.actual_end.map(|d| d.format("%Y-%m-%d").to_string()),
        progress: clamp_progress(i64::from(system.progress)) as i64,
        implemented: system.implemented,
        url: system.url.clone(),
        created_at: system.created_at.to_rfc3339(),
    }
}

pub struct SystemAdapter;

impl EntityAdapter for SystemAdapter {
    type Entity = System;
    const ENTITY: &'static str = "system";

    fn entity_id<'a>(&self, entity: &'a System) -> &'a str {
        &entity.id
    }

    fn fetch_all(&self, db: &OpsDb) -> Result<Vec<System>, DbError> {
        let rows = db.get_all_systems()?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let tags = db.get_system_tags(&row.id)?;
            let companies = db.get_system_companies(&row.id)?;
            let users = db.get_system_users(&row.id)?;
            items.push(to_domain(row, tags, companies, users));
        }
        Ok(items)
    }

    fn insert_parent(&self, db: &OpsDb, entity: &System) -> Result<String, DbError> {
        let mut row = to_row(entity);
        row.id = Uuid::new_v4().to_string();
        row.created_at = Utc::now().to_rfc3339();
        db.insert_system(&row)?;
        Ok(row.id)
    }

    fn update_parent(&self, db: &OpsDb, entity: &System) -> Result<(), DbError> {
        db.update_system(&to_row(entity))
    }

    fn delete_parent(&self, db: &OpsDb, id: &str) -> Result<(), DbError> {
        db.delete_system(id)
    }

    fn replace_children(&self, db: &OpsDb, id: &str, entity: &System) -> Result<(), RelationError> {
        db.replace_children(&SYSTEM_TAGS, id, &text_rows(&entity.tags))
            .map_err(|source| RelationError {
                relation: "tags",
                source,
            })?;
        db.replace_children(&SYSTEM_COMPANIES, id, &text_rows(&entity.company_ids))
            .map_err(|source| RelationError {
                relation: "companies",
                source,
            })?;
        db.replace_children(&SYSTEM_USERS, id, &text_rows(&entity.user_ids))
            .map_err(|source| RelationError {
                relation: "users",
                source,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> System {
        System {
            id: "s1".to_string(),
            name: "ERP".to_string(),
            version: "3.0".to_string(),
            description: "Cloud ERP".to_string(),
            responsible: "Davi".to_string(),
            status: SystemStatus::Testing,
            start_date: parse_date("2026-02-01"),
            expected_end: parse_date("2026-08-01"),
            actual_end: None,
            progress: 70,
            implemented: false,
            url: None,
            created_at: parse_timestamp("2026-02-01T08:00:00+00:00"),
            tags: vec!["erp".to_string(), "fiscal".to_string()],
            company_ids: vec!["c9".to_string()],
            user_ids: Vec::new(),
        }
    }

    #[test]
    fn test_round_trip_preserves_scalars_and_children() {
        let system = sample();
        let row = to_row(&system);
        let round_tripped = to_domain(
            row,
            system.tags.clone(),
            system.company_ids.clone(),
            system.user_ids.clone(),
        );
        assert_eq!(round_tripped, system);
    }

    #[test]
    fn test_out_of_range_progress_is_clamped_on_read() {
        let mut row = to_row(&sample());
        row.progress = 180;
        let system = to_domain(row, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(system.progress, 100);

        let mut row = to_row(&sample());
        row.progress = -7;
        let system = to_domain(row, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(system.progress, 0);
    }

    #[test]
    fn test_absent_optional_date_stays_unset() {
        let mut row = to_row(&sample());
        row.actual_end = None;
        let system = to_domain(row, Vec::new(), Vec::new(), Vec::new());
        assert!(system.actual_end.is_none(), "no epoch stand-in for absent dates");

        let mut row = to_row(&sample());
        row.actual_end = Some("2026-07-15".to_string());
        let system = to_domain(row, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(system.actual_end, Some(parse_date("2026-07-15")));
    }

    #[test]
    fn test_missing_children_map_to_empty_sets() {
        let system = to_domain(to_row(&sample()), Vec::new(), Vec::new(), Vec::new());
        assert!(system.tags.is_empty());
        assert!(system.company_ids.is_empty());
        assert!(system.user_ids.is_empty());
    }
}
