//! Company mapper and adapter. Companies have no child relations, so the
//! adapter's child step is a no-op.

use chrono::Utc;
use uuid::Uuid;

use super::{parse_timestamp, EntityAdapter, RelationError};
use crate::db::{DbCompany, DbError, OpsDb};
use crate::types::{AutomationFlags, Company, Complexity, Segment, TaxRegime};

/// Raw row → nested domain entity.
pub(crate) fn to_domain(row: DbCompany) -> Company {
    Company {
        created_at: parse_timestamp(&row.created_at),
        segment: Segment::from_str_lossy(&row.segment),
        regime: TaxRegime::from_str_lossy(&row.regime),
        complexity: Complexity::from_str_lossy(&row.complexity),
        automations: AutomationFlags {
            fiscal: row.fiscal_automation,
            accounting: row.accounting_automation,
            payroll: row.payroll_automation,
            billing: row.billing_automation,
            documents: row.document_automation,
        },
        id: row.id,
        name: row.name,
        legal_id: row.legal_id,
        responsible: row.responsible,
    }
}

/// Domain entity → parent-row payload.
pub(crate) fn to_row(company: &Company) -> DbCompany {
    DbCompany {
        id: company.id.clone(),
        name: company.name.clone(),
        legal_id: company.legal_id.clone(),
        responsible: company.responsible.clone(),
        segment: company.segment.as_str().to_string(),
        regime: company.regime.as_str().to_string(),
        complexity: company.complexity.as_str().to_string(),
        fiscal_automation: company.automations.fiscal,
        accounting_automation: company.automations.accounting,
        payroll_automation: company.automations.payroll,
        billing_automation: company.automations.billing,
        document_automation: company.automations.documents,
        created_at: company.created_at.to_rfc3339(),
    }
}

pub struct CompanyAdapter;

impl EntityAdapter for CompanyAdapter {
    type Entity = Company;
    const ENTITY: &'static str = "company";

    fn entity_id<'a>(&self, entity: &'a Company) -> &'a str {
        &entity.id
    }

    fn fetch_all(&self, db: &OpsDb) -> Result<Vec<Company>, DbError> {
        Ok(db.get_all_companies()?.into_iter().map(to_domain).collect())
    }

    fn insert_parent(&self, db: &OpsDb, entity: &Company) -> Result<String, DbError> {
        let mut row = to_row(entity);
        row.id = Uuid::new_v4().to_string();
        row.created_at = Utc::now().to_rfc3339();
        db.insert_company(&row)?;
        Ok(row.id)
    }

    fn update_parent(&self, db: &OpsDb, entity: &Company) -> Result<(), DbError> {
        db.update_company(&to_row(entity))
    }

    fn delete_parent(&self, db: &OpsDb, id: &str) -> Result<(), DbError> {
        db.delete_company(id)
    }

    fn replace_children(
        &self,
        _db: &OpsDb,
        _id: &str,
        _entity: &Company,
    ) -> Result<(), RelationError> {
        Ok(())
    }
}
