use super::*;

impl OpsDb {
    // =========================================================================
    // Companies
    // =========================================================================

    /// Helper: map a row to `DbCompany`.
    pub(crate) fn map_company_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbCompany> {
        Ok(DbCompany {
            id: row.get(0)?,
            name: row.get(1)?,
            legal_id: row.get(2)?,
            responsible: row.get(3)?,
            segment: row.get(4)?,
            regime: row.get(5)?,
            complexity: row.get(6)?,
            fiscal_automation: row.get(7)?,
            accounting_automation: row.get(8)?,
            payroll_automation: row.get(9)?,
            billing_automation: row.get(10)?,
            document_automation: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    const COMPANY_COLUMNS: &'static str = "id, name, legal_id, responsible, segment, regime, \
         complexity, fiscal_automation, accounting_automation, payroll_automation, \
         billing_automation, document_automation, created_at";

    pub fn insert_company(&self, company: &DbCompany) -> Result<(), DbError> {
        self.conn.execute(
            &format!(
                "INSERT INTO companies ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                Self::COMPANY_COLUMNS
            ),
            params![
                company.id,
                company.name,
                company.legal_id,
                company.responsible,
                company.segment,
                company.regime,
                company.complexity,
                company.fiscal_automation,
                company.accounting_automation,
                company.payroll_automation,
                company.billing_automation,
                company.document_automation,
                company.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn update_company(&self, company: &DbCompany) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE companies SET
                name = ?2, legal_id = ?3, responsible = ?4, segment = ?5,
                regime = ?6, complexity = ?7, fiscal_automation = ?8,
                accounting_automation = ?9, payroll_automation = ?10,
                billing_automation = ?11, document_automation = ?12
             WHERE id = ?1",
            params![
                company.id,
                company.name,
                company.legal_id,
                company.responsible,
                company.segment,
                company.regime,
                company.complexity,
                company.fiscal_automation,
                company.accounting_automation,
                company.payroll_automation,
                company.billing_automation,
                company.document_automation,
            ],
        )?;
        Ok(())
    }

    pub fn delete_company(&self, id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM companies WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Get all companies, newest first.
    pub fn get_all_companies(&self) -> Result<Vec<DbCompany>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM companies ORDER BY created_at DESC",
            Self::COMPANY_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_company_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_company(&self, id: &str) -> Result<Option<DbCompany>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM companies WHERE id = ?1",
            Self::COMPANY_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_company_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}
