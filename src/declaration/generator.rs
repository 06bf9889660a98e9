//! Declaration generation and filing lifecycle.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult, during};
use crate::models::{
    DeclarationStatus, DeclarationTotals, PayrollRunStatus, TenantId, TsdDeclaration, TsdRow,
};
use crate::store::PayrollStore;

/// Builds and files TSD declarations for one tenant.
pub struct DeclarationGenerator<S> {
    store: Arc<S>,
    tenant: TenantId,
}

impl<S: PayrollStore> DeclarationGenerator<S> {
    /// Creates a generator over `store`, scoped to `tenant`.
    pub fn new(store: Arc<S>, tenant: TenantId) -> Self {
        Self { store, tenant }
    }

    /// Generates the declaration for an approved or paid run.
    ///
    /// Any declaration already stored for the run's period is deleted with
    /// its rows first, so there is at most one declaration per period.
    /// Payslips whose employee cannot be loaded are left out.
    ///
    /// # Errors
    ///
    /// - `PayrollRunNotFound` if the run does not exist
    /// - `InvalidStatusTransition` unless the run is `APPROVED` or `PAID`
    /// - `NoPayslips` if no payslip with a loadable employee remains
    pub fn generate_declaration(&self, run_id: Uuid) -> EngineResult<TsdDeclaration> {
        const OP: &str = "generate_declaration";

        let run = self
            .store
            .get_payroll_run(&self.tenant, run_id)
            .map_err(during(OP))?
            .ok_or(EngineError::PayrollRunNotFound { id: run_id })?;

        if !run.status.is_declarable() {
            return Err(EngineError::InvalidStatusTransition {
                entity: "payroll run",
                from: run.status.to_string(),
                to: PayrollRunStatus::Declared.to_string(),
            });
        }

        let payslips = self
            .store
            .list_payslips(&self.tenant, run_id)
            .map_err(during(OP))?;

        let declaration_id = Uuid::new_v4();
        let mut rows = Vec::with_capacity(payslips.len());
        for payslip in &payslips {
            let employee = self
                .store
                .get_employee(&self.tenant, payslip.employee_id)
                .map_err(during(OP))?;
            match employee {
                Some(e) => rows.push(TsdRow::from_payslip(
                    declaration_id,
                    payslip,
                    &e.personal_code,
                    &e.first_name,
                    &e.last_name,
                )),
                None => warn!(
                    payslip_id = %payslip.id,
                    employee_id = %payslip.employee_id,
                    "Employee missing, payslip left out of declaration"
                ),
            }
        }

        if rows.is_empty() {
            return Err(EngineError::NoPayslips { run_id });
        }

        let declaration = TsdDeclaration {
            id: declaration_id,
            payroll_run_id: run_id,
            period_year: run.period_year,
            period_month: run.period_month,
            status: DeclarationStatus::Draft,
            totals: DeclarationTotals::from_rows(&rows),
            submitted_at: None,
            external_reference: None,
            created_at: Utc::now(),
            rows,
        };

        let replaced = self.store.atomically(|store| {
            let prior = store
                .find_declaration_by_period(&self.tenant, run.period_year, run.period_month)
                .map_err(during(OP))?;
            if let Some(prior) = &prior {
                store
                    .delete_declaration(&self.tenant, prior.id)
                    .map_err(during(OP))?;
            }

            store
                .insert_declaration(&self.tenant, &declaration)
                .map_err(during(OP))?;
            for row in &declaration.rows {
                store
                    .insert_declaration_row(&self.tenant, row)
                    .map_err(during(OP))?;
            }
            Ok::<_, EngineError>(prior.map(|p| p.id))
        })?;

        info!(
            tenant = %self.tenant,
            declaration_id = %declaration.id,
            run_id = %run_id,
            period = %declaration.period_code(),
            rows = declaration.rows.len(),
            skipped = payslips.len() - declaration.rows.len(),
            replaced = ?replaced,
            total_payments = %declaration.totals.payments,
            "Declaration generated"
        );
        Ok(declaration)
    }

    /// Loads a declaration with its rows.
    pub fn get_declaration(&self, id: Uuid) -> EngineResult<TsdDeclaration> {
        const OP: &str = "get_declaration";

        let mut declaration = self.load_header(id, OP)?;
        declaration.rows = self
            .store
            .list_declaration_rows(&self.tenant, id)
            .map_err(during(OP))?;
        Ok(declaration)
    }

    /// Marks a draft declaration as filed under the authority's `reference`.
    pub fn submit_declaration(
        &self,
        id: Uuid,
        reference: impl Into<String>,
    ) -> EngineResult<TsdDeclaration> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(EngineError::invalid_input("reference", "is required"));
        }
        self.change_status(id, DeclarationStatus::Submitted, "submit_declaration", |d| {
            d.submitted_at = Some(Utc::now());
            d.external_reference = Some(reference);
        })
    }

    /// Records that the authority accepted a submitted declaration.
    pub fn accept_declaration(&self, id: Uuid) -> EngineResult<TsdDeclaration> {
        self.change_status(id, DeclarationStatus::Accepted, "accept_declaration", |_| {})
    }

    /// Records that the authority rejected a submitted declaration.
    pub fn reject_declaration(&self, id: Uuid) -> EngineResult<TsdDeclaration> {
        self.change_status(id, DeclarationStatus::Rejected, "reject_declaration", |_| {})
    }

    fn load_header(&self, id: Uuid, op: &'static str) -> EngineResult<TsdDeclaration> {
        self.store
            .get_declaration(&self.tenant, id)
            .map_err(during(op))?
            .ok_or(EngineError::DeclarationNotFound { id })
    }

    fn change_status(
        &self,
        id: Uuid,
        next: DeclarationStatus,
        op: &'static str,
        stamp: impl FnOnce(&mut TsdDeclaration),
    ) -> EngineResult<TsdDeclaration> {
        let (declaration, previous) = self.store.atomically(|store| {
            let mut declaration = store
                .get_declaration(&self.tenant, id)
                .map_err(during(op))?
                .ok_or(EngineError::DeclarationNotFound { id })?;
            let previous = declaration.status;
            declaration.status = previous.transition_to(next)?;
            stamp(&mut declaration);

            store
                .update_declaration(&self.tenant, &declaration)
                .map_err(during(op))?;
            Ok::<_, EngineError>((declaration, previous))
        })?;

        info!(
            tenant = %self.tenant,
            declaration_id = %id,
            from = %previous,
            to = %next,
            "Declaration status changed"
        );
        Ok(declaration)
    }
}
