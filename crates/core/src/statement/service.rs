//! Statement service: generation, lifecycle, comparison.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use folio_shared::StatementSettings;
use folio_shared::types::{StatementId, TenantId, UserId};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::assets::assemble_assets;
use super::audit::AuditRecorder;
use super::comparison::{BaselineKind, ComparisonResult, closest_to, year_ago_window};
use super::context::GenerationContext;
use super::equity::assemble_equity;
use super::error::StatementError;
use super::income::{IncomeSummary, recompute};
use super::liabilities::assemble_liabilities;
use super::numbering::{self, number_prefix};
use super::period::{PeriodType, parse_as_of};
use super::sections::{Assets, BalanceCheck, Equity, Liabilities};
use super::types::{
    AuditAction, GenerateStatementInput, StatementMetadata, StatementPatch, StatementSnapshot,
    StatementStatus,
};
use super::workflow::StatementWorkflow;
use crate::chart::{ChartResolver, Classifications};
use crate::diagnostics::WarningLog;
use crate::ledger::BalanceAggregator;
use crate::store::{DeleteOutcome, InsertOutcome, StatementRepository};

/// Rejects the nil tenant id.
pub fn ensure_tenant(tenant_id: TenantId) -> Result<TenantId, StatementError> {
    if tenant_id.is_nil() {
        return Err(StatementError::MissingTenant);
    }
    Ok(tenant_id)
}

/// Statement service over a repository implementing every store trait.
pub struct StatementService<R: StatementRepository> {
    repo: Arc<R>,
    settings: StatementSettings,
    classifications: Classifications,
}

impl<R: StatementRepository> StatementService<R> {
    /// Creates a service with the default classification tables.
    #[must_use]
    pub fn new(repo: Arc<R>, settings: StatementSettings) -> Self {
        Self {
            repo,
            settings,
            classifications: Classifications::default(),
        }
    }

    /// Replaces the classification tables.
    #[must_use]
    pub fn with_classifications(mut self, classifications: Classifications) -> Self {
        self.classifications = classifications;
        self
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &StatementSettings {
        &self.settings
    }

    /// Generates and persists a draft snapshot as of `input.as_of`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tenant id is nil or the date cannot be parsed
    /// - A statement already exists for the period
    /// - The prior snapshot lookup fails
    /// - No statement number can be allocated
    /// - Balancing is enforced and the identity does not hold
    #[instrument(
        name = "folio.statement.generate",
        skip_all,
        fields(tenant_id = %input.tenant_id, period_type = %input.period_type, as_of = %input.as_of),
        err
    )]
    pub async fn generate(
        &self,
        input: GenerateStatementInput,
    ) -> Result<StatementSnapshot, StatementError> {
        let tenant_id = ensure_tenant(input.tenant_id)?;
        let cutoff = parse_as_of(&input.as_of)?;
        let period_type = input.period_type;
        let as_of_date = cutoff.date_naive();
        let period_start = period_type.period_start(as_of_date);

        self.ensure_period_free(tenant_id, period_type, period_start)
            .await?;
        let statement_number = numbering::reserve(
            &*self.repo,
            tenant_id,
            &self.settings.numbering,
            period_type,
            as_of_date,
        )
        .await?;

        let warnings = WarningLog::new();
        let (assets, liabilities, equity) = {
            let ctx = GenerationContext::new(
                &*self.repo,
                tenant_id,
                cutoff,
                period_type,
                &self.settings,
                &self.classifications,
                &warnings,
            );
            let (assets, liabilities, equity) = tokio::join!(
                assemble_assets(&ctx),
                assemble_liabilities(&ctx),
                assemble_equity(&ctx),
            );
            (assets, liabilities, equity?)
        };

        let balance_check = self.check_balance(&statement_number, &assets, &liabilities, &equity)?;

        let mut snapshot = StatementSnapshot {
            id: StatementId::new(),
            tenant_id,
            statement_number,
            statement_date: cutoff,
            period_type,
            period_start,
            status: StatementStatus::Draft,
            assets,
            liabilities,
            equity,
            balance_check,
            notes: None,
            warnings: warnings.into_entries(),
            metadata: StatementMetadata {
                generated_by: input.requested_by,
                generated_at: Utc::now(),
                version: 1,
            },
            audit_trail: Vec::new(),
        };
        let created = AuditRecorder::created(input.requested_by, &snapshot);
        AuditRecorder::append(&mut snapshot.audit_trail, created);

        self.persist_new(&mut snapshot, as_of_date).await?;

        info!(
            statement_id = %snapshot.id,
            statement_number = %snapshot.statement_number,
            total_assets = %snapshot.assets.total_assets,
            warnings = snapshot.warnings.len(),
            "statement generated"
        );
        Ok(snapshot)
    }

    /// Fetches a snapshot.
    pub async fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: StatementId,
    ) -> Result<StatementSnapshot, StatementError> {
        let tenant_id = ensure_tenant(tenant_id)?;
        self.repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or(StatementError::NotFound(id))
    }

    /// Moves a snapshot one step along Draft → Review → Approved → Final.
    pub async fn update_status(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        to: StatementStatus,
        performed_by: UserId,
    ) -> Result<StatementSnapshot, StatementError> {
        let current = self.get_by_id(tenant_id, id).await?;
        let entry = StatementWorkflow::transition(current.status, to, performed_by)?;

        if !self
            .repo
            .update_status(tenant_id, id, current.status, to, entry)
            .await?
        {
            return Err(match self.repo.find_by_id(tenant_id, id).await? {
                None => StatementError::NotFound(id),
                Some(_) => StatementError::ConcurrentModification(id),
            });
        }

        info!(%tenant_id, statement_id = %id, from = %current.status, %to, "statement status changed");
        self.get_by_id(tenant_id, id).await
    }

    /// Applies a patch to a draft snapshot and bumps its version.
    pub async fn update_draft(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        patch: StatementPatch,
        performed_by: UserId,
    ) -> Result<StatementSnapshot, StatementError> {
        let current = self.get_by_id(tenant_id, id).await?;
        if !current.status.is_editable() {
            return Err(StatementError::ImmutableState {
                status: current.status,
            });
        }
        if patch.is_empty() {
            return Ok(current);
        }

        let mut updated = current.clone();
        if let Some(notes) = patch.notes {
            updated.notes = (!notes.trim().is_empty()).then_some(notes);
        }
        if let Some(assets) = patch.assets {
            updated.assets = assets;
        }
        if let Some(liabilities) = patch.liabilities {
            updated.liabilities = liabilities;
        }
        if let Some(equity) = patch.equity {
            updated.equity = equity;
        }
        updated.recalculate();
        updated.balance_check = self.check_balance(
            &updated.statement_number,
            &updated.assets,
            &updated.liabilities,
            &updated.equity,
        )?;
        updated.metadata.version += 1;

        let changes = AuditRecorder::changes(&current, &updated);
        let entry = AuditRecorder::entry(AuditAction::Updated, performed_by, "Draft updated", changes);

        if !self
            .repo
            .update_if_draft(&updated, current.metadata.version, entry)
            .await?
        {
            return Err(self.draft_conflict(tenant_id, id).await);
        }

        info!(%tenant_id, statement_id = %id, version = updated.metadata.version, "draft updated");
        self.get_by_id(tenant_id, id).await
    }

    /// Deletes a draft snapshot.
    pub async fn delete(&self, tenant_id: TenantId, id: StatementId) -> Result<(), StatementError> {
        let tenant_id = ensure_tenant(tenant_id)?;
        match self.repo.delete_if_draft(tenant_id, id).await? {
            DeleteOutcome::Deleted => {
                info!(%tenant_id, statement_id = %id, "statement deleted");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(StatementError::NotFound(id)),
            DeleteOutcome::NotDraft(status) => Err(StatementError::ImmutableState { status }),
        }
    }

    /// Records an explicit audit event. Allowed in any status.
    pub async fn append_audit(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        action: AuditAction,
        performed_by: UserId,
        details: &str,
        changes: Option<Value>,
    ) -> Result<StatementSnapshot, StatementError> {
        let tenant_id = ensure_tenant(tenant_id)?;
        let entry = AuditRecorder::annotation(action, performed_by, details, changes)?;
        if !self.repo.append_audit(tenant_id, id, entry).await? {
            return Err(StatementError::NotFound(id));
        }
        self.get_by_id(tenant_id, id).await
    }

    /// Compares a snapshot against its baseline; `None` when no baseline exists.
    pub async fn compare(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        baseline_kind: BaselineKind,
    ) -> Result<Option<ComparisonResult>, StatementError> {
        let current = self.get_by_id(tenant_id, id).await?;

        let baseline = match baseline_kind {
            BaselineKind::Previous => {
                self.repo
                    .find_latest_by_period_type(
                        current.tenant_id,
                        current.period_type,
                        current.statement_date,
                    )
                    .await?
            }
            BaselineKind::YearAgo => {
                let Some((target, from, to)) = year_ago_window(
                    current.statement_date,
                    self.settings.comparison_window_days,
                ) else {
                    return Ok(None);
                };
                let candidates = self
                    .repo
                    .find_by_period_type_between(current.tenant_id, current.period_type, from, to)
                    .await?
                    .into_iter()
                    .filter(|s| s.id != current.id)
                    .collect();
                closest_to(target, candidates)
            }
        };

        if baseline.is_none() {
            debug!(%tenant_id, statement_id = %id, %baseline_kind, "no baseline snapshot");
        }
        Ok(baseline.map(|b| ComparisonResult::between(&current, &b, baseline_kind)))
    }

    /// Point-in-time balance of one account. Missing accounts read as zero.
    pub async fn account_balance(
        &self,
        tenant_id: TenantId,
        code: &str,
        as_of: &str,
    ) -> Result<Decimal, StatementError> {
        let tenant_id = ensure_tenant(tenant_id)?;
        let cutoff = parse_as_of(as_of)?;

        let warnings = WarningLog::new();
        let resolver = ChartResolver::new(
            &*self.repo,
            tenant_id,
            &self.settings.default_account_codes,
            &warnings,
        );
        let Some(account) = resolver.resolve_code(code).await else {
            return Ok(Decimal::ZERO);
        };
        Ok(BalanceAggregator::new(&*self.repo, tenant_id, &warnings)
            .balance(&account, cutoff)
            .await)
    }

    /// Income summary for the period containing `as_of`, recomputed from the ledger.
    ///
    /// `None` when the tenant has no P&L accounts or part of the ledger could
    /// not be read.
    pub async fn income_summary(
        &self,
        tenant_id: TenantId,
        as_of: &str,
        period_type: PeriodType,
    ) -> Result<Option<IncomeSummary>, StatementError> {
        let tenant_id = ensure_tenant(tenant_id)?;
        let cutoff = parse_as_of(as_of)?;

        let warnings = WarningLog::new();
        let ctx = GenerationContext::new(
            &*self.repo,
            tenant_id,
            cutoff,
            period_type,
            &self.settings,
            &self.classifications,
            &warnings,
        );
        Ok(recompute(&ctx).await)
    }

    async fn ensure_period_free(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> Result<(), StatementError> {
        if let Some(existing) = self
            .repo
            .find_by_tenant_and_period(tenant_id, period_type, period_start)
            .await?
        {
            debug!(%tenant_id, existing = %existing.statement_number, "period already has a statement");
            return Err(StatementError::DuplicatePeriod {
                period_type,
                period_start,
            });
        }
        Ok(())
    }

    /// Inserts a new snapshot, re-reserving the number on collisions.
    async fn persist_new(
        &self,
        snapshot: &mut StatementSnapshot,
        as_of_date: NaiveDate,
    ) -> Result<(), StatementError> {
        let numbering = &self.settings.numbering;
        let attempts = numbering.max_attempts.max(1);

        for attempt in 1..=attempts {
            self.ensure_period_free(snapshot.tenant_id, snapshot.period_type, snapshot.period_start)
                .await?;

            match self.repo.insert_if_absent(snapshot).await? {
                InsertOutcome::Inserted => return Ok(()),
                InsertOutcome::PeriodTaken => {
                    return Err(StatementError::DuplicatePeriod {
                        period_type: snapshot.period_type,
                        period_start: snapshot.period_start,
                    });
                }
                InsertOutcome::NumberTaken => {
                    debug!(
                        attempt,
                        statement_number = %snapshot.statement_number,
                        "statement number collided on insert"
                    );
                    snapshot.statement_number = numbering::reserve(
                        &*self.repo,
                        snapshot.tenant_id,
                        numbering,
                        snapshot.period_type,
                        as_of_date,
                    )
                    .await?;
                }
            }
        }

        Err(StatementError::NumberAllocation {
            prefix: number_prefix(numbering, snapshot.period_type, as_of_date),
            attempts,
        })
    }

    fn check_balance(
        &self,
        statement_number: &str,
        assets: &Assets,
        liabilities: &Liabilities,
        equity: &Equity,
    ) -> Result<BalanceCheck, StatementError> {
        let check = BalanceCheck::evaluate(assets, liabilities, equity, self.settings.balance_tolerance);
        if !check.is_balanced {
            warn!(
                statement_number,
                difference = %check.difference,
                "balance sheet does not balance"
            );
            if self.settings.require_balanced {
                return Err(StatementError::Unbalanced {
                    difference: check.difference,
                });
            }
        }
        Ok(check)
    }

    /// Explains why a conditional draft write matched nothing.
    async fn draft_conflict(&self, tenant_id: TenantId, id: StatementId) -> StatementError {
        match self.repo.find_by_id(tenant_id, id).await {
            Ok(None) => StatementError::NotFound(id),
            Ok(Some(snapshot)) if !snapshot.status.is_editable() => StatementError::ImmutableState {
                status: snapshot.status,
            },
            Ok(Some(_)) => StatementError::ConcurrentModification(id),
            Err(err) => err.into(),
        }
    }
}
