//! Persistence boundary of the engine.
//!
//! These traits are implemented by the db crate. Every method takes an
//! explicit tenant id and implementations must never read across tenants.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{StatementId, TenantId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::chart::{AccountFilter, AccountRole, ChartAccount};
use crate::ledger::DebitCreditTotals;
use crate::statement::{AuditEntry, PeriodType, StatementSnapshot, StatementStatus};

/// Storage-level failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or query failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of [`SnapshotStore::insert_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Snapshot persisted.
    Inserted,
    /// Another snapshot already holds the statement number.
    NumberTaken,
    /// Another snapshot already covers the (period type, period start).
    PeriodTaken,
}

/// Outcome of [`SnapshotStore::delete_if_draft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Snapshot removed.
    Deleted,
    /// No such snapshot for this tenant.
    NotFound,
    /// Snapshot exists but has left draft.
    NotDraft(StatementStatus),
}

/// Chart of accounts queries. Inactive and system accounts are never returned.
pub trait ChartStore: Send + Sync {
    /// Exact-code lookup.
    fn find_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> impl Future<Output = StoreResult<Option<ChartAccount>>> + Send;

    /// Classification-by-pattern lookup, restricted to direct-posting accounts.
    fn find_by_pattern(
        &self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> impl Future<Output = StoreResult<Vec<ChartAccount>>> + Send;

    /// Tenant-specific role → code overrides.
    fn find_role_codes(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = StoreResult<HashMap<AccountRole, String>>> + Send;
}

/// Aggregate ledger queries over completed transactions.
pub trait LedgerStore: Send + Sync {
    /// Sum of debits and credits with `occurred_at <= cutoff`.
    fn sum_debits_credits(
        &self,
        tenant_id: TenantId,
        code: &str,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<DebitCreditTotals>> + Send;

    /// Sum of debits and credits with `from <= occurred_at <= to`.
    fn sum_debits_credits_between(
        &self,
        tenant_id: TenantId,
        code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<DebitCreditTotals>> + Send;

    /// Debit amounts posted to any of `codes` within `[from, to]`.
    fn find_dividend_debits(
        &self,
        tenant_id: TenantId,
        codes: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Vec<Decimal>>> + Send;

    /// Totals of paid, undelivered sales orders dated on or before `cutoff`.
    fn find_deferred_revenue_orders(
        &self,
        tenant_id: TenantId,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Vec<Decimal>>> + Send;
}

/// Snapshot persistence.
///
/// Every write that records an audit entry persists it atomically with the
/// snapshot change, assigning the next sequence number.
pub trait SnapshotStore: Send + Sync {
    /// Lookup by id.
    fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: StatementId,
    ) -> impl Future<Output = StoreResult<Option<StatementSnapshot>>> + Send;

    /// Lookup by statement number.
    fn find_by_number(
        &self,
        tenant_id: TenantId,
        statement_number: &str,
    ) -> impl Future<Output = StoreResult<Option<StatementSnapshot>>> + Send;

    /// Every statement number starting with `prefix`.
    fn find_numbers_with_prefix(
        &self,
        tenant_id: TenantId,
        prefix: &str,
    ) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// Most recent snapshot of `period_type` dated strictly before `before`.
    fn find_latest_by_period_type(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        before: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<StatementSnapshot>>> + Send;

    /// Snapshots of `period_type` dated within `[from, to]`.
    fn find_by_period_type_between(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Vec<StatementSnapshot>>> + Send;

    /// The snapshot covering a period, if any.
    fn find_by_tenant_and_period(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> impl Future<Output = StoreResult<Option<StatementSnapshot>>> + Send;

    /// Inserts unless the number or the period is already taken.
    fn insert_if_absent(
        &self,
        snapshot: &StatementSnapshot,
    ) -> impl Future<Output = StoreResult<InsertOutcome>> + Send;

    /// Replaces content if the stored snapshot is draft at `expected_version`.
    ///
    /// Returns false when either condition no longer holds.
    fn update_if_draft(
        &self,
        snapshot: &StatementSnapshot,
        expected_version: u32,
        entry: AuditEntry,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Moves status `from` → `to`. Returns false if the stored status is not `from`.
    fn update_status(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        from: StatementStatus,
        to: StatementStatus,
        entry: AuditEntry,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Appends an entry. Returns false if the snapshot does not exist.
    fn append_audit(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        entry: AuditEntry,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Deletes a draft snapshot and its trail.
    fn delete_if_draft(
        &self,
        tenant_id: TenantId,
        id: StatementId,
    ) -> impl Future<Output = StoreResult<DeleteOutcome>> + Send;
}

/// Published income statements.
pub trait PublishedIncomeStore: Send + Sync {
    /// Net income of a published statement covering exactly `[start, end]`.
    fn find_published(
        &self,
        tenant_id: TenantId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> impl Future<Output = StoreResult<Option<Decimal>>> + Send;
}

/// Everything the statement service needs from persistence.
pub trait StatementRepository:
    ChartStore + LedgerStore + SnapshotStore + PublishedIncomeStore
{
}

impl<T> StatementRepository for T where
    T: ChartStore + LedgerStore + SnapshotStore + PublishedIncomeStore
{
}
