//! In-memory repository and fixtures for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{StatementId, TenantId};
use rust_decimal::Decimal;

use super::audit::AuditRecorder;
use super::period::PeriodType;
use super::types::{AuditEntry, StatementSnapshot, StatementStatus};
use crate::chart::{AccountFilter, AccountRole, ChartAccount};
use crate::ledger::{DebitCreditTotals, LedgerStatus};
use crate::store::{
    ChartStore, DeleteOutcome, InsertOutcome, LedgerStore, PublishedIncomeStore, SnapshotStore,
    StoreError, StoreResult,
};

#[derive(Debug, Clone)]
struct Posting {
    tenant_id: TenantId,
    code: String,
    debit: Decimal,
    credit: Decimal,
    occurred_at: DateTime<Utc>,
    status: LedgerStatus,
}

#[derive(Debug, Clone)]
struct SalesOrder {
    tenant_id: TenantId,
    total: Decimal,
    ordered_at: DateTime<Utc>,
    delivered: bool,
}

#[derive(Debug, Default)]
struct Faults {
    role_codes: bool,
    chart_patterns: bool,
    ledger_codes: HashSet<String>,
    deferred_revenue: bool,
    published: bool,
    prior_lookup: bool,
    prefix_scan_hidden: bool,
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<(TenantId, ChartAccount)>,
    role_codes: HashMap<TenantId, HashMap<AccountRole, String>>,
    postings: Vec<Posting>,
    orders: Vec<SalesOrder>,
    published: Vec<(TenantId, NaiveDate, NaiveDate, Decimal)>,
    snapshots: Vec<StatementSnapshot>,
    competitor: Option<StatementSnapshot>,
    faults: Faults,
}

/// Thread-safe in-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} query failed"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_account(&self, tenant_id: TenantId, account: ChartAccount) {
        self.state().accounts.push((tenant_id, account));
    }

    pub fn set_role_code(&self, tenant_id: TenantId, role: AccountRole, code: &str) {
        self.state()
            .role_codes
            .entry(tenant_id)
            .or_default()
            .insert(role, code.to_string());
    }

    /// Posts a completed ledger row.
    pub fn post(
        &self,
        tenant_id: TenantId,
        code: &str,
        debit: Decimal,
        credit: Decimal,
        occurred_at: DateTime<Utc>,
    ) {
        self.post_with_status(tenant_id, code, debit, credit, occurred_at, LedgerStatus::Completed);
    }

    pub fn post_with_status(
        &self,
        tenant_id: TenantId,
        code: &str,
        debit: Decimal,
        credit: Decimal,
        occurred_at: DateTime<Utc>,
        status: LedgerStatus,
    ) {
        self.state().postings.push(Posting {
            tenant_id,
            code: code.to_string(),
            debit,
            credit,
            occurred_at,
            status,
        });
    }

    pub fn add_order(
        &self,
        tenant_id: TenantId,
        total: Decimal,
        ordered_at: DateTime<Utc>,
        delivered: bool,
    ) {
        self.state().orders.push(SalesOrder {
            tenant_id,
            total,
            ordered_at,
            delivered,
        });
    }

    pub fn publish_income(
        &self,
        tenant_id: TenantId,
        period_start: NaiveDate,
        period_end: NaiveDate,
        net_income: Decimal,
    ) {
        self.state()
            .published
            .push((tenant_id, period_start, period_end, net_income));
    }

    /// Stores a snapshot without uniqueness checks.
    pub fn insert_raw(&self, snapshot: StatementSnapshot) {
        self.state().snapshots.push(snapshot);
    }

    /// Makes the next insert lose a race against `competitor`.
    pub fn race_next_insert_with(&self, competitor: StatementSnapshot) {
        self.state().competitor = Some(competitor);
    }

    pub fn snapshot_count(&self, tenant_id: TenantId) -> usize {
        self.state()
            .snapshots
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .count()
    }

    pub fn fail_role_codes(&self) {
        self.state().faults.role_codes = true;
    }

    pub fn fail_chart_patterns(&self) {
        self.state().faults.chart_patterns = true;
    }

    pub fn fail_ledger_for(&self, code: &str) {
        self.state().faults.ledger_codes.insert(code.to_string());
    }

    pub fn fail_deferred_revenue(&self) {
        self.state().faults.deferred_revenue = true;
    }

    pub fn fail_published(&self) {
        self.state().faults.published = true;
    }

    pub fn fail_prior_lookup(&self) {
        self.state().faults.prior_lookup = true;
    }

    pub fn hide_from_prefix_scan(&self) {
        self.state().faults.prefix_scan_hidden = true;
    }

    fn totals(
        &self,
        tenant_id: TenantId,
        code: &str,
        include: impl Fn(DateTime<Utc>) -> bool,
    ) -> StoreResult<DebitCreditTotals> {
        let state = self.state();
        if state.faults.ledger_codes.contains(code) {
            return Err(unavailable("ledger"));
        }
        let (debit, credit) = state
            .postings
            .iter()
            .filter(|p| {
                p.tenant_id == tenant_id
                    && p.code == code
                    && p.status == LedgerStatus::Completed
                    && include(p.occurred_at)
            })
            .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), p| {
                (d + p.debit, c + p.credit)
            });
        Ok(DebitCreditTotals::new(debit, credit))
    }

    fn find(&self, tenant_id: TenantId, predicate: impl Fn(&StatementSnapshot) -> bool) -> Option<StatementSnapshot> {
        self.state()
            .snapshots
            .iter()
            .find(|s| s.tenant_id == tenant_id && predicate(s))
            .cloned()
    }
}

impl ChartStore for MemoryStore {
    async fn find_by_code(&self, tenant_id: TenantId, code: &str) -> StoreResult<Option<ChartAccount>> {
        Ok(self
            .state()
            .accounts
            .iter()
            .find(|(t, a)| *t == tenant_id && a.code == code && a.is_aggregatable())
            .map(|(_, a)| a.clone()))
    }

    async fn find_by_pattern(
        &self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> StoreResult<Vec<ChartAccount>> {
        let state = self.state();
        if state.faults.chart_patterns {
            return Err(unavailable("chart"));
        }
        Ok(state
            .accounts
            .iter()
            .filter(|(t, a)| *t == tenant_id && filter.matches(a))
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn find_role_codes(&self, tenant_id: TenantId) -> StoreResult<HashMap<AccountRole, String>> {
        let state = self.state();
        if state.faults.role_codes {
            return Err(unavailable("role mapping"));
        }
        Ok(state.role_codes.get(&tenant_id).cloned().unwrap_or_default())
    }
}

impl LedgerStore for MemoryStore {
    async fn sum_debits_credits(
        &self,
        tenant_id: TenantId,
        code: &str,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<DebitCreditTotals> {
        self.totals(tenant_id, code, |at| at <= cutoff)
    }

    async fn sum_debits_credits_between(
        &self,
        tenant_id: TenantId,
        code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<DebitCreditTotals> {
        self.totals(tenant_id, code, |at| from <= at && at <= to)
    }

    async fn find_dividend_debits(
        &self,
        tenant_id: TenantId,
        codes: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<Decimal>> {
        Ok(self
            .state()
            .postings
            .iter()
            .filter(|p| {
                p.tenant_id == tenant_id
                    && codes.contains(&p.code)
                    && p.status == LedgerStatus::Completed
                    && p.debit > Decimal::ZERO
                    && from <= p.occurred_at
                    && p.occurred_at <= to
            })
            .map(|p| p.debit)
            .collect())
    }

    async fn find_deferred_revenue_orders(
        &self,
        tenant_id: TenantId,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Decimal>> {
        let state = self.state();
        if state.faults.deferred_revenue {
            return Err(unavailable("sales order"));
        }
        Ok(state
            .orders
            .iter()
            .filter(|o| o.tenant_id == tenant_id && !o.delivered && o.ordered_at <= cutoff)
            .map(|o| o.total)
            .collect())
    }
}

impl SnapshotStore for MemoryStore {
    async fn find_by_id(&self, tenant_id: TenantId, id: StatementId) -> StoreResult<Option<StatementSnapshot>> {
        Ok(self.find(tenant_id, |s| s.id == id))
    }

    async fn find_by_number(
        &self,
        tenant_id: TenantId,
        statement_number: &str,
    ) -> StoreResult<Option<StatementSnapshot>> {
        Ok(self.find(tenant_id, |s| s.statement_number == statement_number))
    }

    async fn find_numbers_with_prefix(&self, tenant_id: TenantId, prefix: &str) -> StoreResult<Vec<String>> {
        let state = self.state();
        if state.faults.prefix_scan_hidden {
            return Ok(Vec::new());
        }
        Ok(state
            .snapshots
            .iter()
            .filter(|s| s.tenant_id == tenant_id && s.statement_number.starts_with(prefix))
            .map(|s| s.statement_number.clone())
            .collect())
    }

    async fn find_latest_by_period_type(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        before: DateTime<Utc>,
    ) -> StoreResult<Option<StatementSnapshot>> {
        let state = self.state();
        if state.faults.prior_lookup {
            return Err(unavailable("snapshot"));
        }
        Ok(state
            .snapshots
            .iter()
            .filter(|s| {
                s.tenant_id == tenant_id && s.period_type == period_type && s.statement_date < before
            })
            .max_by_key(|s| s.statement_date)
            .cloned())
    }

    async fn find_by_period_type_between(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<StatementSnapshot>> {
        Ok(self
            .state()
            .snapshots
            .iter()
            .filter(|s| {
                s.tenant_id == tenant_id
                    && s.period_type == period_type
                    && from <= s.statement_date
                    && s.statement_date <= to
            })
            .cloned()
            .collect())
    }

    async fn find_by_tenant_and_period(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> StoreResult<Option<StatementSnapshot>> {
        Ok(self.find(tenant_id, |s| {
            s.period_type == period_type && s.period_start == period_start
        }))
    }

    async fn insert_if_absent(&self, snapshot: &StatementSnapshot) -> StoreResult<InsertOutcome> {
        let mut state = self.state();
        if let Some(competitor) = state.competitor.take() {
            state.snapshots.push(competitor);
        }

        let same_tenant = |s: &&StatementSnapshot| s.tenant_id == snapshot.tenant_id;
        if state
            .snapshots
            .iter()
            .filter(same_tenant)
            .any(|s| s.statement_number == snapshot.statement_number)
        {
            return Ok(InsertOutcome::NumberTaken);
        }
        if state.snapshots.iter().filter(same_tenant).any(|s| {
            s.period_type == snapshot.period_type && s.period_start == snapshot.period_start
        }) {
            return Ok(InsertOutcome::PeriodTaken);
        }

        state.snapshots.push(snapshot.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update_if_draft(
        &self,
        snapshot: &StatementSnapshot,
        expected_version: u32,
        entry: AuditEntry,
    ) -> StoreResult<bool> {
        let mut state = self.state();
        let Some(stored) = state
            .snapshots
            .iter_mut()
            .find(|s| s.tenant_id == snapshot.tenant_id && s.id == snapshot.id)
        else {
            return Ok(false);
        };
        if stored.status != StatementStatus::Draft || stored.metadata.version != expected_version {
            return Ok(false);
        }

        let mut trail = std::mem::take(&mut stored.audit_trail);
        AuditRecorder::append(&mut trail, entry);
        *stored = StatementSnapshot {
            audit_trail: trail,
            ..snapshot.clone()
        };
        Ok(true)
    }

    async fn update_status(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        from: StatementStatus,
        to: StatementStatus,
        entry: AuditEntry,
    ) -> StoreResult<bool> {
        let mut state = self.state();
        let Some(stored) = state
            .snapshots
            .iter_mut()
            .find(|s| s.tenant_id == tenant_id && s.id == id && s.status == from)
        else {
            return Ok(false);
        };
        stored.status = to;
        AuditRecorder::append(&mut stored.audit_trail, entry);
        Ok(true)
    }

    async fn append_audit(&self, tenant_id: TenantId, id: StatementId, entry: AuditEntry) -> StoreResult<bool> {
        let mut state = self.state();
        let Some(stored) = state
            .snapshots
            .iter_mut()
            .find(|s| s.tenant_id == tenant_id && s.id == id)
        else {
            return Ok(false);
        };
        AuditRecorder::append(&mut stored.audit_trail, entry);
        Ok(true)
    }

    async fn delete_if_draft(&self, tenant_id: TenantId, id: StatementId) -> StoreResult<DeleteOutcome> {
        let mut state = self.state();
        let Some(index) = state
            .snapshots
            .iter()
            .position(|s| s.tenant_id == tenant_id && s.id == id)
        else {
            return Ok(DeleteOutcome::NotFound);
        };
        let status = state.snapshots[index].status;
        if status != StatementStatus::Draft {
            return Ok(DeleteOutcome::NotDraft(status));
        }
        state.snapshots.remove(index);
        Ok(DeleteOutcome::Deleted)
    }
}

impl PublishedIncomeStore for MemoryStore {
    async fn find_published(
        &self,
        tenant_id: TenantId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> StoreResult<Option<Decimal>> {
        let state = self.state();
        if state.faults.published {
            return Err(unavailable("income statement"));
        }
        Ok(state
            .published
            .iter()
            .find(|(t, s, e, _)| *t == tenant_id && *s == period_start && *e == period_end)
            .map(|(_, _, _, net)| *net))
    }
}

pub mod fixtures {
    use chrono::{NaiveDate, Utc};
    use folio_shared::types::{StatementId, TenantId, UserId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::chart::{AccountType, ChartAccount};
    use crate::ledger::NormalBalance;
    use crate::statement::period::{PeriodType, end_of_day};
    use crate::statement::sections::BalanceCheck;
    use crate::statement::types::{StatementMetadata, StatementSnapshot, StatementStatus};

    pub fn tenant() -> TenantId {
        TenantId::from_uuid(Uuid::new_v4())
    }

    pub fn user() -> UserId {
        UserId::new()
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub fn account(
        code: &str,
        name: &str,
        account_type: AccountType,
        category: Option<&str>,
        opening_balance: Decimal,
    ) -> ChartAccount {
        ChartAccount {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            category: category.map(String::from),
            normal_balance: NormalBalance::for_account_type(account_type),
            opening_balance,
            is_active: true,
            allow_direct_posting: true,
            is_system_account: false,
        }
    }

    pub fn asset(code: &str, name: &str, opening_balance: Decimal) -> ChartAccount {
        account(code, name, AccountType::Asset, None, opening_balance)
    }

    pub fn asset_in(code: &str, name: &str, category: &str, opening_balance: Decimal) -> ChartAccount {
        account(code, name, AccountType::Asset, Some(category), opening_balance)
    }

    pub fn liability(code: &str, name: &str, opening_balance: Decimal) -> ChartAccount {
        account(code, name, AccountType::Liability, None, opening_balance)
    }

    pub fn liability_in(code: &str, name: &str, category: &str, opening_balance: Decimal) -> ChartAccount {
        account(code, name, AccountType::Liability, Some(category), opening_balance)
    }

    pub fn equity(code: &str, name: &str, opening_balance: Decimal) -> ChartAccount {
        account(code, name, AccountType::Equity, None, opening_balance)
    }

    pub fn revenue(code: &str, name: &str) -> ChartAccount {
        account(code, name, AccountType::Revenue, None, Decimal::ZERO)
    }

    pub fn expense(code: &str, name: &str, category: Option<&str>) -> ChartAccount {
        account(code, name, AccountType::Expense, category, Decimal::ZERO)
    }

    /// A draft monthly snapshot dated at the end of `date`, with empty sections.
    pub fn snapshot(tenant_id: TenantId, number: &str, date: NaiveDate) -> StatementSnapshot {
        let mut snapshot = StatementSnapshot {
            id: StatementId::new(),
            tenant_id,
            statement_number: number.to_string(),
            statement_date: end_of_day(date),
            period_type: PeriodType::Monthly,
            period_start: PeriodType::Monthly.period_start(date),
            status: StatementStatus::Draft,
            assets: Default::default(),
            liabilities: Default::default(),
            equity: Default::default(),
            balance_check: BalanceCheck::default(),
            notes: None,
            warnings: Vec::new(),
            metadata: StatementMetadata {
                generated_by: user(),
                generated_at: Utc::now(),
                version: 1,
            },
            audit_trail: Vec::new(),
        };
        snapshot.recalculate();
        snapshot.balance_check = BalanceCheck::evaluate(
            &snapshot.assets,
            &snapshot.liabilities,
            &snapshot.equity,
            dec!(0.01),
        );
        snapshot
    }
}
