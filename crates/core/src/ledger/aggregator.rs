//! Balance aggregation against the ledger store.

use chrono::{DateTime, Utc};
use folio_shared::types::TenantId;
use futures::future::join_all;
use rust_decimal::Decimal;

use super::balance::{AccountBalance, interval_activity};
use crate::chart::ChartAccount;
use crate::diagnostics::WarningLog;
use crate::store::LedgerStore;

const COMPONENT: &str = "balance_aggregator";

/// Derives account balances for one tenant.
///
/// One aggregate query per account. A failed query is recorded as a warning.
/// Balances count it as zero for that account only; interval sums give up.
pub struct BalanceAggregator<'a, S> {
    store: &'a S,
    tenant_id: TenantId,
    warnings: &'a WarningLog,
}

impl<'a, S: LedgerStore> BalanceAggregator<'a, S> {
    /// Creates an aggregator scoped to `tenant_id`.
    #[must_use]
    pub fn new(store: &'a S, tenant_id: TenantId, warnings: &'a WarningLog) -> Self {
        Self {
            store,
            tenant_id,
            warnings,
        }
    }

    /// Balance of `account` as of `cutoff`.
    pub async fn balance(&self, account: &ChartAccount, cutoff: DateTime<Utc>) -> Decimal {
        match self
            .store
            .sum_debits_credits(self.tenant_id, &account.code, cutoff)
            .await
        {
            Ok(totals) => AccountBalance::derive(account, totals).balance,
            Err(err) => {
                self.warnings.record(COMPONENT, Some(account.code.as_str()), err);
                Decimal::ZERO
            }
        }
    }

    /// Balances of `accounts`, in input order.
    pub async fn balances(&self, accounts: &[ChartAccount], cutoff: DateTime<Utc>) -> Vec<Decimal> {
        join_all(accounts.iter().map(|a| self.balance(a, cutoff))).await
    }

    /// Sum of balances of `accounts`.
    pub async fn total(&self, accounts: &[ChartAccount], cutoff: DateTime<Utc>) -> Decimal {
        self.balances(accounts, cutoff).await.into_iter().sum()
    }

    /// Signed activity of `account` within `[from, to]`, excluding the opening
    /// balance. `None` when the ledger could not be read.
    async fn try_activity(
        &self,
        account: &ChartAccount,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Option<Decimal> {
        match self
            .store
            .sum_debits_credits_between(self.tenant_id, &account.code, from, to)
            .await
        {
            Ok(totals) => Some(interval_activity(account.normal_balance, totals)),
            Err(err) => {
                self.warnings.record(COMPONENT, Some(account.code.as_str()), err);
                None
            }
        }
    }

    /// Sum of interval activity across `accounts`.
    ///
    /// `None` if any account could not be read; every failure is still
    /// recorded as a warning.
    pub async fn complete_activity(
        &self,
        accounts: &[ChartAccount],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Option<Decimal> {
        join_all(accounts.iter().map(|a| self.try_activity(a, from, to)))
            .await
            .into_iter()
            .sum()
    }
}
