//! Per-generation context shared by the category assemblers.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::StatementSettings;
use folio_shared::types::TenantId;
use rust_decimal::Decimal;

use super::period::{PeriodType, start_of_day};
use crate::chart::{
    AccountFilter, AccountRole, AccountType, ChartAccount, ChartResolver, ClassificationTable,
    Classifications, NamePattern,
};
use crate::diagnostics::WarningLog;
use crate::ledger::BalanceAggregator;
use crate::store::StatementRepository;

/// Amounts per classification bucket. Missing buckets read as zero.
#[derive(Debug, Clone)]
pub(crate) struct BucketTotals<T>(HashMap<T, Decimal>);

impl<T: Eq + Hash> BucketTotals<T> {
    pub(crate) fn amount(&self, bucket: T) -> Decimal {
        self.0.get(&bucket).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Everything one `generate` call needs, scoped to a single tenant and cutoff.
///
/// The role-code cache inside `chart` lives exactly as long as this value.
pub(crate) struct GenerationContext<'a, R> {
    pub repo: &'a R,
    pub tenant_id: TenantId,
    pub cutoff: DateTime<Utc>,
    pub period_type: PeriodType,
    pub period_start: NaiveDate,
    pub settings: &'a StatementSettings,
    pub classifications: &'a Classifications,
    pub warnings: &'a WarningLog,
    pub chart: ChartResolver<'a, R>,
    pub ledger: BalanceAggregator<'a, R>,
}

impl<'a, R: StatementRepository> GenerationContext<'a, R> {
    pub(crate) fn new(
        repo: &'a R,
        tenant_id: TenantId,
        cutoff: DateTime<Utc>,
        period_type: PeriodType,
        settings: &'a StatementSettings,
        classifications: &'a Classifications,
        warnings: &'a WarningLog,
    ) -> Self {
        Self {
            repo,
            tenant_id,
            cutoff,
            period_type,
            period_start: period_type.period_start(cutoff.date_naive()),
            settings,
            classifications,
            warnings,
            chart: ChartResolver::new(repo, tenant_id, &settings.default_account_codes, warnings),
            ledger: BalanceAggregator::new(repo, tenant_id, warnings),
        }
    }

    /// Start of the earnings interval `[period_start, cutoff]`.
    pub(crate) fn interval_start(&self) -> DateTime<Utc> {
        start_of_day(self.period_start)
    }

    /// Balance of the account bound to `role`; zero when it does not exist.
    pub(crate) async fn role_balance(&self, role: AccountRole) -> Decimal {
        match self.chart.resolve_role(role).await {
            Some(account) => self.ledger.balance(&account, self.cutoff).await,
            None => Decimal::ZERO,
        }
    }

    /// Non-role accounts of `account_type` whose name matches any keyword.
    pub(crate) async fn discover_named(
        &self,
        account_type: AccountType,
        keywords: &[String],
    ) -> Vec<ChartAccount> {
        if keywords.is_empty() {
            return Vec::new();
        }
        let filter = AccountFilter::of_type(account_type).named(NamePattern::any_of(keywords));
        self.chart.discover(&filter).await
    }

    /// Non-role accounts of `account_type` in `category`.
    pub(crate) async fn discover_category(
        &self,
        account_type: AccountType,
        category: &str,
    ) -> Vec<ChartAccount> {
        let filter = AccountFilter::of_type(account_type).in_category(category);
        self.chart.discover(&filter).await
    }

    /// Sum of balances as of the cutoff.
    pub(crate) async fn total(&self, accounts: &[ChartAccount]) -> Decimal {
        self.ledger.total(accounts, self.cutoff).await
    }

    /// Classifies each account and sums balances per bucket.
    pub(crate) async fn bucket_totals<T>(
        &self,
        accounts: &[ChartAccount],
        table: &ClassificationTable<T>,
    ) -> BucketTotals<T>
    where
        T: Copy + Eq + Hash,
    {
        let balances = self.ledger.balances(accounts, self.cutoff).await;
        let mut totals = HashMap::new();
        for (account, balance) in accounts.iter().zip(balances) {
            *totals.entry(table.classify(account)).or_insert(Decimal::ZERO) += balance;
        }
        BucketTotals(totals)
    }
}

/// Account codes already assigned to a statement line.
///
/// Each account feeds at most one line. Callers take candidate lists in
/// priority order; later lists lose whatever earlier ones claimed.
#[derive(Debug, Default)]
pub(crate) struct Claims(HashSet<String>);

impl Claims {
    /// Keeps the accounts nobody has claimed yet, claiming them.
    pub(crate) fn take(&mut self, accounts: Vec<ChartAccount>) -> Vec<ChartAccount> {
        accounts
            .into_iter()
            .filter(|a| self.0.insert(a.code.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::test_support::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_claims_assign_each_code_once() {
        let mut claims = Claims::default();
        let first = claims.take(vec![
            fixtures::asset("1500", "Office Building", dec!(0)),
            fixtures::asset("1500", "Office Building", dec!(0)),
        ]);
        let second = claims.take(vec![
            fixtures::asset("1500", "Office Building", dec!(0)),
            fixtures::asset("1510", "Prepaid Rent", dec!(0)),
        ]);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].code, "1510");
    }
}
