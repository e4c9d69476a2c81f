//! Aggregate ledger queries and published income lookups.

use chrono::{DateTime, NaiveDate, Utc};
use folio_core::ledger::DebitCreditTotals;
use folio_core::store::{LedgerStore, PublishedIncomeStore};
use folio_core::StoreResult;
use folio_shared::types::TenantId;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Select};

use super::PgRepository;
use super::convert::unavailable;
use crate::entities::{
    ledger_transactions, published_income_statements,
    sea_orm_active_enums::{LedgerStatus, PaymentStatus},
    sales_orders,
};

/// Completed activity of one account.
fn completed_activity(tenant_id: TenantId, code: &str) -> Select<ledger_transactions::Entity> {
    ledger_transactions::Entity::find()
        .filter(ledger_transactions::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(ledger_transactions::Column::AccountCode.eq(code))
        .filter(ledger_transactions::Column::Status.eq(LedgerStatus::Completed))
}

impl PgRepository {
    async fn sum_activity(
        &self,
        tenant_id: TenantId,
        query: Select<ledger_transactions::Entity>,
    ) -> StoreResult<DebitCreditTotals> {
        let rls = self.scoped(tenant_id).await?;
        let sums: Option<(Option<Decimal>, Option<Decimal>)> = query
            .select_only()
            .column_as(ledger_transactions::Column::Debit.sum(), "debit_total")
            .column_as(ledger_transactions::Column::Credit.sum(), "credit_total")
            .into_tuple()
            .one(rls.transaction())
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;

        let (debit, credit) = sums.unwrap_or_default();
        Ok(DebitCreditTotals::new(
            debit.unwrap_or(Decimal::ZERO),
            credit.unwrap_or(Decimal::ZERO),
        ))
    }
}

impl LedgerStore for PgRepository {
    async fn sum_debits_credits(
        &self,
        tenant_id: TenantId,
        code: &str,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<DebitCreditTotals> {
        let query = completed_activity(tenant_id, code)
            .filter(ledger_transactions::Column::OccurredAt.lte(cutoff));
        self.sum_activity(tenant_id, query).await
    }

    async fn sum_debits_credits_between(
        &self,
        tenant_id: TenantId,
        code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<DebitCreditTotals> {
        let query = completed_activity(tenant_id, code)
            .filter(ledger_transactions::Column::OccurredAt.gte(from))
            .filter(ledger_transactions::Column::OccurredAt.lte(to));
        self.sum_activity(tenant_id, query).await
    }

    async fn find_dividend_debits(
        &self,
        tenant_id: TenantId,
        codes: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<Decimal>> {
        if codes.is_empty() {
            return Ok(vec![]);
        }

        let rls = self.scoped(tenant_id).await?;
        let debits: Vec<Decimal> = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(ledger_transactions::Column::AccountCode.is_in(codes.iter().cloned()))
            .filter(ledger_transactions::Column::Status.eq(LedgerStatus::Completed))
            .filter(ledger_transactions::Column::Debit.gt(Decimal::ZERO))
            .filter(ledger_transactions::Column::OccurredAt.gte(from))
            .filter(ledger_transactions::Column::OccurredAt.lte(to))
            .select_only()
            .column(ledger_transactions::Column::Debit)
            .into_tuple()
            .all(rls.transaction())
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;

        Ok(debits)
    }

    async fn find_deferred_revenue_orders(
        &self,
        tenant_id: TenantId,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Decimal>> {
        let rls = self.scoped(tenant_id).await?;
        let totals: Vec<Decimal> = sales_orders::Entity::find()
            .filter(sales_orders::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(sales_orders::Column::PaymentStatus.eq(PaymentStatus::Completed))
            .filter(sales_orders::Column::DeliveredAt.is_null())
            .filter(sales_orders::Column::OrderDate.lte(cutoff))
            .select_only()
            .column(sales_orders::Column::TotalAmount)
            .into_tuple()
            .all(rls.transaction())
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;

        Ok(totals)
    }
}

impl PublishedIncomeStore for PgRepository {
    async fn find_published(
        &self,
        tenant_id: TenantId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> StoreResult<Option<Decimal>> {
        let rls = self.scoped(tenant_id).await?;
        let net_income: Option<Decimal> = published_income_statements::Entity::find()
            .filter(published_income_statements::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(published_income_statements::Column::PeriodStart.eq(period_start))
            .filter(published_income_statements::Column::PeriodEnd.eq(period_end))
            .select_only()
            .column(published_income_statements::Column::NetIncome)
            .into_tuple()
            .one(rls.transaction())
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;

        Ok(net_income)
    }
}
