//! Current-period earnings.
//!
//! A published income statement for the exact interval wins. Otherwise net
//! income is recomputed from revenue and expense activity in the interval.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::context::GenerationContext;
use super::sections::EarningsSource;
use crate::chart::{AccountFilter, AccountType, ChartAccount, categories};
use crate::store::StatementRepository;

/// Income statement figures for one interval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSummary {
    /// Revenue.
    pub revenue: Decimal,
    /// Cost of goods sold.
    pub cost_of_goods_sold: Decimal,
    /// Revenue - COGS.
    pub gross_profit: Decimal,
    /// Operating expenses.
    pub operating_expenses: Decimal,
    /// Gross profit - operating expenses.
    pub operating_income: Decimal,
    /// Non-operating expenses.
    pub other_expenses: Decimal,
    /// Operating income - other expenses.
    pub net_income: Decimal,
}

impl IncomeSummary {
    /// Builds the summary from interval activity.
    #[must_use]
    pub fn from_activity(
        revenue: Decimal,
        cost_of_goods_sold: Decimal,
        operating_expenses: Decimal,
        other_expenses: Decimal,
    ) -> Self {
        let gross_profit = revenue - cost_of_goods_sold;
        let operating_income = gross_profit - operating_expenses;
        Self {
            revenue,
            cost_of_goods_sold,
            gross_profit,
            operating_expenses,
            operating_income,
            other_expenses,
            net_income: operating_income - other_expenses,
        }
    }
}

pub(crate) async fn current_period_earnings<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
) -> (Decimal, EarningsSource) {
    let period_end = ctx.cutoff.date_naive();
    match ctx
        .repo
        .find_published(ctx.tenant_id, ctx.period_start, period_end)
        .await
    {
        Ok(Some(net_income)) => return (net_income, EarningsSource::Published),
        Ok(None) => tracing::debug!(
            tenant_id = %ctx.tenant_id,
            period_start = %ctx.period_start,
            %period_end,
            "no published income statement, recomputing"
        ),
        Err(err) => ctx.warnings.record("published_income", None, err),
    }

    match recompute(ctx).await {
        Some(summary) => (summary.net_income, EarningsSource::Recomputed),
        None => (Decimal::ZERO, EarningsSource::Unavailable),
    }
}

/// Recomputes the income summary from interval activity.
///
/// `None` when the tenant has no P&L accounts, or when any account list or
/// account activity could not be read: a partial figure is never returned.
pub(crate) async fn recompute<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
) -> Option<IncomeSummary> {
    let revenue_filter = AccountFilter::of_type(AccountType::Revenue);
    let expense_filter = AccountFilter::of_type(AccountType::Expense);
    let (revenue_accounts, expense_accounts) = tokio::join!(
        ctx.chart.try_resolve_pattern(&revenue_filter),
        ctx.chart.try_resolve_pattern(&expense_filter),
    );
    let (revenue_accounts, expense_accounts) = (revenue_accounts?, expense_accounts?);
    if revenue_accounts.is_empty() && expense_accounts.is_empty() {
        return None;
    }

    let (cogs, rest): (Vec<ChartAccount>, Vec<ChartAccount>) = expense_accounts
        .into_iter()
        .partition(|a| a.in_category(categories::COST_OF_GOODS_SOLD));
    let (other, operating): (Vec<ChartAccount>, Vec<ChartAccount>) = rest
        .into_iter()
        .partition(|a| a.in_category(categories::OTHER_EXPENSES));

    let from = ctx.interval_start();
    let to = ctx.cutoff;
    let (revenue, cogs, operating, other) = tokio::join!(
        ctx.ledger.complete_activity(&revenue_accounts, from, to),
        ctx.ledger.complete_activity(&cogs, from, to),
        ctx.ledger.complete_activity(&operating, from, to),
        ctx.ledger.complete_activity(&other, from, to),
    );

    Some(IncomeSummary::from_activity(revenue?, cogs?, operating?, other?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_income_summary_math() {
        let summary = IncomeSummary::from_activity(dec!(10000), dec!(4000), dec!(3500), dec!(500));
        assert_eq!(summary.gross_profit, dec!(6000));
        assert_eq!(summary.operating_income, dec!(2500));
        assert_eq!(summary.net_income, dec!(2000));
    }

    #[test]
    fn test_loss_is_negative() {
        let summary = IncomeSummary::from_activity(dec!(100), dec!(0), dec!(250), dec!(0));
        assert_eq!(summary.net_income, dec!(-150));
    }
}
