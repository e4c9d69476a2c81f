//! Equity side assembly.

use rust_decimal::Decimal;

use super::context::GenerationContext;
use super::error::StatementError;
use super::retained::retained_earnings;
use super::sections::{ContributedCapital, Equity, OtherEquity};
use crate::chart::classify::{ContributedClass, EquityGroup, OtherEquityClass};
use crate::chart::{AccountFilter, AccountType};
use crate::store::StatementRepository;

pub(crate) async fn assemble_equity<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
) -> Result<Equity, StatementError> {
    let accounts = ctx
        .chart
        .discover(&AccountFilter::of_type(AccountType::Equity))
        .await;

    let mut contributed = Vec::new();
    let mut other = Vec::new();
    let mut dividend_codes = Vec::new();
    for account in accounts {
        match ctx.classifications.equity_groups.classify(&account) {
            EquityGroup::Contributed => contributed.push(account),
            EquityGroup::Other => other.push(account),
            EquityGroup::Dividends => dividend_codes.push(account.code),
            // Carried through the period chain, not read from the ledger.
            EquityGroup::RetainedEarnings => {}
        }
    }

    let (contributed_buckets, other_buckets, retained) = tokio::join!(
        ctx.bucket_totals(&contributed, &ctx.classifications.contributed_capital),
        ctx.bucket_totals(&other, &ctx.classifications.other_equity),
        retained_earnings(ctx, &dividend_codes),
    );

    let mut equity = Equity {
        contributed_capital: ContributedCapital {
            common_stock: contributed_buckets.amount(ContributedClass::CommonStock),
            preferred_stock: contributed_buckets.amount(ContributedClass::PreferredStock),
            additional_paid_in_capital: contributed_buckets
                .amount(ContributedClass::AdditionalPaidInCapital),
            total: Decimal::ZERO,
        },
        retained_earnings: retained?,
        other_equity: OtherEquity {
            treasury_stock: other_buckets.amount(OtherEquityClass::TreasuryStock).abs(),
            other_comprehensive_income: other_buckets
                .amount(OtherEquityClass::OtherComprehensiveIncome),
            total: Decimal::ZERO,
        },
        total_equity: Decimal::ZERO,
    };
    equity.recalculate();
    Ok(equity)
}
