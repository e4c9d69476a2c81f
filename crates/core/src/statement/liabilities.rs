//! Liability side assembly.
//!
//! Accounts are claimed before balances are read: the accrued expenses
//! category first, then name discoveries from the most current to the least,
//! and the long-term category last. Each account counts toward one line.

use rust_decimal::Decimal;

use super::context::{Claims, GenerationContext};
use super::sections::{
    AccruedExpenses, CurrentLiabilities, Liabilities, LongTermDebt, LongTermLiabilities,
    ShortTermDebt,
};
use crate::chart::classify::{AccruedClass, LongTermDebtClass, ShortTermDebtClass};
use crate::chart::{AccountRole, AccountType, ChartAccount, categories};
use crate::store::StatementRepository;

/// Non-role liability accounts, one line each.
#[derive(Debug)]
struct LiabilityAccounts {
    accrued: Vec<ChartAccount>,
    sales_tax: Vec<ChartAccount>,
    short_term_debt: Vec<ChartAccount>,
    long_term_debt: Vec<ChartAccount>,
    deferred_tax: Vec<ChartAccount>,
    pension: Vec<ChartAccount>,
    other_long_term: Vec<ChartAccount>,
}

async fn claim_liability_accounts<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
) -> LiabilityAccounts {
    let discovery = &ctx.classifications.discovery;
    let (accrued, sales_tax, short_term_debt, long_term_debt, deferred_tax, pension, long_term) =
        tokio::join!(
            ctx.discover_category(AccountType::Liability, categories::ACCRUED_EXPENSES),
            ctx.discover_named(AccountType::Liability, &discovery.sales_tax_payable),
            ctx.discover_named(AccountType::Liability, &discovery.short_term_debt),
            ctx.discover_named(AccountType::Liability, &discovery.long_term_debt),
            ctx.discover_named(AccountType::Liability, &discovery.deferred_tax),
            ctx.discover_named(AccountType::Liability, &discovery.pension),
            ctx.discover_category(AccountType::Liability, categories::LONG_TERM_LIABILITIES),
        );

    let mut claims = Claims::default();
    LiabilityAccounts {
        accrued: claims.take(accrued),
        sales_tax: claims.take(sales_tax),
        short_term_debt: claims.take(short_term_debt),
        long_term_debt: claims.take(long_term_debt),
        deferred_tax: claims.take(deferred_tax),
        pension: claims.take(pension),
        other_long_term: claims.take(long_term),
    }
}

pub(crate) async fn assemble_liabilities<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
) -> Liabilities {
    let accounts = claim_liability_accounts(ctx).await;

    let (current, long_term) = tokio::join!(
        current_liabilities(ctx, &accounts),
        long_term_liabilities(ctx, &accounts),
    );

    let mut liabilities = Liabilities {
        current,
        long_term,
        ..Liabilities::default()
    };
    liabilities.recalculate();
    liabilities
}

async fn current_liabilities<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    accounts: &LiabilityAccounts,
) -> CurrentLiabilities {
    let (payable, accrued_expenses, short_term_debt, deferred_revenue) = tokio::join!(
        ctx.role_balance(AccountRole::Payable),
        accrued_expenses(ctx, accounts),
        short_term_debt(ctx, &accounts.short_term_debt),
        deferred_revenue(ctx),
    );

    CurrentLiabilities {
        accounts_payable: payable.max(Decimal::ZERO),
        accrued_expenses,
        short_term_debt,
        deferred_revenue,
        total: Decimal::ZERO,
    }
}

async fn accrued_expenses<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    accounts: &LiabilityAccounts,
) -> AccruedExpenses {
    let (buckets, sales_tax_total) = tokio::join!(
        ctx.bucket_totals(&accounts.accrued, &ctx.classifications.accrued_expenses),
        ctx.total(&accounts.sales_tax),
    );

    AccruedExpenses {
        salaries: buckets.amount(AccruedClass::Salaries),
        utilities: buckets.amount(AccruedClass::Utilities),
        rent: buckets.amount(AccruedClass::Rent),
        taxes: buckets.amount(AccruedClass::Taxes) + sales_tax_total,
        interest: buckets.amount(AccruedClass::Interest),
        other: buckets.amount(AccruedClass::Other),
        total: Decimal::ZERO,
    }
}

async fn short_term_debt<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    accounts: &[ChartAccount],
) -> ShortTermDebt {
    let buckets = ctx.bucket_totals(accounts, &ctx.classifications.short_term_debt).await;
    ShortTermDebt {
        credit_lines: buckets.amount(ShortTermDebtClass::CreditLines),
        short_term_loans: buckets.amount(ShortTermDebtClass::ShortTermLoans),
        credit_card_debt: buckets.amount(ShortTermDebtClass::CreditCardDebt),
        total: Decimal::ZERO,
    }
}

async fn deferred_revenue<R: StatementRepository>(ctx: &GenerationContext<'_, R>) -> Decimal {
    match ctx
        .repo
        .find_deferred_revenue_orders(ctx.tenant_id, ctx.cutoff)
        .await
    {
        Ok(amounts) => amounts.into_iter().sum(),
        Err(err) => {
            ctx.warnings.record("deferred_revenue", None, err);
            Decimal::ZERO
        }
    }
}

async fn long_term_liabilities<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    accounts: &LiabilityAccounts,
) -> LongTermLiabilities {
    let (buckets, deferred_tax_total, pension_total, other_total) = tokio::join!(
        ctx.bucket_totals(&accounts.long_term_debt, &ctx.classifications.long_term_debt),
        ctx.total(&accounts.deferred_tax),
        ctx.total(&accounts.pension),
        ctx.total(&accounts.other_long_term),
    );

    LongTermLiabilities {
        long_term_debt: LongTermDebt {
            mortgages: buckets.amount(LongTermDebtClass::Mortgages),
            long_term_loans: buckets.amount(LongTermDebtClass::LongTermLoans),
            bonds: buckets.amount(LongTermDebtClass::Bonds),
            total: Decimal::ZERO,
        },
        deferred_tax_liabilities: deferred_tax_total,
        pension_liabilities: pension_total,
        other_long_term_liabilities: other_total,
        total: Decimal::ZERO,
    }
}
