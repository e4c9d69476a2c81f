//! Retained earnings carried forward through the period chain.

use rust_decimal::Decimal;

use super::context::GenerationContext;
use super::error::StatementError;
use super::income::current_period_earnings;
use super::sections::RetainedEarnings;
use crate::store::StatementRepository;

/// Rolls retained earnings forward from the most recent prior snapshot of the
/// same period type.
///
/// A failed prior-snapshot lookup aborts generation instead of degrading.
pub(crate) async fn retained_earnings<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    dividend_codes: &[String],
) -> Result<RetainedEarnings, StatementError> {
    let (prior, (earnings, earnings_source), dividends_paid) = tokio::join!(
        ctx.repo
            .find_latest_by_period_type(ctx.tenant_id, ctx.period_type, ctx.cutoff),
        current_period_earnings(ctx),
        dividends_paid(ctx, dividend_codes),
    );

    let prior = prior.map_err(|err| {
        StatementError::Aggregation(format!("prior {} statement lookup failed: {err}", ctx.period_type))
    })?;

    let beginning = match &prior {
        Some(snapshot) => {
            tracing::debug!(
                tenant_id = %ctx.tenant_id,
                prior = %snapshot.statement_number,
                ending = %snapshot.equity.retained_earnings.ending,
                "carrying forward retained earnings"
            );
            snapshot.equity.retained_earnings.ending
        }
        None => Decimal::ZERO,
    };

    let mut retained = RetainedEarnings {
        beginning,
        current_period_earnings: earnings,
        dividends_paid,
        ending: Decimal::ZERO,
        earnings_source,
    };
    retained.recalculate();
    Ok(retained)
}

async fn dividends_paid<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    codes: &[String],
) -> Decimal {
    if codes.is_empty() {
        return Decimal::ZERO;
    }

    match ctx
        .repo
        .find_dividend_debits(ctx.tenant_id, codes, ctx.interval_start(), ctx.cutoff)
        .await
    {
        Ok(debits) => debits.into_iter().sum(),
        Err(err) => {
            ctx.warnings.record("dividends", None, err);
            Decimal::ZERO
        }
    }
}
