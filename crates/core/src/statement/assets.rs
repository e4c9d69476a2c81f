//! Asset side assembly.
//!
//! Candidate accounts are claimed in a fixed order before any balance is read:
//! contra accounts, then explicit categories, then name discoveries. An account
//! that matches several lines counts toward the first one only.

use rust_decimal::Decimal;

use super::context::{Claims, GenerationContext};
use super::sections::{
    Assets, CashAndEquivalents, CurrentAssets, FixedAssets, IntangibleAssets, Inventory,
    Receivables,
};
use crate::chart::classify::{CashClass, FixedAssetClass, IntangibleClass, InventoryClass};
use crate::chart::{AccountRole, AccountType, ChartAccount, categories};
use crate::store::StatementRepository;

/// Non-role asset accounts, one line each.
#[derive(Debug)]
struct AssetAccounts {
    depreciation: Vec<ChartAccount>,
    fixed: Vec<ChartAccount>,
    intangible: Vec<ChartAccount>,
    long_term_investments: Vec<ChartAccount>,
    other: Vec<ChartAccount>,
    cash_equivalents: Vec<ChartAccount>,
    inventory_components: Vec<ChartAccount>,
    prepaid: Vec<ChartAccount>,
}

async fn claim_asset_accounts<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
) -> AssetAccounts {
    let discovery = &ctx.classifications.discovery;
    let (
        depreciation,
        fixed,
        intangible,
        long_term_investments,
        other,
        cash_equivalents,
        inventory_components,
        prepaid,
    ) = tokio::join!(
        ctx.discover_named(AccountType::Asset, &discovery.accumulated_depreciation),
        ctx.discover_category(AccountType::Asset, categories::FIXED_ASSETS),
        ctx.discover_category(AccountType::Asset, categories::INTANGIBLE_ASSETS),
        ctx.discover_category(AccountType::Asset, categories::LONG_TERM_INVESTMENTS),
        ctx.discover_category(AccountType::Asset, categories::OTHER_ASSETS),
        ctx.discover_named(AccountType::Asset, &discovery.cash_equivalents),
        ctx.discover_named(AccountType::Asset, &discovery.inventory_components),
        ctx.discover_named(AccountType::Asset, &discovery.prepaid_expenses),
    );

    let mut claims = Claims::default();
    AssetAccounts {
        depreciation: claims.take(depreciation),
        fixed: claims.take(fixed),
        intangible: claims.take(intangible),
        long_term_investments: claims.take(long_term_investments),
        other: claims.take(other),
        cash_equivalents: claims.take(cash_equivalents),
        inventory_components: claims.take(inventory_components),
        prepaid: claims.take(prepaid),
    }
}

pub(crate) async fn assemble_assets<R: StatementRepository>(ctx: &GenerationContext<'_, R>) -> Assets {
    let accounts = claim_asset_accounts(ctx).await;

    let (current, fixed, intangibles, long_term_investments, other_assets) = tokio::join!(
        current_assets(ctx, &accounts),
        fixed_assets(ctx, &accounts),
        intangible_assets(ctx, &accounts.intangible),
        ctx.total(&accounts.long_term_investments),
        ctx.total(&accounts.other),
    );

    let mut assets = Assets {
        current,
        fixed,
        intangibles,
        long_term_investments,
        other_assets,
        ..Assets::default()
    };
    assets.recalculate();
    assets
}

async fn current_assets<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    accounts: &AssetAccounts,
) -> CurrentAssets {
    let (cash_and_equivalents, receivable, inventory, prepaid) = tokio::join!(
        cash_and_equivalents(ctx, &accounts.cash_equivalents),
        ctx.role_balance(AccountRole::Receivable),
        inventory(ctx, &accounts.inventory_components),
        ctx.total(&accounts.prepaid),
    );

    CurrentAssets {
        cash_and_equivalents,
        accounts_receivable: Receivables::from_balance(
            receivable,
            ctx.settings.doubtful_accounts_rate,
        ),
        inventory,
        prepaid_expenses: prepaid,
        total: Decimal::ZERO,
    }
}

async fn cash_and_equivalents<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    discovered: &[ChartAccount],
) -> CashAndEquivalents {
    let (cash, bank, buckets) = tokio::join!(
        ctx.role_balance(AccountRole::Cash),
        ctx.role_balance(AccountRole::Bank),
        ctx.bucket_totals(discovered, &ctx.classifications.cash),
    );

    CashAndEquivalents {
        cash_on_hand: cash + buckets.amount(CashClass::CashOnHand),
        bank: bank + buckets.amount(CashClass::Bank),
        petty_cash: buckets.amount(CashClass::PettyCash),
        total: Decimal::ZERO,
    }
}

async fn inventory<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    components: &[ChartAccount],
) -> Inventory {
    let (main, buckets) = tokio::join!(
        ctx.role_balance(AccountRole::Inventory),
        ctx.bucket_totals(components, &ctx.classifications.inventory),
    );

    if components.is_empty() {
        return Inventory {
            finished_goods: main.max(Decimal::ZERO),
            ..Inventory::default()
        };
    }

    Inventory {
        raw_materials: buckets.amount(InventoryClass::RawMaterials).max(Decimal::ZERO),
        work_in_progress: buckets.amount(InventoryClass::WorkInProgress).max(Decimal::ZERO),
        finished_goods: (main + buckets.amount(InventoryClass::FinishedGoods)).max(Decimal::ZERO),
        total: Decimal::ZERO,
    }
}

async fn fixed_assets<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    accounts: &AssetAccounts,
) -> FixedAssets {
    let (buckets, accumulated) = tokio::join!(
        ctx.bucket_totals(&accounts.fixed, &ctx.classifications.fixed_assets),
        ctx.total(&accounts.depreciation),
    );

    FixedAssets {
        land: buckets.amount(FixedAssetClass::Land),
        buildings: buckets.amount(FixedAssetClass::Buildings),
        equipment: buckets.amount(FixedAssetClass::Equipment),
        vehicles: buckets.amount(FixedAssetClass::Vehicles),
        furniture: buckets.amount(FixedAssetClass::Furniture),
        computer_equipment: buckets.amount(FixedAssetClass::ComputerEquipment),
        accumulated_depreciation: accumulated.abs(),
        ..FixedAssets::default()
    }
}

// Accumulated amortization was claimed as depreciation before categories.
async fn intangible_assets<R: StatementRepository>(
    ctx: &GenerationContext<'_, R>,
    accounts: &[ChartAccount],
) -> IntangibleAssets {
    let buckets = ctx.bucket_totals(accounts, &ctx.classifications.intangibles).await;

    IntangibleAssets {
        goodwill: buckets.amount(IntangibleClass::Goodwill),
        patents: buckets.amount(IntangibleClass::Patents),
        trademarks: buckets.amount(IntangibleClass::Trademarks),
        software: buckets.amount(IntangibleClass::Software),
        total: Decimal::ZERO,
    }
}
