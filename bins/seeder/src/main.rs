//! Demo data seeder for Folio development and testing.
//!
//! Seeds one tenant with a small chart of accounts, role mappings, a month of
//! completed ledger activity, a paid-but-undelivered sales order and the
//! previous month's published income statement.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use folio_db::entities::{
    account_role_mappings, chart_of_accounts, ledger_transactions, published_income_statements,
    sales_orders,
    sea_orm_active_enums::{AccountType, LedgerStatus, NormalBalance, PaymentStatus},
};
use folio_db::rls::RlsConnection;
use folio_shared::types::TenantId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

/// Demo tenant id (stable across runs).
const DEMO_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

struct SeedAccount {
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    category: Option<&'static str>,
    opening_balance: Decimal,
}

const fn seed(
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    category: Option<&'static str>,
    opening_balance: Decimal,
) -> SeedAccount {
    SeedAccount {
        code,
        name,
        account_type,
        category,
        opening_balance,
    }
}

fn demo_chart() -> Vec<SeedAccount> {
    vec![
        seed("1001", "Cash on Hand", AccountType::Asset, Some("current_assets"), dec!(5000)),
        seed("1002", "Bank - Operating", AccountType::Asset, Some("current_assets"), dec!(20000)),
        seed("1101", "Accounts Receivable", AccountType::Asset, Some("current_assets"), dec!(3000)),
        seed("1201", "Merchandise Inventory", AccountType::Asset, Some("current_assets"), dec!(4000)),
        seed("1501", "Office Equipment", AccountType::Asset, Some("fixed_assets"), dec!(10000)),
        seed("1590", "Accumulated Depreciation", AccountType::Asset, Some("fixed_assets"), dec!(0)),
        seed("2001", "Accounts Payable", AccountType::Liability, Some("current_liabilities"), dec!(2000)),
        seed("2101", "Accrued Salaries", AccountType::Liability, Some("accrued_expenses"), dec!(0)),
        seed("3001", "Common Stock", AccountType::Equity, None, dec!(40000)),
        seed("3201", "Dividends Declared", AccountType::Equity, None, dec!(0)),
        seed("4001", "Sales Revenue", AccountType::Revenue, None, dec!(0)),
        seed("5001", "Rent Expense", AccountType::Expense, None, dec!(0)),
        seed("5002", "Depreciation Expense", AccountType::Expense, None, dec!(0)),
    ]
}

fn normal_balance(account_type: AccountType) -> NormalBalance {
    match account_type {
        AccountType::Asset | AccountType::Expense => NormalBalance::Debit,
        AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
            NormalBalance::Credit
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let tenant_id = TenantId::from_uuid(Uuid::parse_str(DEMO_TENANT_ID)?);

    println!("Connecting to database...");
    let db = folio_db::connect(&database_url).await?;

    let rls = RlsConnection::new(&db, tenant_id).await?;
    let txn = rls.transaction();

    let existing = chart_of_accounts::Entity::find()
        .filter(chart_of_accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .count(txn)
        .await?;
    if existing > 0 {
        println!("  Demo tenant already seeded, skipping...");
        rls.rollback().await?;
        return Ok(());
    }

    let now = Utc::now();
    let month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .context("invalid current month")?;

    println!("Seeding chart of accounts...");
    seed_chart(txn, tenant_id, now.fixed_offset()).await?;

    println!("Seeding role mappings...");
    seed_role_mappings(txn, tenant_id).await?;

    println!("Seeding ledger activity...");
    seed_ledger(txn, tenant_id, month_start, now.fixed_offset()).await?;

    println!("Seeding sales orders...");
    seed_sales_orders(txn, tenant_id, month_start, now.fixed_offset()).await?;

    println!("Seeding published income statement...");
    seed_published_income(txn, tenant_id, month_start, now.fixed_offset()).await?;

    rls.commit().await?;
    println!("Seeding complete! Demo tenant: {tenant_id}");
    Ok(())
}

async fn seed_chart(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    for account in demo_chart() {
        chart_of_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            code: Set(account.code.to_string()),
            name: Set(account.name.to_string()),
            account_type: Set(account.account_type),
            category: Set(account.category.map(str::to_string)),
            normal_balance: Set(normal_balance(account.account_type)),
            opening_balance: Set(account.opening_balance),
            is_active: Set(true),
            allow_direct_posting: Set(true),
            is_system_account: Set(false),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .with_context(|| format!("inserting account {}", account.code))?;
    }

    // Rollup parent; never read by aggregation.
    chart_of_accounts::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant_id.into_inner()),
        code: Set("1000".to_string()),
        name: Set("Current Assets".to_string()),
        account_type: Set(AccountType::Asset),
        category: Set(Some("current_assets".to_string())),
        normal_balance: Set(NormalBalance::Debit),
        opening_balance: Set(Decimal::ZERO),
        is_active: Set(true),
        allow_direct_posting: Set(false),
        is_system_account: Set(true),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    println!("  Created {} accounts", demo_chart().len() + 1);
    Ok(())
}

async fn seed_role_mappings(txn: &DatabaseTransaction, tenant_id: TenantId) -> anyhow::Result<()> {
    let roles = [
        ("cash", "1001"),
        ("bank", "1002"),
        ("receivable", "1101"),
        ("inventory", "1201"),
        ("payable", "2001"),
    ];

    for (role, code) in roles {
        account_role_mappings::ActiveModel {
            tenant_id: Set(tenant_id.into_inner()),
            role: Set(role.to_string()),
            account_code: Set(code.to_string()),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

fn day_of(month_start: NaiveDate, day: i64) -> anyhow::Result<DateTime<FixedOffset>> {
    let date = month_start + Duration::days(day);
    let at = date.and_hms_opt(10, 0, 0).context("invalid posting time")?;
    Ok(Utc.from_utc_datetime(&at).fixed_offset())
}

async fn seed_ledger(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    month_start: NaiveDate,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    // (code, debit, credit, day offset, status, description)
    let postings = [
        ("1001", dec!(1500), dec!(0), 0, LedgerStatus::Completed, "Cash sales"),
        ("4001", dec!(0), dec!(1500), 0, LedgerStatus::Completed, "Cash sales"),
        ("5001", dec!(600), dec!(0), 1, LedgerStatus::Completed, "Monthly rent"),
        ("1002", dec!(0), dec!(600), 1, LedgerStatus::Completed, "Monthly rent"),
        ("5002", dec!(200), dec!(0), 2, LedgerStatus::Completed, "Equipment depreciation"),
        ("1590", dec!(0), dec!(200), 2, LedgerStatus::Completed, "Equipment depreciation"),
        ("1001", dec!(900), dec!(0), 3, LedgerStatus::Pending, "Unsettled card batch"),
    ];

    let mut inserted = 0;
    for (code, debit, credit, day, status, description) in postings {
        ledger_transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            account_code: Set(code.to_string()),
            debit: Set(debit),
            credit: Set(credit),
            occurred_at: Set(day_of(month_start, day)?),
            status: Set(status),
            description: Set(Some(description.to_string())),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
        inserted += 1;
    }

    println!("  Inserted {inserted} ledger rows");
    Ok(())
}

async fn seed_sales_orders(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    month_start: NaiveDate,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    // (number, total, payment status, delivered)
    let orders = [
        ("SO-0001", dec!(250), PaymentStatus::Completed, false),
        ("SO-0002", dec!(400), PaymentStatus::Completed, true),
        ("SO-0003", dec!(120), PaymentStatus::Pending, false),
    ];

    for (number, total, payment_status, delivered) in orders {
        let ordered_at = day_of(month_start, 0)?;
        sales_orders::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            order_number: Set(number.to_string()),
            order_date: Set(ordered_at),
            total_amount: Set(total),
            payment_status: Set(payment_status),
            delivered_at: Set(delivered.then_some(ordered_at)),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn seed_published_income(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    month_start: NaiveDate,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    let previous_end = month_start.pred_opt().context("no previous month")?;
    let previous_start = NaiveDate::from_ymd_opt(previous_end.year(), previous_end.month(), 1)
        .context("invalid previous month")?;

    published_income_statements::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant_id.into_inner()),
        period_start: Set(previous_start),
        period_end: Set(previous_end),
        net_income: Set(dec!(850)),
        published_at: Set(now),
    }
    .insert(txn)
    .await?;
    Ok(())
}
