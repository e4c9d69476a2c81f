//! `SeaORM` entity definitions.

pub mod account_role_mappings;
pub mod chart_of_accounts;
pub mod ledger_transactions;
pub mod published_income_statements;
pub mod sales_orders;
pub mod sea_orm_active_enums;
pub mod statement_audit_entries;
pub mod statement_snapshots;
