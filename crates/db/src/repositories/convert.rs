//! Mapping between `SeaORM` models and engine domain types.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Utc};
use folio_core::chart::{AccountType, ChartAccount};
use folio_core::ledger::NormalBalance;
use folio_core::statement::{
    AuditAction, AuditEntry, PeriodType, StatementMetadata, StatementSnapshot, StatementStatus,
};
use folio_core::StoreError;
use folio_shared::types::{StatementId, TenantId, UserId};
use sea_orm::{DbErr, Set};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::entities::{
    chart_of_accounts, sea_orm_active_enums as db_enums, statement_audit_entries,
    statement_snapshots,
};

pub(crate) fn unavailable(err: DbErr) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn corrupt(what: &str, err: impl Display) -> StoreError {
    StoreError::Corrupt(format!("{what}: {err}"))
}

pub(crate) fn utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

pub(crate) fn account_type_to_db(account_type: AccountType) -> db_enums::AccountType {
    match account_type {
        AccountType::Asset => db_enums::AccountType::Asset,
        AccountType::Liability => db_enums::AccountType::Liability,
        AccountType::Equity => db_enums::AccountType::Equity,
        AccountType::Revenue => db_enums::AccountType::Revenue,
        AccountType::Expense => db_enums::AccountType::Expense,
    }
}

fn account_type_from_db(account_type: db_enums::AccountType) -> AccountType {
    match account_type {
        db_enums::AccountType::Asset => AccountType::Asset,
        db_enums::AccountType::Liability => AccountType::Liability,
        db_enums::AccountType::Equity => AccountType::Equity,
        db_enums::AccountType::Revenue => AccountType::Revenue,
        db_enums::AccountType::Expense => AccountType::Expense,
    }
}

pub(crate) fn period_type_to_db(period_type: PeriodType) -> db_enums::PeriodType {
    match period_type {
        PeriodType::Monthly => db_enums::PeriodType::Monthly,
        PeriodType::Quarterly => db_enums::PeriodType::Quarterly,
        PeriodType::Yearly => db_enums::PeriodType::Yearly,
    }
}

fn period_type_from_db(period_type: db_enums::PeriodType) -> PeriodType {
    match period_type {
        db_enums::PeriodType::Monthly => PeriodType::Monthly,
        db_enums::PeriodType::Quarterly => PeriodType::Quarterly,
        db_enums::PeriodType::Yearly => PeriodType::Yearly,
    }
}

pub(crate) fn status_to_db(status: StatementStatus) -> db_enums::StatementStatus {
    match status {
        StatementStatus::Draft => db_enums::StatementStatus::Draft,
        StatementStatus::Review => db_enums::StatementStatus::Review,
        StatementStatus::Approved => db_enums::StatementStatus::Approved,
        StatementStatus::Final => db_enums::StatementStatus::Final,
    }
}

pub(crate) fn status_from_db(status: db_enums::StatementStatus) -> StatementStatus {
    match status {
        db_enums::StatementStatus::Draft => StatementStatus::Draft,
        db_enums::StatementStatus::Review => StatementStatus::Review,
        db_enums::StatementStatus::Approved => StatementStatus::Approved,
        db_enums::StatementStatus::Final => StatementStatus::Final,
    }
}

fn action_to_db(action: AuditAction) -> db_enums::AuditAction {
    match action {
        AuditAction::Created => db_enums::AuditAction::Created,
        AuditAction::Updated => db_enums::AuditAction::Updated,
        AuditAction::Approved => db_enums::AuditAction::Approved,
        AuditAction::Rejected => db_enums::AuditAction::Rejected,
        AuditAction::Exported => db_enums::AuditAction::Exported,
        AuditAction::Viewed => db_enums::AuditAction::Viewed,
    }
}

fn action_from_db(action: db_enums::AuditAction) -> AuditAction {
    match action {
        db_enums::AuditAction::Created => AuditAction::Created,
        db_enums::AuditAction::Updated => AuditAction::Updated,
        db_enums::AuditAction::Approved => AuditAction::Approved,
        db_enums::AuditAction::Rejected => AuditAction::Rejected,
        db_enums::AuditAction::Exported => AuditAction::Exported,
        db_enums::AuditAction::Viewed => AuditAction::Viewed,
    }
}

pub(crate) fn chart_account_from_model(model: chart_of_accounts::Model) -> ChartAccount {
    ChartAccount {
        code: model.code,
        name: model.name,
        account_type: account_type_from_db(model.account_type),
        category: model.category,
        normal_balance: match model.normal_balance {
            db_enums::NormalBalance::Debit => NormalBalance::Debit,
            db_enums::NormalBalance::Credit => NormalBalance::Credit,
        },
        opening_balance: model.opening_balance,
        is_active: model.is_active,
        allow_direct_posting: model.allow_direct_posting,
        is_system_account: model.is_system_account,
    }
}

fn decode<T: DeserializeOwned>(what: &str, value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| corrupt(what, e))
}

pub(crate) fn encode<T: Serialize>(what: &str, value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| corrupt(what, e))
}

pub(crate) fn db_int(what: &str, value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|e| corrupt(what, e))
}

fn audit_entry_from_model(model: statement_audit_entries::Model) -> Result<AuditEntry, StoreError> {
    Ok(AuditEntry {
        sequence: u32::try_from(model.sequence).map_err(|e| corrupt("audit sequence", e))?,
        action: action_from_db(model.action),
        performed_by: UserId::from_uuid(model.performed_by),
        details: model.details,
        changes: model.changes,
        performed_at: utc(model.performed_at),
    })
}

/// Rebuilds a snapshot from its row and its audit rows, ordered by sequence.
pub(crate) fn snapshot_from_models(
    model: statement_snapshots::Model,
    entries: Vec<statement_audit_entries::Model>,
) -> Result<StatementSnapshot, StoreError> {
    let audit_trail = entries
        .into_iter()
        .map(audit_entry_from_model)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StatementSnapshot {
        id: StatementId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        statement_number: model.statement_number,
        statement_date: utc(model.statement_date),
        period_type: period_type_from_db(model.period_type),
        period_start: model.period_start,
        status: status_from_db(model.status),
        assets: decode("assets", model.assets)?,
        liabilities: decode("liabilities", model.liabilities)?,
        equity: decode("equity", model.equity)?,
        balance_check: decode("balance_check", model.balance_check)?,
        notes: model.notes,
        warnings: decode("warnings", model.warnings)?,
        metadata: StatementMetadata {
            generated_by: UserId::from_uuid(model.generated_by),
            generated_at: utc(model.generated_at),
            version: u32::try_from(model.version).map_err(|e| corrupt("version", e))?,
        },
        audit_trail,
    })
}

/// Full row for a new snapshot.
pub(crate) fn snapshot_active_model(
    snapshot: &StatementSnapshot,
    now: DateTime<FixedOffset>,
) -> Result<statement_snapshots::ActiveModel, StoreError> {
    Ok(statement_snapshots::ActiveModel {
        id: Set(snapshot.id.into_inner()),
        tenant_id: Set(snapshot.tenant_id.into_inner()),
        statement_number: Set(snapshot.statement_number.clone()),
        statement_date: Set(snapshot.statement_date.fixed_offset()),
        period_type: Set(period_type_to_db(snapshot.period_type)),
        period_start: Set(snapshot.period_start),
        status: Set(status_to_db(snapshot.status)),
        assets: Set(encode("assets", &snapshot.assets)?),
        liabilities: Set(encode("liabilities", &snapshot.liabilities)?),
        equity: Set(encode("equity", &snapshot.equity)?),
        balance_check: Set(encode("balance_check", &snapshot.balance_check)?),
        warnings: Set(encode("warnings", &snapshot.warnings)?),
        notes: Set(snapshot.notes.clone()),
        generated_by: Set(snapshot.metadata.generated_by.into_inner()),
        generated_at: Set(snapshot.metadata.generated_at.fixed_offset()),
        version: Set(db_int("version", snapshot.metadata.version)?),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

/// Content columns replaced by a draft edit; everything else stays `NotSet`.
pub(crate) fn draft_content_model(
    snapshot: &StatementSnapshot,
    now: DateTime<FixedOffset>,
) -> Result<statement_snapshots::ActiveModel, StoreError> {
    Ok(statement_snapshots::ActiveModel {
        assets: Set(encode("assets", &snapshot.assets)?),
        liabilities: Set(encode("liabilities", &snapshot.liabilities)?),
        equity: Set(encode("equity", &snapshot.equity)?),
        balance_check: Set(encode("balance_check", &snapshot.balance_check)?),
        notes: Set(snapshot.notes.clone()),
        version: Set(db_int("version", snapshot.metadata.version)?),
        updated_at: Set(now),
        ..Default::default()
    })
}

pub(crate) fn audit_active_model(
    tenant_id: TenantId,
    statement_id: StatementId,
    entry: &AuditEntry,
    sequence: u32,
) -> Result<statement_audit_entries::ActiveModel, StoreError> {
    Ok(statement_audit_entries::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant_id.into_inner()),
        statement_id: Set(statement_id.into_inner()),
        sequence: Set(db_int("audit sequence", sequence)?),
        action: Set(action_to_db(entry.action)),
        performed_by: Set(entry.performed_by.into_inner()),
        details: Set(entry.details.clone()),
        changes: Set(entry.changes.clone()),
        performed_at: Set(entry.performed_at.fixed_offset()),
    })
}
