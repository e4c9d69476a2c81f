//! `SeaORM` Entity for statement_snapshots table.
//!
//! Section bodies are stored as JSONB; totals are recomputed on write, so the
//! JSON is the source of truth.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PeriodType, StatementStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "statement_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub statement_number: String,
    pub statement_date: DateTimeWithTimeZone,
    pub period_type: PeriodType,
    pub period_start: Date,
    pub status: StatementStatus,
    #[sea_orm(column_type = "JsonBinary")]
    pub assets: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub liabilities: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub equity: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub balance_check: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub warnings: Json,
    pub notes: Option<String>,
    pub generated_by: Uuid,
    pub generated_at: DateTimeWithTimeZone,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::statement_audit_entries::Entity")]
    StatementAuditEntries,
}

impl Related<super::statement_audit_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatementAuditEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
