//! `SeaORM` Entity for statement_audit_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AuditAction;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "statement_audit_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub statement_id: Uuid,
    pub sequence: i32,
    pub action: AuditAction,
    pub performed_by: Uuid,
    pub details: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub changes: Option<Json>,
    pub performed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::statement_snapshots::Entity",
        from = "Column::StatementId",
        to = "super::statement_snapshots::Column::Id",
        on_delete = "Cascade"
    )]
    StatementSnapshots,
}

impl Related<super::statement_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatementSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
