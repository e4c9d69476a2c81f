//! Statement snapshot persistence.
//!
//! Uniqueness of (tenant, number) and (tenant, period type, period start) is
//! enforced by constraints; a racing insert that loses is reported as the
//! matching [`InsertOutcome`] instead of an error.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use folio_core::{StoreError, StoreResult};
use folio_core::statement::{AuditEntry, PeriodType, StatementSnapshot, StatementStatus};
use folio_core::store::{DeleteOutcome, InsertOutcome, SnapshotStore};
use folio_shared::types::{StatementId, TenantId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr,
};
use uuid::Uuid;

use super::PgRepository;
use super::convert::{
    audit_active_model, db_int, draft_content_model, period_type_to_db, snapshot_active_model,
    snapshot_from_models, status_from_db, status_to_db, unavailable,
};
use crate::entities::sea_orm_active_enums::StatementStatus as DbStatementStatus;
use crate::entities::{statement_audit_entries, statement_snapshots};

const NUMBER_CONSTRAINT: &str = "uq_statement_snapshots_number";
const PERIOD_CONSTRAINT: &str = "uq_statement_snapshots_period";

/// Maps a unique violation on one of the snapshot keys to its outcome.
fn taken_outcome(err: &DbErr) -> Option<InsertOutcome> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains(PERIOD_CONSTRAINT) => {
            Some(InsertOutcome::PeriodTaken)
        }
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains(NUMBER_CONSTRAINT) => {
            Some(InsertOutcome::NumberTaken)
        }
        _ => None,
    }
}

fn tenant_snapshots(tenant_id: TenantId) -> Select<statement_snapshots::Entity> {
    statement_snapshots::Entity::find()
        .filter(statement_snapshots::Column::TenantId.eq(tenant_id.into_inner()))
}

/// Loads the audit trails of `models` in one query and assembles snapshots.
async fn with_trails<C: ConnectionTrait>(
    conn: &C,
    models: Vec<statement_snapshots::Model>,
) -> StoreResult<Vec<StatementSnapshot>> {
    if models.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let entries = statement_audit_entries::Entity::find()
        .filter(statement_audit_entries::Column::StatementId.is_in(ids))
        .order_by_asc(statement_audit_entries::Column::StatementId)
        .order_by_asc(statement_audit_entries::Column::Sequence)
        .all(conn)
        .await
        .map_err(unavailable)?;

    let mut trails: HashMap<Uuid, Vec<statement_audit_entries::Model>> = HashMap::new();
    for entry in entries {
        trails.entry(entry.statement_id).or_default().push(entry);
    }

    models
        .into_iter()
        .map(|model| {
            let trail = trails.remove(&model.id).unwrap_or_default();
            snapshot_from_models(model, trail)
        })
        .collect()
}

/// Appends one audit entry with the next sequence number.
///
/// Locks the snapshot row first so concurrent appends serialize. Returns false
/// if the snapshot does not exist.
async fn append_entry<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    id: StatementId,
    entry: &AuditEntry,
) -> StoreResult<bool> {
    let locked = tenant_snapshots(tenant_id)
        .filter(statement_snapshots::Column::Id.eq(id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(unavailable)?;
    if locked.is_none() {
        return Ok(false);
    }

    let last: Option<i32> = statement_audit_entries::Entity::find()
        .filter(statement_audit_entries::Column::StatementId.eq(id.into_inner()))
        .select_only()
        .column_as(statement_audit_entries::Column::Sequence.max(), "last_sequence")
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await
        .map_err(unavailable)?
        .flatten();

    let next = last.map_or(Ok(1), |n| {
        u32::try_from(n)
            .map(|n| n + 1)
            .map_err(|e| StoreError::Corrupt(format!("audit sequence: {e}")))
    })?;

    audit_active_model(tenant_id, id, entry, next)?
        .insert(conn)
        .await
        .map_err(unavailable)?;
    Ok(true)
}

impl PgRepository {
    async fn find_one(
        &self,
        tenant_id: TenantId,
        query: Select<statement_snapshots::Entity>,
    ) -> StoreResult<Option<StatementSnapshot>> {
        let rls = self.scoped(tenant_id).await?;
        let model = query.one(rls.transaction()).await.map_err(unavailable)?;
        let snapshot = match model {
            Some(model) => with_trails(rls.transaction(), vec![model]).await?.pop(),
            None => None,
        };
        rls.commit().await.map_err(unavailable)?;
        Ok(snapshot)
    }
}

impl SnapshotStore for PgRepository {
    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: StatementId,
    ) -> StoreResult<Option<StatementSnapshot>> {
        let query =
            tenant_snapshots(tenant_id).filter(statement_snapshots::Column::Id.eq(id.into_inner()));
        self.find_one(tenant_id, query).await
    }

    async fn find_by_number(
        &self,
        tenant_id: TenantId,
        statement_number: &str,
    ) -> StoreResult<Option<StatementSnapshot>> {
        let query = tenant_snapshots(tenant_id)
            .filter(statement_snapshots::Column::StatementNumber.eq(statement_number));
        self.find_one(tenant_id, query).await
    }

    async fn find_numbers_with_prefix(
        &self,
        tenant_id: TenantId,
        prefix: &str,
    ) -> StoreResult<Vec<String>> {
        let rls = self.scoped(tenant_id).await?;
        let numbers: Vec<String> = tenant_snapshots(tenant_id)
            .filter(statement_snapshots::Column::StatementNumber.starts_with(prefix))
            .select_only()
            .column(statement_snapshots::Column::StatementNumber)
            .into_tuple()
            .all(rls.transaction())
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;
        Ok(numbers)
    }

    async fn find_latest_by_period_type(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        before: DateTime<Utc>,
    ) -> StoreResult<Option<StatementSnapshot>> {
        let query = tenant_snapshots(tenant_id)
            .filter(statement_snapshots::Column::PeriodType.eq(period_type_to_db(period_type)))
            .filter(statement_snapshots::Column::StatementDate.lt(before))
            .order_by_desc(statement_snapshots::Column::StatementDate);
        self.find_one(tenant_id, query).await
    }

    async fn find_by_period_type_between(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<StatementSnapshot>> {
        let rls = self.scoped(tenant_id).await?;
        let models = tenant_snapshots(tenant_id)
            .filter(statement_snapshots::Column::PeriodType.eq(period_type_to_db(period_type)))
            .filter(statement_snapshots::Column::StatementDate.gte(from))
            .filter(statement_snapshots::Column::StatementDate.lte(to))
            .order_by_asc(statement_snapshots::Column::StatementDate)
            .all(rls.transaction())
            .await
            .map_err(unavailable)?;
        let snapshots = with_trails(rls.transaction(), models).await?;
        rls.commit().await.map_err(unavailable)?;
        Ok(snapshots)
    }

    async fn find_by_tenant_and_period(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> StoreResult<Option<StatementSnapshot>> {
        let query = tenant_snapshots(tenant_id)
            .filter(statement_snapshots::Column::PeriodType.eq(period_type_to_db(period_type)))
            .filter(statement_snapshots::Column::PeriodStart.eq(period_start));
        self.find_one(tenant_id, query).await
    }

    async fn insert_if_absent(&self, snapshot: &StatementSnapshot) -> StoreResult<InsertOutcome> {
        let tenant_id = snapshot.tenant_id;
        let rls = self.scoped(tenant_id).await?;
        let txn = rls.transaction();

        let number_taken = tenant_snapshots(tenant_id)
            .filter(statement_snapshots::Column::StatementNumber.eq(snapshot.statement_number.as_str()))
            .count(txn)
            .await
            .map_err(unavailable)?
            > 0;
        if number_taken {
            rls.commit().await.map_err(unavailable)?;
            return Ok(InsertOutcome::NumberTaken);
        }

        let period_taken = tenant_snapshots(tenant_id)
            .filter(
                statement_snapshots::Column::PeriodType.eq(period_type_to_db(snapshot.period_type)),
            )
            .filter(statement_snapshots::Column::PeriodStart.eq(snapshot.period_start))
            .count(txn)
            .await
            .map_err(unavailable)?
            > 0;
        if period_taken {
            rls.commit().await.map_err(unavailable)?;
            return Ok(InsertOutcome::PeriodTaken);
        }

        let now = Utc::now().fixed_offset();
        let inserted = snapshot_active_model(snapshot, now)?.insert(txn).await;
        if let Err(err) = inserted {
            return match taken_outcome(&err) {
                Some(outcome) => {
                    tracing::debug!(
                        statement_number = %snapshot.statement_number,
                        ?outcome,
                        "lost snapshot insert race"
                    );
                    rls.rollback().await.map_err(unavailable)?;
                    Ok(outcome)
                }
                None => Err(unavailable(err)),
            };
        }

        for (index, entry) in snapshot.audit_trail.iter().enumerate() {
            let sequence = u32::try_from(index + 1).unwrap_or(u32::MAX);
            audit_active_model(tenant_id, snapshot.id, entry, sequence)?
                .insert(txn)
                .await
                .map_err(unavailable)?;
        }

        rls.commit().await.map_err(unavailable)?;
        Ok(InsertOutcome::Inserted)
    }

    async fn update_if_draft(
        &self,
        snapshot: &StatementSnapshot,
        expected_version: u32,
        entry: AuditEntry,
    ) -> StoreResult<bool> {
        let tenant_id = snapshot.tenant_id;
        let content = draft_content_model(snapshot, Utc::now().fixed_offset())?;
        let expected_version = db_int("version", expected_version)?;

        let rls = self.scoped(tenant_id).await?;
        let result = statement_snapshots::Entity::update_many()
            .set(content)
            .filter(statement_snapshots::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(statement_snapshots::Column::Id.eq(snapshot.id.into_inner()))
            .filter(statement_snapshots::Column::Status.eq(DbStatementStatus::Draft))
            .filter(statement_snapshots::Column::Version.eq(expected_version))
            .exec(rls.transaction())
            .await
            .map_err(unavailable)?;

        if result.rows_affected == 0 {
            rls.rollback().await.map_err(unavailable)?;
            return Ok(false);
        }

        append_entry(rls.transaction(), tenant_id, snapshot.id, &entry).await?;
        rls.commit().await.map_err(unavailable)?;
        Ok(true)
    }

    async fn update_status(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        from: StatementStatus,
        to: StatementStatus,
        entry: AuditEntry,
    ) -> StoreResult<bool> {
        let rls = self.scoped(tenant_id).await?;
        let change = statement_snapshots::ActiveModel {
            status: Set(status_to_db(to)),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        let result = statement_snapshots::Entity::update_many()
            .set(change)
            .filter(statement_snapshots::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(statement_snapshots::Column::Id.eq(id.into_inner()))
            .filter(statement_snapshots::Column::Status.eq(status_to_db(from)))
            .exec(rls.transaction())
            .await
            .map_err(unavailable)?;

        if result.rows_affected == 0 {
            rls.rollback().await.map_err(unavailable)?;
            return Ok(false);
        }

        append_entry(rls.transaction(), tenant_id, id, &entry).await?;
        rls.commit().await.map_err(unavailable)?;
        Ok(true)
    }

    async fn append_audit(
        &self,
        tenant_id: TenantId,
        id: StatementId,
        entry: AuditEntry,
    ) -> StoreResult<bool> {
        let rls = self.scoped(tenant_id).await?;
        if !append_entry(rls.transaction(), tenant_id, id, &entry).await? {
            rls.rollback().await.map_err(unavailable)?;
            return Ok(false);
        }
        rls.commit().await.map_err(unavailable)?;
        Ok(true)
    }

    async fn delete_if_draft(
        &self,
        tenant_id: TenantId,
        id: StatementId,
    ) -> StoreResult<DeleteOutcome> {
        let rls = self.scoped(tenant_id).await?;
        let txn = rls.transaction();

        let Some(model) = tenant_snapshots(tenant_id)
            .filter(statement_snapshots::Column::Id.eq(id.into_inner()))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(unavailable)?
        else {
            rls.rollback().await.map_err(unavailable)?;
            return Ok(DeleteOutcome::NotFound);
        };

        if model.status != DbStatementStatus::Draft {
            rls.rollback().await.map_err(unavailable)?;
            return Ok(DeleteOutcome::NotDraft(status_from_db(model.status)));
        }

        // Audit rows go with the snapshot via ON DELETE CASCADE.
        statement_snapshots::Entity::delete_by_id(model.id)
            .exec(txn)
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;
        Ok(DeleteOutcome::Deleted)
    }
}
