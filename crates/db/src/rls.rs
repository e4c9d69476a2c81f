//! Row-Level Security (RLS) tenant scoping.
//!
//! Every repository operation runs inside a transaction that first sets
//! `app.current_tenant_id`; the policies in the migration filter every table
//! on it.
//!
//! # Usage
//!
//! ```ignore
//! use folio_db::rls::RlsConnection;
//!
//! let rls = RlsConnection::new(&db, tenant_id).await?;
//! let accounts = chart_of_accounts::Entity::find().all(rls.transaction()).await?;
//! rls.commit().await?;
//! ```

use folio_shared::types::TenantId;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// `SET LOCAL` statement scoping the current transaction to one tenant.
#[must_use]
pub fn tenant_context_sql(tenant_id: TenantId) -> String {
    format!("SET LOCAL app.current_tenant_id = '{tenant_id}'")
}

/// A transaction scoped to one tenant by the RLS policies.
///
/// Dropping it without [`Self::commit`] rolls back.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction and sets the tenant context with `SET LOCAL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the context
    /// cannot be set.
    pub async fn new(db: &DatabaseConnection, tenant_id: TenantId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        // TenantId renders as a UUID, so the literal cannot carry SQL.
        txn.execute_unprepared(&tenant_context_sql(tenant_id)).await?;
        Ok(Self { txn })
    }

    /// The underlying transaction.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to open tenant-scoped transactions.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Opens an RLS-scoped transaction for `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_tenant(&self, tenant_id: TenantId) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_tenant(&self, tenant_id: TenantId) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_tenant_context_sql() {
        let tenant = TenantId::from_uuid(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
        );
        assert_eq!(
            tenant_context_sql(tenant),
            "SET LOCAL app.current_tenant_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
