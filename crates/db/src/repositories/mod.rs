//! PostgreSQL implementation of the engine's store traits.
//!
//! Every operation runs in its own RLS-scoped transaction and additionally
//! filters on `tenant_id`, so a missing policy never leaks rows.
//!
//! - `chart` - chart of accounts and role mappings
//! - `ledger` - balance sums, dividends, deferred revenue, published income
//! - `snapshot` - statement snapshots and their audit trail

mod chart;
mod convert;
mod ledger;
mod snapshot;

use folio_core::StoreResult;
use folio_shared::types::TenantId;
use sea_orm::DatabaseConnection;

use crate::rls::RlsConnection;
use convert::unavailable;

/// Store backed by a `SeaORM` connection pool.
///
/// Implements every store trait, so it satisfies
/// [`folio_core::StatementRepository`] on its own.
#[derive(Debug, Clone)]
pub struct PgRepository {
    db: DatabaseConnection,
}

impl PgRepository {
    /// Creates a repository over an existing connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn scoped(&self, tenant_id: TenantId) -> StoreResult<RlsConnection> {
        RlsConnection::new(&self.db, tenant_id)
            .await
            .map_err(unavailable)
    }
}
