//! Chart of accounts queries.

use std::collections::HashMap;

use folio_core::chart::{AccountFilter, AccountRole, ChartAccount};
use folio_core::store::ChartStore;
use folio_core::StoreResult;
use folio_shared::types::TenantId;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};

use super::PgRepository;
use super::convert::{account_type_to_db, chart_account_from_model, unavailable};
use crate::entities::{account_role_mappings, chart_of_accounts};

/// Escapes LIKE wildcards so keywords match literally.
fn like_contains(keyword: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn lowered(column: chart_of_accounts::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

/// Active, non-system accounts of one tenant.
fn usable_accounts(tenant_id: TenantId) -> Select<chart_of_accounts::Entity> {
    chart_of_accounts::Entity::find()
        .filter(chart_of_accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(chart_of_accounts::Column::IsActive.eq(true))
        .filter(chart_of_accounts::Column::IsSystemAccount.eq(false))
}

impl ChartStore for PgRepository {
    async fn find_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> StoreResult<Option<ChartAccount>> {
        let rls = self.scoped(tenant_id).await?;

        let model = usable_accounts(tenant_id)
            .filter(chart_of_accounts::Column::Code.eq(code))
            .one(rls.transaction())
            .await
            .map_err(unavailable)?;

        rls.commit().await.map_err(unavailable)?;
        Ok(model.map(chart_account_from_model))
    }

    async fn find_by_pattern(
        &self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> StoreResult<Vec<ChartAccount>> {
        let mut query = usable_accounts(tenant_id)
            .filter(chart_of_accounts::Column::AllowDirectPosting.eq(true))
            .filter(
                chart_of_accounts::Column::AccountType.eq(account_type_to_db(filter.account_type)),
            );

        if let Some(category) = &filter.category {
            query = query.filter(
                lowered(chart_of_accounts::Column::Category).eq(category.to_lowercase()),
            );
        }

        if let Some(pattern) = &filter.name_pattern {
            let any_keyword = pattern
                .keywords()
                .iter()
                .fold(Condition::any(), |cond, keyword| {
                    cond.add(lowered(chart_of_accounts::Column::Name).like(like_contains(keyword)))
                });
            query = query.filter(any_keyword);
        }

        let rls = self.scoped(tenant_id).await?;
        let models = query
            .order_by_asc(chart_of_accounts::Column::Code)
            .all(rls.transaction())
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;

        Ok(models
            .into_iter()
            .map(chart_account_from_model)
            .filter(|account| filter.matches(account))
            .collect())
    }

    async fn find_role_codes(
        &self,
        tenant_id: TenantId,
    ) -> StoreResult<HashMap<AccountRole, String>> {
        let rls = self.scoped(tenant_id).await?;
        let mappings = account_role_mappings::Entity::find()
            .filter(account_role_mappings::Column::TenantId.eq(tenant_id.into_inner()))
            .all(rls.transaction())
            .await
            .map_err(unavailable)?;
        rls.commit().await.map_err(unavailable)?;

        let mut codes = HashMap::with_capacity(mappings.len());
        for mapping in mappings {
            match AccountRole::parse(&mapping.role) {
                Some(role) => {
                    codes.insert(role, mapping.account_code);
                }
                None => tracing::debug!(role = %mapping.role, "ignoring unknown account role"),
            }
        }
        Ok(codes)
    }
}
