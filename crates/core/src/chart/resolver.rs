//! Store-backed chart lookups.
//!
//! Absence and store failures degrade to "no account". Failures and missing
//! role accounts additionally land in the generation's [`WarningLog`].

use folio_shared::DefaultAccountCodes;
use folio_shared::types::TenantId;
use tokio::sync::OnceCell;

use super::roles::{AccountRole, RoleCodes};
use super::types::{AccountFilter, ChartAccount};
use crate::diagnostics::WarningLog;
use crate::store::{ChartStore, StoreResult};

const COMPONENT: &str = "chart_resolver";

/// Resolves roles and patterns to chart entries for one tenant.
///
/// Lives for a single request. The role → code map is fetched at most once
/// and never outlives the resolver.
pub struct ChartResolver<'a, S> {
    store: &'a S,
    tenant_id: TenantId,
    defaults: &'a DefaultAccountCodes,
    warnings: &'a WarningLog,
    role_codes: OnceCell<RoleCodes>,
}

impl<'a, S: ChartStore> ChartResolver<'a, S> {
    /// Creates a resolver scoped to `tenant_id`.
    #[must_use]
    pub fn new(
        store: &'a S,
        tenant_id: TenantId,
        defaults: &'a DefaultAccountCodes,
        warnings: &'a WarningLog,
    ) -> Self {
        Self {
            store,
            tenant_id,
            defaults,
            warnings,
            role_codes: OnceCell::new(),
        }
    }

    /// The tenant's role → code map, merged over configured defaults.
    pub async fn role_codes(&self) -> &RoleCodes {
        self.role_codes
            .get_or_init(|| async {
                match self.store.find_role_codes(self.tenant_id).await {
                    Ok(overrides) => RoleCodes::resolve(&overrides, self.defaults),
                    Err(err) => {
                        self.warnings.record(
                            COMPONENT,
                            None,
                            format!("role mapping unavailable, using defaults: {err}"),
                        );
                        RoleCodes::defaults(self.defaults)
                    }
                }
            })
            .await
    }

    /// Chart entry bound to `role`.
    ///
    /// A missing role account is a degradation: the line it feeds reads zero.
    pub async fn resolve_role(&self, role: AccountRole) -> Option<ChartAccount> {
        let code = self.role_codes().await.code(role).to_string();
        match self.find(&code).await {
            Ok(Some(account)) => Some(account),
            Ok(None) => {
                self.warnings.record(
                    COMPONENT,
                    Some(code.as_str()),
                    format!("{role} role account not found"),
                );
                None
            }
            Err(err) => {
                self.warnings.record(COMPONENT, Some(code.as_str()), err);
                None
            }
        }
    }

    /// Chart entry with `code`, if active and not a system account.
    pub async fn resolve_code(&self, code: &str) -> Option<ChartAccount> {
        match self.find(code).await {
            Ok(account) => {
                if account.is_none() {
                    tracing::debug!(tenant_id = %self.tenant_id, account_code = code, "account not found");
                }
                account
            }
            Err(err) => {
                self.warnings.record(COMPONENT, Some(code), err);
                None
            }
        }
    }

    async fn find(&self, code: &str) -> StoreResult<Option<ChartAccount>> {
        let account = self.store.find_by_code(self.tenant_id, code).await?;
        Ok(account.filter(ChartAccount::is_aggregatable))
    }

    /// Every account matching `filter`; empty when the lookup failed.
    pub async fn resolve_pattern(&self, filter: &AccountFilter) -> Vec<ChartAccount> {
        self.try_resolve_pattern(filter).await.unwrap_or_default()
    }

    /// Every account matching `filter`, or `None` when the lookup failed.
    pub async fn try_resolve_pattern(&self, filter: &AccountFilter) -> Option<Vec<ChartAccount>> {
        match self.store.find_by_pattern(self.tenant_id, filter).await {
            Ok(accounts) => Some(accounts.into_iter().filter(|a| filter.matches(a)).collect()),
            Err(err) => {
                self.warnings.record(
                    COMPONENT,
                    None,
                    format!("{} lookup failed: {err}", filter.account_type),
                );
                None
            }
        }
    }

    /// Like [`Self::resolve_pattern`], minus accounts bound to a role.
    pub async fn discover(&self, filter: &AccountFilter) -> Vec<ChartAccount> {
        let accounts = self.resolve_pattern(filter).await;
        let roles = self.role_codes().await;
        accounts
            .into_iter()
            .filter(|a| !roles.is_role_code(&a.code))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AccountType, NamePattern};
    use crate::statement::test_support::{MemoryStore, fixtures};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_resolve_role_uses_default_code() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant();
        store.add_account(tenant, fixtures::asset("1001", "Cash", dec!(1000)));

        let defaults = DefaultAccountCodes::default();
        let warnings = WarningLog::new();
        let resolver = ChartResolver::new(&store, tenant, &defaults, &warnings);

        let cash = resolver.resolve_role(AccountRole::Cash).await.unwrap();
        assert_eq!(cash.code, "1001");
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_role_account_is_recorded() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant();
        store.add_account(tenant, fixtures::asset("1001", "Cash", dec!(1000)));

        let defaults = DefaultAccountCodes::default();
        let warnings = WarningLog::new();
        let resolver = ChartResolver::new(&store, tenant, &defaults, &warnings);

        assert!(resolver.resolve_role(AccountRole::Bank).await.is_none());
        // Direct code lookups stay quiet.
        assert!(resolver.resolve_code("9999").await.is_none());

        let entries = warnings.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].component, "chart_resolver");
        assert_eq!(entries[0].account_code.as_deref(), Some("1002"));
        assert_eq!(entries[0].reason, "bank role account not found");
    }

    #[tokio::test]
    async fn test_tenant_override_wins() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant();
        store.add_account(tenant, fixtures::asset("1010", "Main Till", dec!(10)));
        store.set_role_code(tenant, AccountRole::Cash, "1010");

        let defaults = DefaultAccountCodes::default();
        let warnings = WarningLog::new();
        let resolver = ChartResolver::new(&store, tenant, &defaults, &warnings);

        assert_eq!(resolver.role_codes().await.code(AccountRole::Cash), "1010");
        assert_eq!(resolver.role_codes().await.code(AccountRole::Bank), "1002");
    }

    #[tokio::test]
    async fn test_role_code_failure_falls_back_with_warning() {
        let store = MemoryStore::new();
        store.fail_role_codes();
        let tenant = fixtures::tenant();

        let defaults = DefaultAccountCodes::default();
        let warnings = WarningLog::new();
        let resolver = ChartResolver::new(&store, tenant, &defaults, &warnings);

        assert_eq!(resolver.role_codes().await.code(AccountRole::Payable), "2001");
        // Cached: the second call does not hit the failing store again.
        assert_eq!(resolver.role_codes().await.code(AccountRole::Cash), "1001");
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_discover_excludes_role_accounts_and_other_tenants() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant();
        let other = fixtures::tenant();
        store.add_account(tenant, fixtures::asset("1001", "Cash on Hand", dec!(0)));
        store.add_account(tenant, fixtures::asset("1005", "Petty Cash", dec!(0)));
        store.add_account(other, fixtures::asset("1006", "Petty Cash", dec!(0)));

        let defaults = DefaultAccountCodes::default();
        let warnings = WarningLog::new();
        let resolver = ChartResolver::new(&store, tenant, &defaults, &warnings);
        let filter = AccountFilter::of_type(AccountType::Asset)
            .named(NamePattern::any_of(&["petty cash", "cash on hand"]));

        let found = resolver.discover(&filter).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "1005");
    }

    #[tokio::test]
    async fn test_pattern_failure_degrades_to_empty() {
        let store = MemoryStore::new();
        store.fail_chart_patterns();
        let tenant = fixtures::tenant();

        let defaults = DefaultAccountCodes::default();
        let warnings = WarningLog::new();
        let resolver = ChartResolver::new(&store, tenant, &defaults, &warnings);

        let filter = AccountFilter::of_type(AccountType::Liability);
        assert!(resolver.resolve_pattern(&filter).await.is_empty());
        assert!(resolver.try_resolve_pattern(&filter).await.is_none());
        assert_eq!(warnings.len(), 2);
    }
}
