//! Semantic account roles and their per-tenant code mapping.

use std::collections::HashMap;
use std::fmt;

use folio_shared::DefaultAccountCodes;
use serde::{Deserialize, Serialize};

/// A semantic role a single chart account plays in statement assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Cash on hand.
    Cash,
    /// Main bank account.
    Bank,
    /// Trade receivables.
    Receivable,
    /// Trade payables.
    Payable,
    /// Merchandise inventory.
    Inventory,
}

impl AccountRole {
    /// Every role, in assembly order.
    pub const ALL: [Self; 5] = [
        Self::Cash,
        Self::Bank,
        Self::Receivable,
        Self::Payable,
        Self::Inventory,
    ];

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Receivable => "receivable",
            Self::Payable => "payable",
            Self::Inventory => "inventory",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
    }

    fn fallback_code(self, defaults: &DefaultAccountCodes) -> &str {
        match self {
            Self::Cash => &defaults.cash,
            Self::Bank => &defaults.bank,
            Self::Receivable => &defaults.receivable,
            Self::Payable => &defaults.payable,
            Self::Inventory => &defaults.inventory,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved role → account code map for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCodes {
    codes: HashMap<AccountRole, String>,
}

impl RoleCodes {
    /// Merges a tenant's explicit mapping over the configured defaults.
    ///
    /// Blank overrides are ignored.
    #[must_use]
    pub fn resolve(
        overrides: &HashMap<AccountRole, String>,
        defaults: &DefaultAccountCodes,
    ) -> Self {
        let codes = AccountRole::ALL
            .into_iter()
            .map(|role| {
                let code = overrides
                    .get(&role)
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| role.fallback_code(defaults));
                (role, code.to_string())
            })
            .collect();

        Self { codes }
    }

    /// Only the configured defaults.
    #[must_use]
    pub fn defaults(defaults: &DefaultAccountCodes) -> Self {
        Self::resolve(&HashMap::new(), defaults)
    }

    /// The code assigned to `role`.
    #[must_use]
    pub fn code(&self, role: AccountRole) -> &str {
        self.codes.get(&role).map_or("", String::as_str)
    }

    /// Returns true if `code` is bound to any role.
    #[must_use]
    pub fn is_role_code(&self, code: &str) -> bool {
        self.codes.values().any(|c| c == code)
    }
}
