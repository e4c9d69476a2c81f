//! Chart-of-accounts domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::NormalBalance;

/// Well-known `category` values the assembler queries by.
pub mod categories {
    /// Cash, receivables, inventory, prepaid items.
    pub const CURRENT_ASSETS: &str = "current_assets";
    /// Property, plant and equipment.
    pub const FIXED_ASSETS: &str = "fixed_assets";
    /// Goodwill, patents, trademarks, software.
    pub const INTANGIBLE_ASSETS: &str = "intangible_assets";
    /// Investments held for more than one year.
    pub const LONG_TERM_INVESTMENTS: &str = "long_term_investments";
    /// Anything else on the asset side.
    pub const OTHER_ASSETS: &str = "other_assets";
    /// Accrued liabilities.
    pub const ACCRUED_EXPENSES: &str = "accrued_expenses";
    /// Obligations due within one year.
    pub const CURRENT_LIABILITIES: &str = "current_liabilities";
    /// Obligations due after one year.
    pub const LONG_TERM_LIABILITIES: &str = "long_term_liabilities";
    /// Direct cost of revenue.
    pub const COST_OF_GOODS_SOLD: &str = "cost_of_goods_sold";
    /// Non-operating expenses.
    pub const OTHER_EXPENSES: &str = "other_expenses";
}

/// Top-level account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Returns the string representation of the account type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses an account type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a tenant's chart of accounts.
///
/// Balances are never stored here; they are derived from the ledger as of a
/// cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartAccount {
    /// Account code, unique per tenant.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Top-level type.
    pub account_type: AccountType,
    /// Free-form sub-classification (e.g. `current_assets`).
    pub category: Option<String>,
    /// Side on which the balance naturally increases.
    pub normal_balance: NormalBalance,
    /// Balance carried in before the first ledger transaction.
    pub opening_balance: Decimal,
    /// Whether the account is in use.
    pub is_active: bool,
    /// True for leaf accounts that carry balances.
    pub allow_direct_posting: bool,
    /// True for parent/rollup accounts.
    pub is_system_account: bool,
}

impl ChartAccount {
    /// Returns true if balance aggregation may read this account.
    #[must_use]
    pub fn is_aggregatable(&self) -> bool {
        self.is_active && !self.is_system_account
    }

    /// Returns true if the account's category equals `category` (case-insensitive).
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Case-insensitive "name contains any of" rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamePattern {
    any_of: Vec<String>,
}

impl NamePattern {
    /// Builds a pattern from keywords; matching is case-insensitive.
    #[must_use]
    pub fn any_of<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            any_of: keywords
                .iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Keywords, lowercased.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.any_of
    }

    /// Returns true if `name` contains at least one keyword.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.any_of.iter().any(|k| name.contains(k.as_str()))
    }
}

/// Classification-by-pattern query against the chart store.
///
/// Stores must only return active, non-system, direct-posting accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFilter {
    /// Required account type.
    pub account_type: AccountType,
    /// Optional category restriction.
    pub category: Option<String>,
    /// Optional name rule.
    pub name_pattern: Option<NamePattern>,
}

impl AccountFilter {
    /// All accounts of the given type.
    #[must_use]
    pub fn of_type(account_type: AccountType) -> Self {
        Self {
            account_type,
            category: None,
            name_pattern: None,
        }
    }

    /// Restricts the filter to one category.
    #[must_use]
    pub fn in_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Restricts the filter to names matching `pattern`.
    #[must_use]
    pub fn named(mut self, pattern: NamePattern) -> Self {
        self.name_pattern = Some(pattern);
        self
    }

    /// Evaluates the filter in memory, including the posting-account guard.
    #[must_use]
    pub fn matches(&self, account: &ChartAccount) -> bool {
        account.is_aggregatable()
            && account.allow_direct_posting
            && account.account_type == self.account_type
            && self
                .category
                .as_deref()
                .is_none_or(|c| account.in_category(c))
            && self
                .name_pattern
                .as_ref()
                .is_none_or(|p| p.matches(&account.name))
    }
}
