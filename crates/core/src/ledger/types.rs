//! Ledger domain types consumed by balance aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chart::AccountType;

/// Side on which an account balance naturally increases.
///
/// - Debit-normal (assets, expenses): balance += debit - credit
/// - Credit-normal (liabilities, equity, revenue): balance += credit - debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Increases with debits.
    Debit,
    /// Increases with credits.
    Credit,
}

impl NormalBalance {
    /// The conventional normal side for an account type.
    #[must_use]
    pub fn for_account_type(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Asset | AccountType::Expense => Self::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => Self::Credit,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a normal balance from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Signed balance change for the given debit and credit amounts.
    #[must_use]
    pub fn signed_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

impl fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a ledger row. Only completed rows contribute to balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    /// Entered but not yet settled.
    Pending,
    /// Settled.
    Completed,
    /// Cancelled.
    Voided,
}

impl LedgerStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Voided => "voided",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }
}

/// Aggregate of one account's completed activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebitCreditTotals {
    /// Sum of debit amounts.
    pub debit: Decimal,
    /// Sum of credit amounts.
    pub credit: Decimal,
}

impl DebitCreditTotals {
    /// Creates totals from raw sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Signed net movement under `normal`.
    #[must_use]
    pub fn net(&self, normal: NormalBalance) -> Decimal {
        normal.signed_change(self.debit, self.credit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normal_balance_for_type() {
        assert_eq!(
            NormalBalance::for_account_type(AccountType::Asset),
            NormalBalance::Debit
        );
        assert_eq!(
            NormalBalance::for_account_type(AccountType::Expense),
            NormalBalance::Debit
        );
        assert_eq!(
            NormalBalance::for_account_type(AccountType::Revenue),
            NormalBalance::Credit
        );
        assert_eq!(
            NormalBalance::for_account_type(AccountType::Liability),
            NormalBalance::Credit
        );
    }

    #[test]
    fn test_signed_change() {
        assert_eq!(NormalBalance::Debit.signed_change(dec!(500), dec!(200)), dec!(300));
        assert_eq!(NormalBalance::Credit.signed_change(dec!(500), dec!(200)), dec!(-300));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(LedgerStatus::parse("COMPLETED"), Some(LedgerStatus::Completed));
        assert_eq!(LedgerStatus::parse("posted"), None);
        assert_eq!(NormalBalance::parse("Credit"), Some(NormalBalance::Credit));
    }
}
