//! Point-in-time account balance calculation.
//!
//! `balance = opening_balance + Σ signed(completed activity up to the cutoff)`,
//! where the sign follows the account's normal balance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{DebitCreditTotals, NormalBalance};
use crate::chart::ChartAccount;

/// Derived balance of one account as of a cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account code.
    pub code: String,
    /// Normal side used for signing.
    pub normal_balance: NormalBalance,
    /// Opening balance carried in.
    pub opening_balance: Decimal,
    /// Completed debits and credits up to the cutoff.
    pub totals: DebitCreditTotals,
    /// Signed balance.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Combines an account's opening balance with its aggregated activity.
    #[must_use]
    pub fn derive(account: &ChartAccount, totals: DebitCreditTotals) -> Self {
        let balance = account.opening_balance + totals.net(account.normal_balance);
        Self {
            code: account.code.clone(),
            normal_balance: account.normal_balance,
            opening_balance: account.opening_balance,
            totals,
            balance,
        }
    }
}

/// Activity of one account over an interval, signed by its normal side.
#[must_use]
pub fn interval_activity(normal_balance: NormalBalance, totals: DebitCreditTotals) -> Decimal {
    totals.net(normal_balance)
}
