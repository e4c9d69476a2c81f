//! Balance sheet sections.
//!
//! Every leaf is a decimal that defaults to zero. Totals are derived by
//! `recalculate`, which is idempotent and called after assembly and after any
//! draft edit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cash split by where it is held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashAndEquivalents {
    /// Cash on hand.
    pub cash_on_hand: Decimal,
    /// Bank balances.
    pub bank: Decimal,
    /// Petty cash floats.
    pub petty_cash: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

impl CashAndEquivalents {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.total = self.cash_on_hand + self.bank + self.petty_cash;
    }
}

/// Trade receivables net of the doubtful-accounts allowance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receivables {
    /// Gross receivables, never negative.
    pub gross: Decimal,
    /// Allowance for doubtful accounts, never negative.
    pub allowance_for_doubtful_accounts: Decimal,
    /// Gross less allowance, never negative.
    pub net: Decimal,
}

impl Receivables {
    /// Builds receivables from a raw ledger balance and an allowance rate.
    #[must_use]
    pub fn from_balance(balance: Decimal, rate: Decimal) -> Self {
        let gross = balance.max(Decimal::ZERO);
        let mut receivables = Self {
            gross,
            allowance_for_doubtful_accounts: (gross * rate).max(Decimal::ZERO),
            net: Decimal::ZERO,
        };
        receivables.recalculate();
        receivables
    }

    /// Recomputes the net amount.
    pub fn recalculate(&mut self) {
        self.gross = self.gross.max(Decimal::ZERO);
        self.allowance_for_doubtful_accounts = self.allowance_for_doubtful_accounts.max(Decimal::ZERO);
        self.net = (self.gross - self.allowance_for_doubtful_accounts).max(Decimal::ZERO);
    }
}

/// Inventory by production stage. Leaves are floored at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    /// Raw materials.
    pub raw_materials: Decimal,
    /// Work in progress.
    pub work_in_progress: Decimal,
    /// Finished goods.
    pub finished_goods: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

impl Inventory {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.raw_materials = self.raw_materials.max(Decimal::ZERO);
        self.work_in_progress = self.work_in_progress.max(Decimal::ZERO);
        self.finished_goods = self.finished_goods.max(Decimal::ZERO);
        self.total = self.raw_materials + self.work_in_progress + self.finished_goods;
    }
}

/// Assets expected to be realised within one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentAssets {
    /// Cash and cash equivalents.
    pub cash_and_equivalents: CashAndEquivalents,
    /// Accounts receivable.
    pub accounts_receivable: Receivables,
    /// Inventory.
    pub inventory: Inventory,
    /// Prepaid expenses.
    pub prepaid_expenses: Decimal,
    /// Sum of current assets.
    pub total: Decimal,
}

impl CurrentAssets {
    /// Recomputes nested and own totals.
    pub fn recalculate(&mut self) {
        self.cash_and_equivalents.recalculate();
        self.accounts_receivable.recalculate();
        self.inventory.recalculate();
        self.total = self.cash_and_equivalents.total
            + self.accounts_receivable.net
            + self.inventory.total
            + self.prepaid_expenses;
    }
}

/// Property, plant and equipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedAssets {
    /// Land.
    pub land: Decimal,
    /// Buildings.
    pub buildings: Decimal,
    /// Equipment (default bucket).
    pub equipment: Decimal,
    /// Vehicles.
    pub vehicles: Decimal,
    /// Furniture and fixtures.
    pub furniture: Decimal,
    /// Computer equipment.
    pub computer_equipment: Decimal,
    /// Sum of the classes above.
    pub gross: Decimal,
    /// Accumulated depreciation, as a positive amount.
    pub accumulated_depreciation: Decimal,
    /// Gross less accumulated depreciation.
    pub net: Decimal,
}

impl FixedAssets {
    /// Recomputes gross and net.
    pub fn recalculate(&mut self) {
        self.accumulated_depreciation = self.accumulated_depreciation.abs();
        self.gross = self.land
            + self.buildings
            + self.equipment
            + self.vehicles
            + self.furniture
            + self.computer_equipment;
        self.net = self.gross - self.accumulated_depreciation;
    }
}

/// Intangible assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntangibleAssets {
    /// Goodwill.
    pub goodwill: Decimal,
    /// Patents.
    pub patents: Decimal,
    /// Trademarks.
    pub trademarks: Decimal,
    /// Software (default bucket).
    pub software: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

impl IntangibleAssets {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.total = self.goodwill + self.patents + self.trademarks + self.software;
    }
}

/// Asset side of the balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assets {
    /// Current assets.
    pub current: CurrentAssets,
    /// Property, plant and equipment.
    pub fixed: FixedAssets,
    /// Intangible assets.
    pub intangibles: IntangibleAssets,
    /// Long-term investments.
    pub long_term_investments: Decimal,
    /// Other non-current assets.
    pub other_assets: Decimal,
    /// Total current assets.
    pub total_current_assets: Decimal,
    /// Net fixed assets plus intangibles, investments and other assets.
    pub total_fixed_assets: Decimal,
    /// Current plus fixed.
    pub total_assets: Decimal,
}

impl Assets {
    /// Recomputes every subtotal and total.
    pub fn recalculate(&mut self) {
        self.current.recalculate();
        self.fixed.recalculate();
        self.intangibles.recalculate();
        self.total_current_assets = self.current.total;
        self.total_fixed_assets = self.fixed.net
            + self.intangibles.total
            + self.long_term_investments
            + self.other_assets;
        self.total_assets = self.total_current_assets + self.total_fixed_assets;
    }
}

/// Accrued expenses by nature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccruedExpenses {
    /// Salaries and wages.
    pub salaries: Decimal,
    /// Utilities.
    pub utilities: Decimal,
    /// Rent.
    pub rent: Decimal,
    /// Taxes, including sales tax payable.
    pub taxes: Decimal,
    /// Interest.
    pub interest: Decimal,
    /// Other accruals (default bucket).
    pub other: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

impl AccruedExpenses {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.total =
            self.salaries + self.utilities + self.rent + self.taxes + self.interest + self.other;
    }
}

/// Borrowings due within one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortTermDebt {
    /// Credit lines and overdrafts.
    pub credit_lines: Decimal,
    /// Short-term loans (default bucket).
    pub short_term_loans: Decimal,
    /// Credit card balances.
    pub credit_card_debt: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

impl ShortTermDebt {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.total = self.credit_lines + self.short_term_loans + self.credit_card_debt;
    }
}

/// Obligations due within one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentLiabilities {
    /// Trade payables, never negative.
    pub accounts_payable: Decimal,
    /// Accrued expenses.
    pub accrued_expenses: AccruedExpenses,
    /// Short-term debt.
    pub short_term_debt: ShortTermDebt,
    /// Paid but undelivered sales orders.
    pub deferred_revenue: Decimal,
    /// Sum of current liabilities.
    pub total: Decimal,
}

impl CurrentLiabilities {
    /// Recomputes nested and own totals.
    pub fn recalculate(&mut self) {
        self.accounts_payable = self.accounts_payable.max(Decimal::ZERO);
        self.accrued_expenses.recalculate();
        self.short_term_debt.recalculate();
        self.total = self.accounts_payable
            + self.accrued_expenses.total
            + self.short_term_debt.total
            + self.deferred_revenue;
    }
}

/// Borrowings due after one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongTermDebt {
    /// Mortgages.
    pub mortgages: Decimal,
    /// Long-term loans (default bucket).
    pub long_term_loans: Decimal,
    /// Bonds and debentures.
    pub bonds: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

impl LongTermDebt {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.total = self.mortgages + self.long_term_loans + self.bonds;
    }
}

/// Obligations due after one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongTermLiabilities {
    /// Long-term debt.
    pub long_term_debt: LongTermDebt,
    /// Deferred tax liabilities.
    pub deferred_tax_liabilities: Decimal,
    /// Pension obligations.
    pub pension_liabilities: Decimal,
    /// Anything else in the long-term liabilities category.
    pub other_long_term_liabilities: Decimal,
    /// Sum of long-term liabilities.
    pub total: Decimal,
}

impl LongTermLiabilities {
    /// Recomputes nested and own totals.
    pub fn recalculate(&mut self) {
        self.long_term_debt.recalculate();
        self.total = self.long_term_debt.total
            + self.deferred_tax_liabilities
            + self.pension_liabilities
            + self.other_long_term_liabilities;
    }
}

/// Liability side of the balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Liabilities {
    /// Current liabilities.
    pub current: CurrentLiabilities,
    /// Long-term liabilities.
    pub long_term: LongTermLiabilities,
    /// Total current liabilities.
    pub total_current_liabilities: Decimal,
    /// Total long-term liabilities.
    pub total_long_term_liabilities: Decimal,
    /// Current plus long-term.
    pub total_liabilities: Decimal,
}

impl Liabilities {
    /// Recomputes every subtotal and total.
    pub fn recalculate(&mut self) {
        self.current.recalculate();
        self.long_term.recalculate();
        self.total_current_liabilities = self.current.total;
        self.total_long_term_liabilities = self.long_term.total;
        self.total_liabilities = self.total_current_liabilities + self.total_long_term_liabilities;
    }
}

/// Owner contributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributedCapital {
    /// Common stock (default bucket).
    pub common_stock: Decimal,
    /// Preferred stock.
    pub preferred_stock: Decimal,
    /// Additional paid-in capital.
    pub additional_paid_in_capital: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

impl ContributedCapital {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.total = self.common_stock + self.preferred_stock + self.additional_paid_in_capital;
    }
}

/// Where current-period earnings came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningsSource {
    /// A published income statement for the exact interval.
    Published,
    /// Recomputed from revenue and expense activity.
    Recomputed,
    /// Neither was available; earnings are zero.
    #[default]
    Unavailable,
}

/// Retained earnings roll-forward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetainedEarnings {
    /// Ending balance of the prior snapshot in the chain.
    pub beginning: Decimal,
    /// Net income for the period.
    pub current_period_earnings: Decimal,
    /// Dividends paid in the period.
    pub dividends_paid: Decimal,
    /// beginning + earnings - dividends.
    pub ending: Decimal,
    /// Provenance of `current_period_earnings`.
    pub earnings_source: EarningsSource,
}

impl RetainedEarnings {
    /// Recomputes the ending balance.
    pub fn recalculate(&mut self) {
        self.ending = self.beginning + self.current_period_earnings - self.dividends_paid;
    }
}

/// Treasury stock and other comprehensive income.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherEquity {
    /// Repurchased shares, as a positive amount.
    pub treasury_stock: Decimal,
    /// Accumulated other comprehensive income (default bucket).
    pub other_comprehensive_income: Decimal,
    /// OCI less treasury stock.
    pub total: Decimal,
}

impl OtherEquity {
    /// Recomputes the total.
    pub fn recalculate(&mut self) {
        self.treasury_stock = self.treasury_stock.abs();
        self.total = self.other_comprehensive_income - self.treasury_stock;
    }
}

/// Equity side of the balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equity {
    /// Contributed capital.
    pub contributed_capital: ContributedCapital,
    /// Retained earnings.
    pub retained_earnings: RetainedEarnings,
    /// Other equity.
    pub other_equity: OtherEquity,
    /// contributed + retained ending + other.
    pub total_equity: Decimal,
}

impl Equity {
    /// Recomputes every subtotal and total.
    pub fn recalculate(&mut self) {
        self.contributed_capital.recalculate();
        self.retained_earnings.recalculate();
        self.other_equity.recalculate();
        self.total_equity = self.contributed_capital.total
            + self.retained_earnings.ending
            + self.other_equity.total;
    }
}

/// Assets versus liabilities plus equity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCheck {
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities plus total equity.
    pub liabilities_and_equity: Decimal,
    /// total_assets - liabilities_and_equity.
    pub difference: Decimal,
    /// |difference| within tolerance.
    pub is_balanced: bool,
}

impl BalanceCheck {
    /// Evaluates the accounting identity.
    #[must_use]
    pub fn evaluate(
        assets: &Assets,
        liabilities: &Liabilities,
        equity: &Equity,
        tolerance: Decimal,
    ) -> Self {
        let liabilities_and_equity = liabilities.total_liabilities + equity.total_equity;
        let difference = assets.total_assets - liabilities_and_equity;
        Self {
            total_assets: assets.total_assets,
            liabilities_and_equity,
            difference,
            is_balanced: difference.abs() <= tolerance,
        }
    }
}
