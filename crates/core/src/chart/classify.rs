//! Data-driven account classification.
//!
//! Each table is an ordered list of `(matcher, bucket)` rules evaluated top to
//! bottom; the first match wins and unmatched accounts fall into the table's
//! fallback bucket. All tables deserialize, so a deployment can replace them.

use serde::{Deserialize, Serialize};

use super::types::{ChartAccount, NamePattern};

/// Predicate over a chart account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matcher {
    /// Name contains any keyword (case-insensitive).
    NameContains {
        /// Keywords.
        any: Vec<String>,
    },
    /// Name contains any keyword as a whole word (case-insensitive).
    NameWord {
        /// Single-word keywords.
        any: Vec<String>,
    },
    /// Code within `[from, to]`. Numeric when all three parse, lexical otherwise.
    CodeRange {
        /// Inclusive lower bound.
        from: String,
        /// Inclusive upper bound.
        to: String,
    },
    /// Category equals (case-insensitive).
    Category {
        /// Category name.
        name: String,
    },
}

impl Matcher {
    /// Shorthand for [`Matcher::NameContains`].
    #[must_use]
    pub fn name_contains(keywords: &[&str]) -> Self {
        Self::NameContains {
            any: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Shorthand for [`Matcher::NameWord`].
    #[must_use]
    pub fn name_word(keywords: &[&str]) -> Self {
        Self::NameWord {
            any: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Shorthand for [`Matcher::CodeRange`].
    #[must_use]
    pub fn code_range(from: &str, to: &str) -> Self {
        Self::CodeRange {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn matches(&self, account: &ChartAccount) -> bool {
        match self {
            Self::NameContains { any } => NamePattern::any_of(any).matches(&account.name),
            Self::NameWord { any } => has_word(&account.name, any),
            Self::CodeRange { from, to } => code_in_range(&account.code, from, to),
            Self::Category { name } => account.in_category(name),
        }
    }
}

fn has_word(name: &str, keywords: &[String]) -> bool {
    name.split(|c: char| !c.is_alphanumeric())
        .any(|word| keywords.iter().any(|k| word.eq_ignore_ascii_case(k)))
}

fn code_in_range(code: &str, from: &str, to: &str) -> bool {
    match (code.parse::<u64>(), from.parse::<u64>(), to.parse::<u64>()) {
        (Ok(code), Ok(from), Ok(to)) => (from..=to).contains(&code),
        _ => from <= code && code <= to,
    }
}

/// One `(predicate, bucket)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule<T> {
    /// Predicate.
    pub when: Matcher,
    /// Bucket assigned on match.
    pub then: T,
}

/// Ordered rule list with a fallback bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTable<T> {
    /// Rules, evaluated in order.
    pub rules: Vec<ClassificationRule<T>>,
    /// Bucket for accounts no rule matches.
    pub fallback: T,
}

impl<T: Copy> ClassificationTable<T> {
    fn new(rules: Vec<(Matcher, T)>, fallback: T) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(when, then)| ClassificationRule { when, then })
                .collect(),
            fallback,
        }
    }

    /// Bucket for `account`.
    #[must_use]
    pub fn classify(&self, account: &ChartAccount) -> T {
        self.rules
            .iter()
            .find(|rule| rule.when.matches(account))
            .map_or(self.fallback, |rule| rule.then)
    }
}

/// Sub-classification of discovered cash accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashClass {
    /// Till or safe cash.
    CashOnHand,
    /// Petty cash floats.
    PettyCash,
    /// Bank balances.
    Bank,
}

/// Inventory stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryClass {
    /// Unprocessed inputs.
    RawMaterials,
    /// Partially completed goods.
    WorkInProgress,
    /// Goods ready for sale.
    FinishedGoods,
}

/// Property, plant and equipment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedAssetClass {
    /// Land.
    Land,
    /// Buildings.
    Buildings,
    /// Machinery and general equipment.
    Equipment,
    /// Vehicles.
    Vehicles,
    /// Furniture and fixtures.
    Furniture,
    /// Computer hardware.
    ComputerEquipment,
}

/// Intangible asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntangibleClass {
    /// Goodwill.
    Goodwill,
    /// Patents.
    Patents,
    /// Trademarks.
    Trademarks,
    /// Software.
    Software,
}

/// Accrued expense class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccruedClass {
    /// Salaries and wages.
    Salaries,
    /// Utilities.
    Utilities,
    /// Rent.
    Rent,
    /// Taxes.
    Taxes,
    /// Interest.
    Interest,
    /// Anything else.
    Other,
}

/// Short-term debt class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortTermDebtClass {
    /// Revolving credit lines and overdrafts.
    CreditLines,
    /// Short-term loans.
    ShortTermLoans,
    /// Credit card balances.
    CreditCardDebt,
}

/// Long-term debt class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongTermDebtClass {
    /// Mortgages.
    Mortgages,
    /// Term loans.
    LongTermLoans,
    /// Bonds and debentures.
    Bonds,
}

/// Top-level grouping of equity accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityGroup {
    /// Owner contributions.
    Contributed,
    /// Retained earnings accounts (carried through the period chain instead).
    RetainedEarnings,
    /// Dividend / drawing accounts.
    Dividends,
    /// Treasury stock and comprehensive income.
    Other,
}

/// Contributed capital class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributedClass {
    /// Common stock.
    CommonStock,
    /// Preferred stock.
    PreferredStock,
    /// Additional paid-in capital.
    AdditionalPaidInCapital,
}

/// Other equity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherEquityClass {
    /// Repurchased shares (contra equity).
    TreasuryStock,
    /// Other comprehensive income.
    OtherComprehensiveIncome,
}

/// Keyword lists used to discover specialised accounts by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryPatterns {
    /// Extra cash accounts beyond the cash/bank roles.
    pub cash_equivalents: Vec<String>,
    /// Inventory stage accounts.
    pub inventory_components: Vec<String>,
    /// Prepaid expenses.
    pub prepaid_expenses: Vec<String>,
    /// Contra-asset depreciation accounts.
    pub accumulated_depreciation: Vec<String>,
    /// Sales tax payable, merged into accrued taxes.
    pub sales_tax_payable: Vec<String>,
    /// Short-term borrowings.
    pub short_term_debt: Vec<String>,
    /// Long-term borrowings.
    pub long_term_debt: Vec<String>,
    /// Deferred tax liabilities.
    pub deferred_tax: Vec<String>,
    /// Pension obligations.
    pub pension: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

impl Default for DiscoveryPatterns {
    fn default() -> Self {
        Self {
            cash_equivalents: words(&["petty cash", "cash on hand", "cash in hand"]),
            inventory_components: words(&[
                "raw material",
                "work in progress",
                "work-in-progress",
                "wip",
                "finished goods",
            ]),
            prepaid_expenses: words(&["prepaid", "prepayment"]),
            accumulated_depreciation: words(&["accumulated depreciation", "accumulated amortization"]),
            sales_tax_payable: words(&["sales tax", "vat payable", "gst payable"]),
            short_term_debt: words(&[
                "credit line",
                "line of credit",
                "short-term loan",
                "short term loan",
                "credit card",
                "overdraft",
            ]),
            long_term_debt: words(&[
                "mortgage",
                "long-term loan",
                "long term loan",
                "bond",
                "debenture",
                "note payable",
            ]),
            deferred_tax: words(&["deferred tax"]),
            pension: words(&["pension", "retirement benefit"]),
        }
    }
}

/// Every classification table the assembler uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classifications {
    /// Name-based discovery keywords.
    pub discovery: DiscoveryPatterns,
    /// Discovered cash accounts.
    pub cash: ClassificationTable<CashClass>,
    /// Inventory stage accounts.
    pub inventory: ClassificationTable<InventoryClass>,
    /// Fixed assets.
    pub fixed_assets: ClassificationTable<FixedAssetClass>,
    /// Intangible assets.
    pub intangibles: ClassificationTable<IntangibleClass>,
    /// Accrued expenses.
    pub accrued_expenses: ClassificationTable<AccruedClass>,
    /// Short-term debt.
    pub short_term_debt: ClassificationTable<ShortTermDebtClass>,
    /// Long-term debt.
    pub long_term_debt: ClassificationTable<LongTermDebtClass>,
    /// Equity grouping.
    pub equity_groups: ClassificationTable<EquityGroup>,
    /// Contributed capital.
    pub contributed_capital: ClassificationTable<ContributedClass>,
    /// Other equity.
    pub other_equity: ClassificationTable<OtherEquityClass>,
}

impl Default for Classifications {
    fn default() -> Self {
        Self {
            discovery: DiscoveryPatterns::default(),
            cash: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["petty"]), CashClass::PettyCash),
                    (Matcher::name_contains(&["bank", "checking", "savings"]), CashClass::Bank),
                ],
                CashClass::CashOnHand,
            ),
            inventory: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["raw material"]), InventoryClass::RawMaterials),
                    (
                        Matcher::name_contains(&["work in progress", "work-in-progress", "wip"]),
                        InventoryClass::WorkInProgress,
                    ),
                ],
                InventoryClass::FinishedGoods,
            ),
            fixed_assets: ClassificationTable::new(
                vec![
                    (Matcher::name_word(&["land"]), FixedAssetClass::Land),
                    (Matcher::name_contains(&["building", "premises"]), FixedAssetClass::Buildings),
                    (Matcher::name_contains(&["vehicle", "truck", "automobile"]), FixedAssetClass::Vehicles),
                    (Matcher::name_contains(&["furniture", "fixture"]), FixedAssetClass::Furniture),
                    (
                        Matcher::name_contains(&["computer", "hardware", "server"]),
                        FixedAssetClass::ComputerEquipment,
                    ),
                ],
                FixedAssetClass::Equipment,
            ),
            intangibles: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["goodwill"]), IntangibleClass::Goodwill),
                    (Matcher::name_contains(&["patent"]), IntangibleClass::Patents),
                    (Matcher::name_contains(&["trademark", "brand"]), IntangibleClass::Trademarks),
                ],
                IntangibleClass::Software,
            ),
            accrued_expenses: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["tax"]), AccruedClass::Taxes),
                    (Matcher::name_contains(&["salar", "wage", "payroll"]), AccruedClass::Salaries),
                    (Matcher::name_contains(&["interest"]), AccruedClass::Interest),
                    (
                        Matcher::name_contains(&["utilit", "electric", "water"]),
                        AccruedClass::Utilities,
                    ),
                    (Matcher::name_word(&["gas"]), AccruedClass::Utilities),
                    (
                        Matcher::name_contains(&["accrued rent", "rent payable", "lease"]),
                        AccruedClass::Rent,
                    ),
                ],
                AccruedClass::Other,
            ),
            short_term_debt: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["credit card"]), ShortTermDebtClass::CreditCardDebt),
                    (
                        Matcher::name_contains(&["credit line", "line of credit", "overdraft"]),
                        ShortTermDebtClass::CreditLines,
                    ),
                ],
                ShortTermDebtClass::ShortTermLoans,
            ),
            long_term_debt: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["mortgage"]), LongTermDebtClass::Mortgages),
                    (Matcher::name_contains(&["bond", "debenture"]), LongTermDebtClass::Bonds),
                ],
                LongTermDebtClass::LongTermLoans,
            ),
            equity_groups: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["retained earnings"]), EquityGroup::RetainedEarnings),
                    (
                        Matcher::name_contains(&["dividend", "distribution", "drawing"]),
                        EquityGroup::Dividends,
                    ),
                    (
                        Matcher::name_contains(&["treasury", "comprehensive income", "revaluation"]),
                        EquityGroup::Other,
                    ),
                ],
                EquityGroup::Contributed,
            ),
            contributed_capital: ClassificationTable::new(
                vec![
                    (Matcher::name_contains(&["preferred"]), ContributedClass::PreferredStock),
                    (
                        Matcher::name_contains(&["paid-in", "paid in", "share premium"]),
                        ContributedClass::AdditionalPaidInCapital,
                    ),
                    (Matcher::code_range("3100", "3199"), ContributedClass::PreferredStock),
                    (
                        Matcher::code_range("3200", "3299"),
                        ContributedClass::AdditionalPaidInCapital,
                    ),
                ],
                ContributedClass::CommonStock,
            ),
            other_equity: ClassificationTable::new(
                vec![(Matcher::name_contains(&["treasury"]), OtherEquityClass::TreasuryStock)],
                OtherEquityClass::OtherComprehensiveIncome,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::AccountType;
    use crate::ledger::NormalBalance;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn account(code: &str, name: &str) -> ChartAccount {
        ChartAccount {
            code: code.to_string(),
            name: name.to_string(),
            account_type: AccountType::Asset,
            category: None,
            normal_balance: NormalBalance::Debit,
            opening_balance: Decimal::ZERO,
            is_active: true,
            allow_direct_posting: true,
            is_system_account: false,
        }
    }

    #[rstest]
    #[case("Land - Warehouse Site", FixedAssetClass::Land)]
    #[case("Office Building", FixedAssetClass::Buildings)]
    #[case("Delivery Trucks", FixedAssetClass::Vehicles)]
    #[case("Office Furniture", FixedAssetClass::Furniture)]
    #[case("Computer Equipment", FixedAssetClass::ComputerEquipment)]
    #[case("Packaging Machine", FixedAssetClass::Equipment)]
    #[case("Landscaping Equipment", FixedAssetClass::Equipment)]
    #[case("Island Kiosk", FixedAssetClass::Equipment)]
    #[case("Freehold LAND", FixedAssetClass::Land)]
    fn test_fixed_asset_classification(#[case] name: &str, #[case] expected: FixedAssetClass) {
        let tables = Classifications::default();
        assert_eq!(tables.fixed_assets.classify(&account("1500", name)), expected);
    }

    #[rstest]
    #[case("Accrued Payroll", AccruedClass::Salaries)]
    #[case("Wages Payable", AccruedClass::Salaries)]
    #[case("Accrued Income Tax", AccruedClass::Taxes)]
    #[case("Accrued Interest", AccruedClass::Interest)]
    #[case("Accrued Electricity", AccruedClass::Utilities)]
    #[case("Accrued Rent", AccruedClass::Rent)]
    #[case("Accrued Current Obligations", AccruedClass::Other)]
    #[case("Accrued Gas", AccruedClass::Utilities)]
    #[case("Las Vegas Office Accrual", AccruedClass::Other)]
    fn test_accrued_classification(#[case] name: &str, #[case] expected: AccruedClass) {
        let tables = Classifications::default();
        assert_eq!(tables.accrued_expenses.classify(&account("2100", name)), expected);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let tables = Classifications::default();
        // Name rule beats the code range.
        assert_eq!(
            tables.contributed_capital.classify(&account("3250", "Preferred Shares")),
            ContributedClass::PreferredStock
        );
        assert_eq!(
            tables.contributed_capital.classify(&account("3250", "Capital Reserve")),
            ContributedClass::AdditionalPaidInCapital
        );
        assert_eq!(
            tables.contributed_capital.classify(&account("3000", "Share Capital")),
            ContributedClass::CommonStock
        );
    }

    #[test]
    fn test_code_range_numeric_and_lexical() {
        assert!(code_in_range("3150", "3100", "3199"));
        assert!(!code_in_range("31000", "3100", "3199"));
        assert!(code_in_range("EQ-20", "EQ-10", "EQ-30"));
    }

    #[test]
    fn test_equity_grouping() {
        let tables = Classifications::default();
        assert_eq!(
            tables.equity_groups.classify(&account("3900", "Retained Earnings")),
            EquityGroup::RetainedEarnings
        );
        assert_eq!(
            tables.equity_groups.classify(&account("3950", "Dividends Declared")),
            EquityGroup::Dividends
        );
        assert_eq!(
            tables.equity_groups.classify(&account("3800", "Treasury Stock")),
            EquityGroup::Other
        );
        assert_eq!(
            tables.equity_groups.classify(&account("3000", "Common Stock")),
            EquityGroup::Contributed
        );
    }

    #[test]
    fn test_tables_deserialize_from_config() {
        let json = r#"{
            "rules": [{ "when": { "kind": "name_contains", "any": ["kiosk"] }, "then": "petty_cash" }],
            "fallback": "cash_on_hand"
        }"#;
        let table: ClassificationTable<CashClass> = serde_json::from_str(json).unwrap();
        assert_eq!(table.classify(&account("1010", "Kiosk Float")), CashClass::PettyCash);
        assert_eq!(table.classify(&account("1011", "Vault")), CashClass::CashOnHand);
    }
}
