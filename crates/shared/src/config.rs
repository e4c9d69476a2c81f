//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Statement generation settings.
    #[serde(default)]
    pub statements: StatementSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Knobs for the statement aggregation engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatementSettings {
    /// Allowance for doubtful accounts as a fraction of gross receivables.
    pub doubtful_accounts_rate: Decimal,
    /// Maximum |assets - (liabilities + equity)| still treated as balanced.
    pub balance_tolerance: Decimal,
    /// Reject generation when the accounting identity does not hold.
    pub require_balanced: bool,
    /// Half-width in days of the window used to find the year-ago baseline.
    pub comparison_window_days: i64,
    /// Statement numbering.
    pub numbering: NumberingSettings,
    /// Fallback account codes per semantic role.
    pub default_account_codes: DefaultAccountCodes,
}

impl Default for StatementSettings {
    fn default() -> Self {
        Self {
            doubtful_accounts_rate: Decimal::new(3, 2),
            balance_tolerance: Decimal::new(1, 2),
            require_balanced: false,
            comparison_window_days: 1,
            numbering: NumberingSettings::default(),
            default_account_codes: DefaultAccountCodes::default(),
        }
    }
}

/// Statement number format and allocation limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NumberingSettings {
    /// Leading prefix of every statement number (e.g. "BS").
    pub prefix: String,
    /// Zero-padded width of the sequence suffix.
    pub sequence_width: usize,
    /// Upper bound on probes and insert retries before giving up.
    pub max_attempts: u32,
}

impl Default for NumberingSettings {
    fn default() -> Self {
        Self {
            prefix: "BS".to_string(),
            sequence_width: 4,
            max_attempts: 10,
        }
    }
}

/// Account codes used when a tenant has no explicit role mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultAccountCodes {
    /// Cash on hand.
    pub cash: String,
    /// Main bank account.
    pub bank: String,
    /// Trade receivables.
    pub receivable: String,
    /// Merchandise inventory.
    pub inventory: String,
    /// Trade payables.
    pub payable: String,
}

impl Default for DefaultAccountCodes {
    fn default() -> Self {
        Self {
            cash: "1001".to_string(),
            bank: "1002".to_string(),
            receivable: "1101".to_string(),
            inventory: "1201".to_string(),
            payable: "2001".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_statement_defaults() {
        let settings = StatementSettings::default();
        assert_eq!(settings.doubtful_accounts_rate, dec!(0.03));
        assert_eq!(settings.balance_tolerance, dec!(0.01));
        assert!(!settings.require_balanced);
        assert_eq!(settings.numbering.prefix, "BS");
        assert_eq!(settings.numbering.sequence_width, 4);
        assert_eq!(settings.default_account_codes.cash, "1001");
        assert_eq!(settings.default_account_codes.payable, "2001");
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("FOLIO__DATABASE__URL", Some("postgres://localhost/folio_test")),
                ("FOLIO__STATEMENTS__REQUIRE_BALANCED", Some("true")),
                ("FOLIO__STATEMENTS__NUMBERING__PREFIX", Some("FS")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/folio_test");
                assert_eq!(config.database.max_connections, 10);
                assert!(config.statements.require_balanced);
                assert_eq!(config.statements.numbering.prefix, "FS");
                assert_eq!(config.statements.numbering.max_attempts, 10);
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_var_unset("FOLIO__DATABASE__URL", || {
            assert!(AppConfig::load().is_err());
        });
    }
}
