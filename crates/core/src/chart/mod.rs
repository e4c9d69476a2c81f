//! Chart of accounts: account types, semantic roles and classification.
//!
//! - `types` - chart entries and pattern filters
//! - `roles` - role → code mapping with configured fallbacks
//! - `classify` - ordered (predicate, bucket) tables
//! - `resolver` - store-backed lookups with degradation

pub mod classify;
pub mod resolver;
pub mod roles;
pub mod types;

pub use classify::{Classifications, ClassificationRule, ClassificationTable, DiscoveryPatterns, Matcher};
pub use resolver::ChartResolver;
pub use roles::{AccountRole, RoleCodes};
pub use types::{categories, AccountFilter, AccountType, ChartAccount, NamePattern};
