use rust_decimal::Decimal;
use thiserror::Error;

/// Caller-supplied data was malformed. Reported back, never recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("negative amount {amount} for section {section} component '{component}'")]
    NegativeAmount {
        section: String,
        component: String,
        amount: Decimal,
    },

    #[error("negative {field}: {amount}")]
    NegativeIncome {
        field: &'static str,
        amount: Decimal,
    },

    /// The standard deduction is applied by the engine itself.
    #[error("section {0} is applied automatically and cannot be claimed directly")]
    ReservedSection(String),

    #[error("taxpayer category '{0}' is not supported for slab computation")]
    UnsupportedCategory(String),
}

/// Configuration for the requested year/regime is missing or malformed.
/// Fatal for the request; no partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no configuration for financial year {0}")]
    UnknownFinancialYear(String),

    #[error("invalid financial year '{0}', expected e.g. \"2024-25\"")]
    InvalidFinancialYear(String),

    #[error("no slab table for the {regime} regime, age bracket {age}")]
    MissingSlabTable { regime: String, age: String },

    #[error("no deduction rule configured for section {0}")]
    MissingRule(String),

    #[error("no cap configured for deduction group {0}")]
    MissingGroupCap(String),

    #[error("invalid slab table: {0}")]
    InvalidSlabTable(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
