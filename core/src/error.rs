use crate::classifier::RiskProfile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No allocation rule for investor {investor_id} (risk profile: {})",
        .risk_profile.map(|p| p.as_str()).unwrap_or("<unmapped>"))]
    MissingRule {
        investor_id: String,
        risk_profile: Option<RiskProfile>,
    },

    #[error("Allocation rule '{risk_profile}' references asset class '{asset_class}' with no market assumption")]
    MarketDataInconsistency {
        risk_profile: RiskProfile,
        asset_class: String,
    },

    #[error("Allocation rule '{risk_profile}' fractions sum to {sum}, expected 1.0")]
    AllocationRuleSum { risk_profile: RiskProfile, sum: f64 },

    #[error("Duplicate key '{key}' in {table} table")]
    DuplicateKey { table: &'static str, key: String },

    #[error("Required column '{column}' missing from input header")]
    MissingColumn { column: String },

    #[error("Row {row} ({investor_id}): cannot parse timestamp '{value}'")]
    InvalidTimestamp {
        row: usize,
        investor_id: String,
        value: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PortfolioResult<T> = Result<T, PortfolioError>;
