//! ============================================================================
//! Errors - Failure taxonomy for list settings transactions
//! ============================================================================
//! Missing prerequisites are not errors: builders return `Ok(None)` and the
//! action is recorded as skipped. Only external failures surface here.
//! ============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("no action at index {index} (queue holds {len})")]
    ActionOutOfRange { index: usize, len: usize },

    /// Wallet rejected the request or the RPC behind it failed
    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("EFP API error: {0}")]
    Api(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SettingsError {
    fn from(e: reqwest::Error) -> Self {
        SettingsError::Api(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
