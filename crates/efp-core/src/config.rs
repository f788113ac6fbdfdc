//! ============================================================================
//! Config - Chains, contracts and API endpoint
//! ============================================================================
//! Loaded from a JSON file, then overlaid with EFP_* environment variables.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::contracts::{EfpContracts, BASE_CHAIN_ID};
use crate::error::{Result, SettingsError};
use crate::list_ops::DEFAULT_CHUNK_SIZE;
use crate::types::ChainId;

pub const DEFAULT_API_URL: &str = "https://api.ethfollow.xyz/api/v1";

/// Records requested per page when fetching list state
pub const DEFAULT_API_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfpConfig {
    /// Chain hosting the List Registry; owner and location changes are signed here
    pub default_chain_id: ChainId,
    pub contracts: EfpContracts,
    pub api_url: String,
    pub list_op_chunk_size: usize,
    pub api_page_size: usize,
}

impl Default for EfpConfig {
    fn default() -> Self {
        Self {
            default_chain_id: BASE_CHAIN_ID,
            contracts: EfpContracts::default(),
            api_url: DEFAULT_API_URL.to_string(),
            list_op_chunk_size: DEFAULT_CHUNK_SIZE,
            api_page_size: DEFAULT_API_PAGE_SIZE,
        }
    }
}

impl EfpConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading config from: {}", path.display());
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::Config(format!("{}: {}", path.display(), e)))?;
        let config: EfpConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply EFP_API_URL, EFP_DEFAULT_CHAIN_ID and EFP_CHUNK_SIZE when set
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("EFP_API_URL") {
            debug!("EFP_API_URL override: {}", url);
            self.api_url = url;
        }
        if let Ok(chain) = std::env::var("EFP_DEFAULT_CHAIN_ID") {
            self.default_chain_id = chain
                .parse()
                .map_err(|_| SettingsError::Config(format!("bad EFP_DEFAULT_CHAIN_ID: {}", chain)))?;
        }
        if let Ok(size) = std::env::var("EFP_CHUNK_SIZE") {
            self.list_op_chunk_size = size
                .parse()
                .map_err(|_| SettingsError::Config(format!("bad EFP_CHUNK_SIZE: {}", size)))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.list_op_chunk_size == 0 {
            return Err(SettingsError::Config(
                "list_op_chunk_size must be at least 1".into(),
            ));
        }
        if self.api_page_size == 0 {
            return Err(SettingsError::Config("api_page_size must be at least 1".into()));
        }
        if self.api_url.trim().is_empty() {
            return Err(SettingsError::Config("api_url is empty".into()));
        }
        Ok(())
    }
}
