//! ============================================================================
//! Collaborators - Wallet, profile cache and cart
//! ============================================================================
//! The orchestrator never signs or fetches anything itself. Wallet signing,
//! network switching and backend re-fetches live behind these traits so the
//! caller can plug in a browser bridge, a local signer or a dry-run recorder.
//! ============================================================================

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::contracts::ContractCall;
use crate::error::Result;
use crate::types::{ChainId, TxHash};

/// Signs and submits contract writes
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Connected account, if any
    fn account(&self) -> Option<Address>;

    /// Network the wallet is currently on
    async fn chain_id(&self) -> Result<ChainId>;

    /// Submit a write. `Ok(None)` means the wallet produced no transaction.
    async fn write_contract(&self, call: ContractCall) -> Result<Option<TxHash>>;

    /// Ask the wallet to change network; resolves once the switch settles
    async fn switch_chain(&self, chain_id: ChainId) -> Result<()>;
}

/// Cache-invalidating re-fetches of profile data from the EFP backend
#[async_trait]
pub trait ProfileRefresher: Send + Sync {
    async fn refetch_lists(&self) -> Result<()>;
    async fn refetch_roles(&self) -> Result<()>;
    async fn refetch_profile(&self) -> Result<()>;
    async fn refetch_following(&self) -> Result<()>;
    async fn refetch_followers(&self) -> Result<()>;

    fn set_refetching_profile(&self, refetching: bool);
    fn set_refetching_following(&self, refetching: bool);
}

/// Pending follow/unfollow cart, tied to the list manager
pub trait CartStore: Send + Sync {
    fn reset_cart(&self);
}

/// Refresher for callers without a profile cache
pub struct NoopRefresher;

#[async_trait]
impl ProfileRefresher for NoopRefresher {
    async fn refetch_lists(&self) -> Result<()> {
        Ok(())
    }
    async fn refetch_roles(&self) -> Result<()> {
        Ok(())
    }
    async fn refetch_profile(&self) -> Result<()> {
        Ok(())
    }
    async fn refetch_following(&self) -> Result<()> {
        Ok(())
    }
    async fn refetch_followers(&self) -> Result<()> {
        Ok(())
    }

    fn set_refetching_profile(&self, _refetching: bool) {}
    fn set_refetching_following(&self, _refetching: bool) {}
}

/// Cart for callers without one
pub struct NoopCart;

impl CartStore for NoopCart {
    fn reset_cart(&self) {}
}
