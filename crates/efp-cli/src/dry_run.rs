// ============================================================================
// DryRunWallet — records contract writes instead of signing them
// ============================================================================

use alloy_primitives::{keccak256, Address};
use async_trait::async_trait;
use efp_core::{ChainId, ContractCall, Result, TxHash, WalletClient};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::info;

pub struct DryRunWallet {
    account: Option<Address>,
    chain: AtomicU64,
    calls: Mutex<Vec<(ChainId, ContractCall)>>,
}

impl DryRunWallet {
    pub fn new(account: Option<Address>, chain: ChainId) -> Self {
        Self {
            account,
            chain: AtomicU64::new(chain),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every recorded write with the chain it was sent on
    pub fn calls(&self) -> Vec<(ChainId, ContractCall)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WalletClient for DryRunWallet {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn chain_id(&self) -> Result<ChainId> {
        Ok(self.chain.load(Ordering::SeqCst))
    }

    async fn write_contract(&self, call: ContractCall) -> Result<Option<TxHash>> {
        let chain = self.chain.load(Ordering::SeqCst);
        let calldata = call.calldata();

        let mut calls = self
            .calls
            .lock()
            .map_err(|_| efp_core::SettingsError::Wallet("call log poisoned".into()))?;

        // Deterministic fake hash: calldata plus position in the log
        let mut preimage = calldata.to_vec();
        preimage.extend_from_slice(&(calls.len() as u64).to_be_bytes());
        let hash = keccak256(&preimage);

        info!(
            "[dry-run] chain {} {}.{} ({} bytes) -> {}",
            chain,
            call.address(),
            call.function_name(),
            calldata.len(),
            hash
        );
        calls.push((chain, call));
        Ok(Some(hash))
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<()> {
        info!("[dry-run] switching to chain {}", chain_id);
        self.chain.store(chain_id, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[tokio::test]
    async fn test_records_calls_on_current_chain() {
        let wallet = DryRunWallet::new(Some(Address::repeat_byte(1)), 8453);
        let call = ContractCall::SetListUser {
            list_records: Address::repeat_byte(2),
            slot: U256::from(1u8),
            user: Address::repeat_byte(3),
        };

        let first = wallet.write_contract(call.clone()).await.unwrap();
        wallet.switch_chain(10).await.unwrap();
        let second = wallet.write_contract(call.clone()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(wallet.chain_id().await.unwrap(), 10);
        assert_eq!(wallet.calls(), vec![(8453, call.clone()), (10, call)]);
    }
}
