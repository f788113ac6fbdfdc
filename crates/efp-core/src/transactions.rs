//! ============================================================================
//! Transaction Builders - One wallet write per settings effect
//! ============================================================================
//! Every builder returns the transaction hash, or `None` when its inputs are
//! incomplete (no new chain, no slot, no account, malformed address). A hash
//! marks the matching field complete so rebuilt queues skip it.
//! ============================================================================

use alloy_primitives::{Bytes, U256};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::actions::{Action, ActionExecutor, ActionKind};
use crate::contracts::{encode_storage_location, ContractCall, EfpContracts};
use crate::error::Result;
use crate::list_ops::ListOp;
use crate::orchestrator::SaveListSettingsParams;
use crate::types::{parse_address, CompleteTransactions, TxHash};
use crate::wallet::WalletClient;

/// Metadata key binding the replayed list to its user
const USER_METADATA_KEY: &str = "user";

pub struct TransactionBuilder<'a> {
    wallet: &'a dyn WalletClient,
    contracts: &'a EfpContracts,
    params: &'a SaveListSettingsParams,
    new_slot: U256,
    complete: &'a mut CompleteTransactions,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(
        wallet: &'a dyn WalletClient,
        contracts: &'a EfpContracts,
        params: &'a SaveListSettingsParams,
        new_slot: U256,
        complete: &'a mut CompleteTransactions,
    ) -> Self {
        Self {
            wallet,
            contracts,
            params,
            new_slot,
            complete,
        }
    }

    fn token_id(&self) -> U256 {
        U256::from(self.params.selected_list)
    }

    /// Point the list at a fresh slot on the new chain
    pub async fn set_list_storage_location(&mut self) -> Result<Option<TxHash>> {
        let Some(new_chain) = self.params.new_chain else {
            debug!("No target chain, skipping storage location");
            return Ok(None);
        };

        let list_records = self.contracts.list_records_for(new_chain);
        let location = encode_storage_location(new_chain, list_records, self.new_slot);

        let hash = self
            .wallet
            .write_contract(ContractCall::SetListStorageLocation {
                registry: self.contracts.list_registry,
                token_id: self.token_id(),
                location,
            })
            .await?;

        if let Some(hash) = hash {
            info!(
                "List {} storage location moved to chain {}: {}",
                self.params.selected_list, new_chain, hash
            );
            self.complete.chain = true;
        }
        Ok(hash)
    }

    /// Replay one batch of list ops into the new slot
    pub async fn apply_list_ops(&mut self, ops: &[ListOp]) -> Result<Option<TxHash>> {
        let Some(account) = self.wallet.account() else {
            debug!("No connected account, skipping list ops");
            return Ok(None);
        };
        let list_records = match self.params.new_chain {
            Some(chain) => self.contracts.list_records_for(chain),
            None => self.contracts.default_list_records,
        };

        let call = ContractCall::SetMetadataValuesAndApplyListOps {
            list_records,
            slot: self.new_slot,
            metadata: vec![(
                USER_METADATA_KEY.to_string(),
                Bytes::copy_from_slice(account.as_slice()),
            )],
            ops: ops.iter().map(|op| Bytes::from(op.encode_packed())).collect(),
        };

        let hash = self.wallet.write_contract(call).await?;
        if let Some(hash) = hash {
            info!("Applied {} list ops: {}", ops.len(), hash);
        }
        Ok(hash)
    }

    /// Transfer the list NFT to the new owner
    pub async fn set_owner(&mut self) -> Result<Option<TxHash>> {
        let owner = self.params.owner.as_deref().and_then(parse_address);
        let (Some(owner), Some(account)) = (owner, self.wallet.account()) else {
            debug!("Owner or account missing, skipping owner transfer");
            return Ok(None);
        };

        let hash = self
            .wallet
            .write_contract(ContractCall::TransferFrom {
                registry: self.contracts.list_registry,
                from: account,
                to: owner,
                token_id: self.token_id(),
            })
            .await?;

        if let Some(hash) = hash {
            info!("List {} owner set to {}: {}", self.params.selected_list, owner, hash);
            self.complete.owner = true;
        }
        Ok(hash)
    }

    pub async fn set_manager(&mut self) -> Result<Option<TxHash>> {
        let manager = self.params.manager.as_deref().and_then(parse_address);
        // slot 0 is a valid slot; only an absent one skips
        let (Some(list_records), Some(slot), Some(manager)) = (
            self.params.list_records_contract,
            self.params.slot,
            manager,
        ) else {
            debug!("Records contract, slot or manager missing, skipping manager");
            return Ok(None);
        };

        let hash = self
            .wallet
            .write_contract(ContractCall::SetListManager {
                list_records,
                slot,
                manager,
            })
            .await?;

        if let Some(hash) = hash {
            info!("List {} manager set to {}: {}", self.params.selected_list, manager, hash);
            self.complete.manager = true;
        }
        Ok(hash)
    }

    pub async fn set_user(&mut self) -> Result<Option<TxHash>> {
        let user = self.params.user.as_deref().and_then(parse_address);
        // same slot rule as set_manager
        let (Some(list_records), Some(slot), Some(user)) =
            (self.params.list_records_contract, self.params.slot, user)
        else {
            debug!("Records contract, slot or user missing, skipping user");
            return Ok(None);
        };

        let hash = self
            .wallet
            .write_contract(ContractCall::SetListUser {
                list_records,
                slot,
                user,
            })
            .await?;

        if let Some(hash) = hash {
            info!("List {} user set to {}: {}", self.params.selected_list, user, hash);
            self.complete.user = true;
        }
        Ok(hash)
    }
}

#[async_trait]
impl ActionExecutor for TransactionBuilder<'_> {
    async fn execute(&mut self, action: &Action) -> Result<Option<TxHash>> {
        match &action.kind {
            ActionKind::SetListUser => self.set_user().await,
            ActionKind::SetListManager => self.set_manager().await,
            ActionKind::SetListStorageLocation => self.set_list_storage_location().await,
            ActionKind::UpdateList { ops, .. } => self.apply_list_ops(ops).await,
            ActionKind::SetListOwner => self.set_owner().await,
        }
    }
}
