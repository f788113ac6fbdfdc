//! ============================================================================
//! EFP Contracts - Addresses, ABI bindings and storage locations
//! ============================================================================
//! - List Registry (default chain): storage location + list NFT transfers
//! - List Records (one per chain): list ops, manager and user roles
//!
//! Calls are built as typed `ContractCall`s; the wallet decides how to submit
//! them. `calldata()` produces the ABI encoding for wallets that need it.
//! ============================================================================

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ChainId;

/// Base mainnet, home of the List Registry
pub const BASE_CHAIN_ID: ChainId = 8453;
pub const OPTIMISM_CHAIN_ID: ChainId = 10;
pub const MAINNET_CHAIN_ID: ChainId = 1;

pub const EFP_LIST_REGISTRY: Address = address!("0e688f5dca4a0a4729946acbc44c792341714e08");
pub const EFP_LIST_RECORDS_BASE: Address = address!("41aa48ef3c0446b46a5b1cc6337ff3d3716e2a33");
pub const EFP_LIST_RECORDS_OPTIMISM: Address =
    address!("4ca00413d850dcfa3516e14d21dae2772f2acb85");
pub const EFP_LIST_RECORDS_MAINNET: Address = address!("5289fe5dabc021d02fddf23d4a4df96f4e0f17ef");

/// Storage location version and type for an EVM list records contract
const LOCATION_VERSION: u8 = 1;
const LOCATION_TYPE_EVM: u8 = 1;

mod abi {
    alloy_sol_types::sol! {
        struct KeyValue {
            string key;
            bytes value;
        }

        function setListStorageLocation(uint256 tokenId, bytes listStorageLocation);
        function transferFrom(address from, address to, uint256 tokenId);
        function setMetadataValuesAndApplyListOps(uint256 slot, KeyValue[] records, bytes[] ops);
        function setListManager(uint256 slot, address manager);
        function setListUser(uint256 slot, address user);
    }
}

/// Contract address table, resolved per target chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfpContracts {
    pub list_registry: Address,
    /// Records contract used when a chain has no entry of its own
    pub default_list_records: Address,
    #[serde(default)]
    pub list_records: BTreeMap<ChainId, Address>,
}

impl Default for EfpContracts {
    fn default() -> Self {
        Self {
            list_registry: EFP_LIST_REGISTRY,
            default_list_records: EFP_LIST_RECORDS_BASE,
            list_records: BTreeMap::from([
                (BASE_CHAIN_ID, EFP_LIST_RECORDS_BASE),
                (OPTIMISM_CHAIN_ID, EFP_LIST_RECORDS_OPTIMISM),
                (MAINNET_CHAIN_ID, EFP_LIST_RECORDS_MAINNET),
            ]),
        }
    }
}

impl EfpContracts {
    pub fn list_records_for(&self, chain_id: ChainId) -> Address {
        self.list_records
            .get(&chain_id)
            .copied()
            .unwrap_or(self.default_list_records)
    }

    pub fn supported_chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.list_records.keys().copied()
    }
}

/// A single contract write, ready for the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum ContractCall {
    SetListStorageLocation {
        registry: Address,
        token_id: U256,
        location: Bytes,
    },
    TransferFrom {
        registry: Address,
        from: Address,
        to: Address,
        token_id: U256,
    },
    SetMetadataValuesAndApplyListOps {
        list_records: Address,
        slot: U256,
        metadata: Vec<(String, Bytes)>,
        ops: Vec<Bytes>,
    },
    SetListManager {
        list_records: Address,
        slot: U256,
        manager: Address,
    },
    SetListUser {
        list_records: Address,
        slot: U256,
        user: Address,
    },
}

impl ContractCall {
    /// Contract the call is sent to
    pub fn address(&self) -> Address {
        match self {
            ContractCall::SetListStorageLocation { registry, .. }
            | ContractCall::TransferFrom { registry, .. } => *registry,
            ContractCall::SetMetadataValuesAndApplyListOps { list_records, .. }
            | ContractCall::SetListManager { list_records, .. }
            | ContractCall::SetListUser { list_records, .. } => *list_records,
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            ContractCall::SetListStorageLocation { .. } => "setListStorageLocation",
            ContractCall::TransferFrom { .. } => "transferFrom",
            ContractCall::SetMetadataValuesAndApplyListOps { .. } => {
                "setMetadataValuesAndApplyListOps"
            }
            ContractCall::SetListManager { .. } => "setListManager",
            ContractCall::SetListUser { .. } => "setListUser",
        }
    }

    /// ABI-encoded calldata (selector + arguments)
    pub fn calldata(&self) -> Bytes {
        let encoded = match self.clone() {
            ContractCall::SetListStorageLocation {
                token_id, location, ..
            } => abi::setListStorageLocationCall {
                tokenId: token_id,
                listStorageLocation: location,
            }
            .abi_encode(),
            ContractCall::TransferFrom {
                from, to, token_id, ..
            } => abi::transferFromCall {
                from,
                to,
                tokenId: token_id,
            }
            .abi_encode(),
            ContractCall::SetMetadataValuesAndApplyListOps {
                slot, metadata, ops, ..
            } => abi::setMetadataValuesAndApplyListOpsCall {
                slot,
                records: metadata
                    .into_iter()
                    .map(|(key, value)| abi::KeyValue { key, value })
                    .collect(),
                ops,
            }
            .abi_encode(),
            ContractCall::SetListManager { slot, manager, .. } => {
                abi::setListManagerCall { slot, manager }.abi_encode()
            }
            ContractCall::SetListUser { slot, user, .. } => {
                abi::setListUserCall { slot, user }.abi_encode()
            }
        };
        Bytes::from(encoded)
    }
}

/// Packed storage location:
/// `uint8 version ‖ uint8 type ‖ uint256 chain_id ‖ address records ‖ uint256 slot`
pub fn encode_storage_location(chain_id: ChainId, list_records: Address, slot: U256) -> Bytes {
    let mut out = Vec::with_capacity(86);
    out.push(LOCATION_VERSION);
    out.push(LOCATION_TYPE_EVM);
    out.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    out.extend_from_slice(list_records.as_slice());
    out.extend_from_slice(&slot.to_be_bytes::<32>());
    Bytes::from(out)
}

/// Fresh random slot for a new storage location, top bit cleared
pub fn generate_list_storage_location_slot() -> U256 {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    U256::from_be_bytes(bytes) & (U256::MAX >> 1usize)
}
