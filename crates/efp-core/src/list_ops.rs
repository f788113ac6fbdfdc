//! ============================================================================
//! List Ops - Packed encoding of EFP list operations
//! ============================================================================
//! A list op is `version ‖ opcode ‖ data`. For address records the data is
//! `record_version ‖ record_type ‖ address[20]`, and tag ops append the raw
//! UTF-8 tag after the record.
//! ============================================================================

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::types::FollowingRecord;

/// Current list op version
pub const LIST_OP_VERSION: u8 = 1;

/// Record version used for address records
pub const RECORD_VERSION: u8 = 1;

/// Record type for a plain address record
pub const RECORD_TYPE_ADDRESS: u8 = 1;

/// Max list ops per `setMetadataValuesAndApplyListOps` call
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Bytes taken by `record_version ‖ record_type ‖ address`
const RECORD_LEN: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ListOpCode {
    AddRecord = 1,
    RemoveRecord = 2,
    AddTag = 3,
    RemoveTag = 4,
}

impl ListOpCode {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::AddRecord),
            2 => Some(Self::RemoveRecord),
            3 => Some(Self::AddTag),
            4 => Some(Self::RemoveTag),
            _ => None,
        }
    }
}

/// One atomic mutation applied to a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOp {
    pub version: u8,
    pub opcode: u8,
    pub data: Vec<u8>,
}

impl ListOp {
    fn record(opcode: ListOpCode, address: &Address, tag: Option<&str>) -> Self {
        let mut data = Vec::with_capacity(RECORD_LEN + tag.map_or(0, str::len));
        data.push(RECORD_VERSION);
        data.push(RECORD_TYPE_ADDRESS);
        data.extend_from_slice(address.as_slice());
        if let Some(tag) = tag {
            data.extend_from_slice(tag.as_bytes());
        }

        Self {
            version: LIST_OP_VERSION,
            opcode: opcode as u8,
            data,
        }
    }

    pub fn add_record(address: &Address) -> Self {
        Self::record(ListOpCode::AddRecord, address, None)
    }

    pub fn remove_record(address: &Address) -> Self {
        Self::record(ListOpCode::RemoveRecord, address, None)
    }

    pub fn add_tag(address: &Address, tag: &str) -> Self {
        Self::record(ListOpCode::AddTag, address, Some(tag))
    }

    pub fn remove_tag(address: &Address, tag: &str) -> Self {
        Self::record(ListOpCode::RemoveTag, address, Some(tag))
    }

    pub fn code(&self) -> Option<ListOpCode> {
        ListOpCode::from_byte(self.opcode)
    }

    /// Tag ops carry an address record followed by the tag bytes
    pub fn is_tag_op(&self) -> bool {
        self.opcode > 2 && self.data.len() > RECORD_LEN
    }

    /// Address of the record this op targets
    pub fn address(&self) -> Option<Address> {
        self.data
            .get(2..RECORD_LEN)
            .map(Address::from_slice)
    }

    /// Split a tag op into its address and tag
    pub fn address_and_tag(&self) -> Option<(Address, String)> {
        if !self.is_tag_op() {
            return None;
        }
        let address = self.address()?;
        let tag = String::from_utf8_lossy(&self.data[RECORD_LEN..]).into_owned();
        Some((address, tag))
    }

    /// Packed bytes submitted on chain
    pub fn encode_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.data.len());
        out.push(self.version);
        out.push(self.opcode);
        out.extend_from_slice(&self.data);
        out
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode_packed()))
    }
}

/// Replay a following snapshot as list ops: each record is added, then each of
/// its tags, keeping snapshot order.
pub fn list_state_to_ops(state: &[FollowingRecord]) -> Vec<ListOp> {
    state
        .iter()
        .flat_map(|record| {
            std::iter::once(ListOp::add_record(&record.data)).chain(
                record
                    .tags
                    .iter()
                    .map(move |tag| ListOp::add_tag(&record.data, tag)),
            )
        })
        .collect()
}

/// Split ops into consecutive batches of at most `size`
pub fn chunk_ops(ops: &[ListOp], size: usize) -> Vec<Vec<ListOp>> {
    let size = size.max(1);
    ops.chunks(size).map(<[ListOp]>::to_vec).collect()
}
