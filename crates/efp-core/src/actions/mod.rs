//! ============================================================================
//! Actions - Queued on-chain effects
//! ============================================================================
//! Each action names one wallet confirmation: the effect to apply, the chain
//! it must be signed on and its progress. Actions run strictly one at a time.
//! ============================================================================

mod queue;

pub use queue::{ActionExecutor, ActionQueue};

use serde::{Deserialize, Serialize};

use crate::list_ops::ListOp;
use crate::types::{ChainId, TxHash};

/// The effect an action applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    SetListUser,
    SetListManager,
    SetListStorageLocation,
    /// One batch of list ops replayed onto the new storage location
    UpdateList {
        index: usize,
        total: usize,
        ops: Vec<ListOp>,
    },
    SetListOwner,
}

impl ActionKind {
    /// Stable identifier, unique within one queue
    pub fn id(&self) -> String {
        match self {
            ActionKind::SetListUser => "SetEFPListUser".to_string(),
            ActionKind::SetListManager => "SetEFPListManager".to_string(),
            ActionKind::SetListStorageLocation => "SetEFPListStorageLocation".to_string(),
            ActionKind::UpdateList { index, .. } => format!("UpdateEFPList {}", index),
            ActionKind::SetListOwner => "SetEFPListOwner".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ActionKind::SetListUser => "set user".to_string(),
            ActionKind::SetListManager => "set manager".to_string(),
            ActionKind::SetListStorageLocation => "set location".to_string(),
            ActionKind::UpdateList { index, total, .. } => {
                format!("Transfer List State {}/{}", index + 1, total)
            }
            ActionKind::SetListOwner => "set owner".to_string(),
        }
    }
}

/// Progress of a single action
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Pending,
    Submitted(TxHash),
    /// Prerequisites missing, nothing was sent
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub kind: ActionKind,
    pub label: String,
    /// Network the wallet must be on to sign this action
    pub chain_id: ChainId,
    pub status: ActionStatus,
    /// Waiting on the wallet
    pub is_pending_confirmation: bool,
}

impl Action {
    pub fn new(kind: ActionKind, chain_id: ChainId) -> Self {
        Self {
            id: kind.id(),
            label: kind.label(),
            kind,
            chain_id,
            status: ActionStatus::Pending,
            is_pending_confirmation: false,
        }
    }

    /// Not yet sent, or failed and open to another attempt
    pub fn is_runnable(&self) -> bool {
        matches!(self.status, ActionStatus::Pending | ActionStatus::Failed(_))
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self.status {
            ActionStatus::Submitted(hash) => Some(hash),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_ids_and_labels() {
        let action = Action::new(ActionKind::SetListOwner, 8453);
        assert_eq!(action.id, "SetEFPListOwner");
        assert_eq!(action.label, "set owner");
        assert_eq!(action.status, ActionStatus::Pending);

        let update = Action::new(
            ActionKind::UpdateList {
                index: 1,
                total: 3,
                ops: vec![],
            },
            10,
        );
        assert_eq!(update.id, "UpdateEFPList 1");
        assert_eq!(update.label, "Transfer List State 2/3");
        assert!(update.tx_hash().is_none());
    }

    #[test]
    fn test_only_pending_or_failed_actions_run() {
        let mut action = Action::new(ActionKind::SetListUser, 8453);
        assert!(action.is_runnable());

        action.status = ActionStatus::Failed("user rejected".into());
        assert!(action.is_runnable());

        action.status = ActionStatus::Submitted(TxHash::with_last_byte(1));
        assert!(!action.is_runnable());

        action.status = ActionStatus::Skipped;
        assert!(!action.is_runnable());
    }
}
