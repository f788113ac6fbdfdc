//! ============================================================================
//! Action Queue - Ordered, cursor-driven execution
//! ============================================================================
//! The caller moves the cursor explicitly between steps; nothing runs on its
//! own. Each execution awaits one wallet round trip.
//! ============================================================================

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{Action, ActionStatus};
use crate::error::{Result, SettingsError};
use crate::types::TxHash;

/// Performs the on-chain effect behind an action
#[async_trait]
pub trait ActionExecutor: Send {
    async fn execute(&mut self, action: &Action) -> Result<Option<TxHash>>;
}

#[derive(Debug, Default, Clone)]
pub struct ActionQueue {
    actions: Vec<Action>,
    current_index: usize,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append actions after any already queued
    pub fn add(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.actions.extend(actions);
    }

    /// Drop every action and rewind the cursor
    pub fn reset(&mut self) {
        self.actions.clear();
        self.current_index = 0;
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn current(&self) -> Option<&Action> {
        self.actions.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Cursor is on the last action, or the queue is empty
    pub fn is_finished(&self) -> bool {
        self.current_index + 1 >= self.actions.len()
    }

    /// Advance the cursor and return the new index, or `None` at the end
    pub fn move_to_next(&mut self) -> Option<usize> {
        if self.current_index + 1 >= self.actions.len() {
            return None;
        }
        self.current_index += 1;
        debug!("Action cursor moved to {}", self.current_index);
        Some(self.current_index)
    }

    /// Run the action at `index` and record its outcome
    pub async fn execute_by_index<E: ActionExecutor + ?Sized>(
        &mut self,
        index: usize,
        executor: &mut E,
    ) -> Result<Option<TxHash>> {
        let len = self.actions.len();
        let slot = self
            .actions
            .get_mut(index)
            .ok_or(SettingsError::ActionOutOfRange { index, len })?;
        slot.is_pending_confirmation = true;

        let action = &self.actions[index];
        info!("Executing action {} ({}/{}): {}", action.id, index + 1, len, action.label);
        let result = executor.execute(action).await;

        let action = &mut self.actions[index];
        action.is_pending_confirmation = false;
        match &result {
            Ok(Some(hash)) => {
                info!("Action {} submitted: {}", action.id, hash);
                action.status = ActionStatus::Submitted(*hash);
            }
            Ok(None) => {
                debug!("Action {} produced no transaction", action.id);
                action.status = ActionStatus::Skipped;
            }
            Err(e) => {
                warn!("Action {} failed: {}", action.id, e);
                action.status = ActionStatus::Failed(e.to_string());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use alloy_primitives::B256;

    struct Recorder {
        seen: Vec<String>,
        fail: bool,
    }

    #[async_trait]
    impl ActionExecutor for Recorder {
        async fn execute(&mut self, action: &Action) -> Result<Option<TxHash>> {
            assert!(action.is_pending_confirmation);
            self.seen.push(action.id.clone());
            if self.fail {
                return Err(SettingsError::Wallet("rejected".into()));
            }
            Ok(Some(B256::with_last_byte(self.seen.len() as u8)))
        }
    }

    fn queue() -> ActionQueue {
        let mut q = ActionQueue::new();
        q.add([
            Action::new(ActionKind::SetListUser, 8453),
            Action::new(ActionKind::SetListOwner, 8453),
        ]);
        q
    }

    #[test]
    fn test_move_to_next_stops_at_end() {
        let mut q = queue();
        assert_eq!(q.current_index(), 0);
        assert!(!q.is_finished());
        assert_eq!(q.move_to_next(), Some(1));
        assert!(q.is_finished());
        assert_eq!(q.move_to_next(), None);
        assert_eq!(q.current_index(), 1);
    }

    #[test]
    fn test_reset_clears_actions_and_cursor() {
        let mut q = queue();
        q.move_to_next();
        q.reset();
        assert!(q.is_empty());
        assert_eq!(q.current_index(), 0);
        assert!(q.current().is_none());
    }

    #[tokio::test]
    async fn test_execute_records_status() {
        let mut q = queue();
        let mut exec = Recorder {
            seen: vec![],
            fail: false,
        };

        let hash = q.execute_by_index(1, &mut exec).await.unwrap();
        assert_eq!(hash, Some(B256::with_last_byte(1)));
        assert_eq!(exec.seen, vec!["SetEFPListOwner".to_string()]);
        assert_eq!(q.get(1).unwrap().tx_hash(), hash);
        assert!(!q.get(1).unwrap().is_pending_confirmation);
        assert_eq!(q.get(0).unwrap().status, ActionStatus::Pending);
    }

    #[tokio::test]
    async fn test_execute_failure_marks_failed() {
        let mut q = queue();
        let mut exec = Recorder {
            seen: vec![],
            fail: true,
        };

        assert!(q.execute_by_index(0, &mut exec).await.is_err());
        assert!(matches!(q.get(0).unwrap().status, ActionStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_execute_out_of_range() {
        let mut q = queue();
        let mut exec = Recorder {
            seen: vec![],
            fail: false,
        };

        let err = q.execute_by_index(5, &mut exec).await.unwrap_err();
        assert!(matches!(
            err,
            SettingsError::ActionOutOfRange { index: 5, len: 2 }
        ));
    }
}
