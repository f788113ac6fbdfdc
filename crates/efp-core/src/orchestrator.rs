//! ============================================================================
//! Save List Settings - Plans and drives the settings transactions
//! ============================================================================
//! Turns a diff of edited list settings into an ordered action queue:
//!
//!   [set user] [set manager] [set location + list state batches] [set owner]
//!
//! The caller steps through the queue with `initiate` and `advance`, one
//! wallet confirmation per step. When the wallet sits on the wrong network the
//! step only switches it and stops at `InitiateTransactions`; the following
//! `initiate` runs the action that needed the switch. `finish` re-fetches the
//! profile data and hands control back through the completion callbacks.
//! ============================================================================

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::actions::{Action, ActionKind, ActionQueue, ActionStatus};
use crate::config::EfpConfig;
use crate::contracts::generate_list_storage_location_slot;
use crate::error::Result;
use crate::list_ops::{chunk_ops, list_state_to_ops};
use crate::transactions::TransactionBuilder;
use crate::types::{ChainId, ChangedValues, CompleteTransactions, FollowingRecord, Step, TxHash};
use crate::wallet::{CartStore, ProfileRefresher, WalletClient};

/// Inputs describing the list being edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveListSettingsParams {
    /// List token id
    pub selected_list: u64,
    /// Chain the list currently lives on
    pub chain: Option<ChainId>,
    /// Chain picked in the editor
    pub new_chain: Option<ChainId>,
    /// Current storage slot
    pub slot: Option<U256>,
    pub owner: Option<String>,
    pub manager: Option<String>,
    pub user: Option<String>,
    /// Records contract of the current storage location
    pub list_records_contract: Option<Address>,
    pub changed_values: ChangedValues,
    /// Full following snapshot, replayed when the list changes chain
    pub list_state: Option<Vec<FollowingRecord>>,
}

/// Completion hooks owned by the caller
pub struct SettingsCallbacks {
    pub on_cancel: Box<dyn FnMut() + Send>,
    pub on_close: Box<dyn FnMut() + Send>,
}

impl Default for SettingsCallbacks {
    fn default() -> Self {
        Self {
            on_cancel: Box::new(|| {}),
            on_close: Box::new(|| {}),
        }
    }
}

/// What a driver call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing to do (no current chain or empty queue)
    Idle,
    /// Wallet was moved to another network; call `initiate` to continue
    NetworkSwitched { chain_id: ChainId },
    Executed { index: usize, hash: Option<TxHash> },
    /// No action left after the cursor
    Exhausted,
}

pub struct SaveListSettings {
    params: SaveListSettingsParams,
    config: EfpConfig,
    wallet: Arc<dyn WalletClient>,
    refresher: Arc<dyn ProfileRefresher>,
    cart: Arc<dyn CartStore>,
    callbacks: SettingsCallbacks,
    queue: ActionQueue,
    complete: CompleteTransactions,
    current_step: Step,
    /// Slot used if the list moves; fixed for the lifetime of this session
    new_slot: U256,
}

impl SaveListSettings {
    pub fn new(
        params: SaveListSettingsParams,
        config: EfpConfig,
        wallet: Arc<dyn WalletClient>,
        refresher: Arc<dyn ProfileRefresher>,
        cart: Arc<dyn CartStore>,
        callbacks: SettingsCallbacks,
    ) -> Self {
        let mut settings = Self {
            params,
            config,
            wallet,
            refresher,
            cart,
            callbacks,
            queue: ActionQueue::new(),
            complete: CompleteTransactions::default(),
            current_step: Step::InitiateTransactions,
            new_slot: generate_list_storage_location_slot(),
        };
        settings.rebuild_actions();
        settings
    }

    pub fn params(&self) -> &SaveListSettingsParams {
        &self.params
    }

    pub fn actions(&self) -> &[Action] {
        self.queue.actions()
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn set_current_step(&mut self, step: Step) {
        self.current_step = step;
    }

    pub fn complete_transactions(&self) -> CompleteTransactions {
        self.complete
    }

    pub fn new_slot(&self) -> U256 {
        self.new_slot
    }

    pub fn set_changed_values(&mut self, changed_values: ChangedValues) {
        self.params.changed_values = changed_values;
        self.rebuild_actions();
    }

    /// Current chain of the list, as fetched
    pub fn set_chain(&mut self, chain: Option<ChainId>) {
        self.params.chain = chain;
        self.rebuild_actions();
    }

    /// Pick a storage chain; the chain counts as changed when it differs from
    /// the fetched one
    pub fn set_new_chain(&mut self, new_chain: Option<ChainId>) {
        self.params.new_chain = new_chain;
        self.params.changed_values.chain = new_chain.is_some() && new_chain != self.params.chain;
        self.rebuild_actions();
    }

    pub fn set_list_state(&mut self, list_state: Option<Vec<FollowingRecord>>) {
        self.params.list_state = list_state;
        self.rebuild_actions();
    }

    /// Ordered actions still needed for the current inputs.
    /// Fields already confirmed in this session are left out.
    pub fn build_actions(&self) -> Vec<Action> {
        let Some(chain) = self.params.chain else {
            return Vec::new();
        };
        let changed = &self.params.changed_values;
        let complete = &self.complete;
        let default_chain = self.config.default_chain_id;

        let mut actions = Vec::new();
        if changed.user && !complete.user {
            actions.push(Action::new(ActionKind::SetListUser, chain));
        }
        if changed.manager && !complete.manager {
            actions.push(Action::new(ActionKind::SetListManager, chain));
        }
        if let (true, Some(new_chain)) = (changed.chain, self.params.new_chain) {
            if !complete.chain {
                actions.push(Action::new(ActionKind::SetListStorageLocation, default_chain));
            }
            if let Some(state) = &self.params.list_state {
                let ops = list_state_to_ops(state);
                let chunks = chunk_ops(&ops, self.config.list_op_chunk_size);
                let total = chunks.len();
                actions.extend(chunks.into_iter().enumerate().map(|(index, ops)| {
                    Action::new(ActionKind::UpdateList { index, total, ops }, new_chain)
                }));
            }
        }
        if changed.owner && !complete.owner {
            actions.push(Action::new(ActionKind::SetListOwner, default_chain));
        }
        actions
    }

    /// Discard unexecuted actions and queue what the inputs call for now
    pub fn rebuild_actions(&mut self) {
        let actions = self.build_actions();
        debug!("Rebuilt action queue with {} actions", actions.len());
        self.queue.reset();
        self.queue.add(actions);
    }

    /// Run the action under the cursor, switching network first if needed
    pub async fn initiate(&mut self) -> Result<StepOutcome> {
        if self.params.chain.is_none() {
            return Ok(StepOutcome::Idle);
        }
        let index = self.queue.current_index();
        let Some(action) = self.queue.current() else {
            return Ok(StepOutcome::Idle);
        };
        if !action.is_runnable() {
            debug!("Action {} already ran, not sending it again", action.id);
            return Ok(StepOutcome::Idle);
        }
        let required = action.chain_id;

        if let Some(outcome) = ensure_chain(self.wallet.as_ref(), required).await? {
            return Ok(outcome);
        }

        let hash = self.execute(index).await?;
        self.current_step = Step::TransactionStatus;
        Ok(StepOutcome::Executed { index, hash })
    }

    /// Move to the next action and run it. On a network mismatch the cursor
    /// still moves, the wallet switches and the step returns to
    /// `InitiateTransactions`.
    ///
    /// While the action under the cursor is waiting for [`Self::initiate`],
    /// this returns `Idle` and leaves the cursor where it is.
    pub async fn advance(&mut self) -> Result<StepOutcome> {
        if self.params.chain.is_none() {
            return Ok(StepOutcome::Idle);
        }
        if self.current_step == Step::InitiateTransactions
            && self
                .queue
                .current()
                .is_some_and(|a| a.status == ActionStatus::Pending)
        {
            debug!("Action {} not initiated yet, holding cursor", self.queue.current_index());
            return Ok(StepOutcome::Idle);
        }
        let next = self.queue.current_index() + 1;
        let Some(required) = self.queue.get(next).map(|a| a.chain_id) else {
            return Ok(StepOutcome::Exhausted);
        };

        if let Some(outcome) = ensure_chain(self.wallet.as_ref(), required).await? {
            self.queue.move_to_next();
            self.current_step = Step::InitiateTransactions;
            return Ok(outcome);
        }

        let Some(index) = self.queue.move_to_next() else {
            return Ok(StepOutcome::Exhausted);
        };
        let hash = self.execute(index).await?;
        Ok(StepOutcome::Executed { index, hash })
    }

    /// Drop the queue without sending anything else
    pub fn cancel(&mut self) {
        info!("List settings cancelled with {} actions queued", self.queue.len());
        self.queue.reset();
        self.current_step = Step::InitiateTransactions;
        (self.callbacks.on_cancel)();
    }

    /// Refresh everything the new settings touch, then close
    pub async fn finish(&mut self) {
        self.refresher.set_refetching_profile(true);
        self.refresher.set_refetching_following(true);

        if self.params.changed_values.manager {
            self.cart.reset_cart();
        }

        let refresher = &self.refresher;
        let (lists, roles, profile, following, followers) = tokio::join!(
            refresher.refetch_lists(),
            refresher.refetch_roles(),
            refresher.refetch_profile(),
            refresher.refetch_following(),
            refresher.refetch_followers(),
        );
        for (name, result) in [
            ("lists", lists),
            ("roles", roles),
            ("profile", profile),
            ("following", following),
            ("followers", followers),
        ] {
            if let Err(e) = result {
                warn!("Failed to refetch {}: {}", name, e);
            }
        }

        self.queue.reset();
        info!("List {} settings saved", self.params.selected_list);
        (self.callbacks.on_cancel)();
        (self.callbacks.on_close)();
    }

    async fn execute(&mut self, index: usize) -> Result<Option<TxHash>> {
        let mut builder = TransactionBuilder::new(
            self.wallet.as_ref(),
            &self.config.contracts,
            &self.params,
            self.new_slot,
            &mut self.complete,
        );
        self.queue.execute_by_index(index, &mut builder).await
    }
}

/// Switch the wallet when it is not on `required`
async fn ensure_chain(wallet: &dyn WalletClient, required: ChainId) -> Result<Option<StepOutcome>> {
    let current = wallet.chain_id().await?;
    if current == required {
        return Ok(None);
    }
    info!("Switching wallet from chain {} to {}", current, required);
    wallet.switch_chain(required).await?;
    Ok(Some(StepOutcome::NetworkSwitched { chain_id: required }))
}
