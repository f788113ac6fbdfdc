//! ============================================================================
//! EFP-CORE: List Settings Transaction Sequencer
//! ============================================================================
//! This crate plans and drives the wallet transactions behind EFP list
//! settings:
//! - Packed list op encoding and list state replay in batches
//! - Typed contract calls for the List Registry and List Records contracts
//! - A sequential action queue, one wallet confirmation per step
//! - The settings orchestrator (diff -> ordered actions -> network switching)
//! - Common followers summaries and a read-only EFP API client
//! ============================================================================

pub mod actions;
pub mod api;
pub mod config;
pub mod contracts;
pub mod error;
pub mod list_ops;
pub mod orchestrator;
pub mod social;
pub mod transactions;
pub mod types;
pub mod wallet;

// Re-export main types for convenience
pub use actions::{Action, ActionKind, ActionQueue, ActionStatus};
pub use api::EfpApiClient;
pub use config::EfpConfig;
pub use contracts::{ContractCall, EfpContracts};
pub use error::{Result, SettingsError};
pub use list_ops::ListOp;
pub use orchestrator::{SaveListSettings, SaveListSettingsParams, SettingsCallbacks, StepOutcome};
pub use types::*;
pub use wallet::{CartStore, NoopCart, NoopRefresher, ProfileRefresher, WalletClient};
