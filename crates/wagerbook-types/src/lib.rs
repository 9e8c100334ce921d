//! # wagerbook-types
//!
//! Shared types, errors, and configuration for the **Wagerbook** settlement
//! state machine.
//!
//! Both the ledger host and the settlement program build on these
//! definitions:
//!
//! - **Identifiers**: [`Address`], [`TxId`], and deterministic address derivation
//! - **Registry model**: [`EscrowRegistry`]
//! - **Match model**: [`MatchRecord`], [`MatchStatus`], [`Bet`], [`BetSide`]
//! - **Instructions**: [`Instruction`], [`OperationKind`]
//! - **Receipts**: [`Receipt`], [`Payout`], [`PayoutKind`]
//! - **Configuration**: [`WagerConfig`]
//! - **Errors**: [`WagerError`] with `WB_ERR_` prefix codes
//! - **Constants**: seeds, rent parameters, and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod instruction;
pub mod match_record;
pub mod receipt;
pub mod registry;

// Everything but constants is flattened into the crate root:
//   use wagerbook_types::{Address, MatchRecord, Instruction, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use instruction::*;
pub use match_record::*;
pub use receipt::*;
pub use registry::*;

// Constants stay namespaced: `wagerbook_types::constants::REGISTRY_SEED`.
