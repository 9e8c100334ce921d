//! # wagerbook-ledger
//!
//! **Ledger host**: the minimal execution environment the settlement state
//! machine runs on. It provides exactly the guarantees the state machine
//! assumes and nothing more. There is no consensus and no replication.
//!
//! ## Architecture
//!
//! 1. **Keypair / Transaction**: ed25519-signed instructions; the first
//!    signer is the invoking identity
//! 2. **AccountStore**: durable lamport balances + typed record data
//! 3. **StagedAccounts**: per-transaction write overlay, committed on
//!    success and discarded on any error
//! 4. **ReplayGuard**: a transaction id lands at most once
//! 5. **SupplyConservation**: lamports are never created or destroyed by
//!    a transaction
//!
//! ## Transaction Flow
//!
//! ```text
//! Transaction → verify signatures → ReplayGuard → Processor.process(ctx)
//!     → Ok: supply delta == 0 → commit overlay → Receipt
//!     → Err: overlay dropped, ledger unchanged
//! ```

pub mod accounts;
pub mod context;
pub mod keys;
pub mod ledger;
pub mod replay;
pub mod supply_conservation;
pub mod transaction;

pub use accounts::{Account, AccountData, AccountStore, StagedAccounts};
pub use context::InvokeContext;
pub use keys::Keypair;
pub use ledger::{Ledger, Processor};
pub use replay::ReplayGuard;
pub use supply_conservation::SupplyConservation;
pub use transaction::{Transaction, TxSignature};
