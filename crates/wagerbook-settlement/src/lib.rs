//! # wagerbook-settlement
//!
//! **The settlement program**: every operation a caller can submit against
//! the escrow registry and match records.
//!
//! ## Components
//!
//! - [`gate`]: pure pause/authority predicate consulted before anything else
//! - [`lifecycle`]: legal status transitions for a match record
//! - [`engine`]: fee and share arithmetic, batch selection, claim marking
//! - [`program`]: [`WagerProgram`], the [`Processor`](wagerbook_ledger::Processor)
//!   wiring the three together, one handler per instruction
//!
//! ## Operation Flow
//!
//! ```text
//! Instruction → gate(registry, caller, kind)
//!     → load record, check match_id
//!     → lifecycle.apply(status)
//!     → engine (fees / payouts)
//!     → store record, release escrow → Receipt
//! ```
//!
//! Every step returns `Result`; the ledger host discards the whole
//! transaction on the first error.

pub mod engine;
pub mod gate;
pub mod lifecycle;
pub mod program;

pub use engine::{ClaimClass, Resolution};
pub use gate::{DenyReason, GateDecision};
pub use lifecycle::Transition;
pub use program::WagerProgram;
