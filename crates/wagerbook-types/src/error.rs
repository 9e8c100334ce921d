//! Error types for the Wagerbook settlement state machine.
//!
//! All errors use the `WB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization / pause gate errors
//! - 2xx: Record errors (registry, match records, derivation)
//! - 3xx: Lifecycle errors
//! - 4xx: Bet errors
//! - 5xx: Settlement errors
//! - 6xx: Ledger errors (funds, signatures, supply)
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Address, MatchStatus};

/// Central error enum for all Wagerbook operations.
#[derive(Debug, Error)]
pub enum WagerError {
    // =================================================================
    // Gate Errors (1xx)
    // =================================================================
    /// The registry pause flag rejects this operation.
    #[error("WB_ERR_100: Program is paused")]
    Paused,

    /// The caller is not the registry authority.
    #[error("WB_ERR_101: Unauthorized: {caller} is not the authority")]
    Unauthorized { caller: Address },

    // =================================================================
    // Record Errors (2xx)
    // =================================================================
    /// No registry or match record exists at the given address.
    #[error("WB_ERR_200: Unknown record: {0}")]
    UnknownRecord(Address),

    /// The supplied `match_id` does not match the record's.
    #[error("WB_ERR_201: Match id mismatch: expected {expected}, got {supplied}")]
    IdentifierMismatch { expected: String, supplied: String },

    /// An account already exists at the target address.
    #[error("WB_ERR_202: Record already exists: {0}")]
    RecordExists(Address),

    /// Another open match record already uses this `match_id`.
    #[error("WB_ERR_203: Duplicate match id: {0}")]
    DuplicateMatchId(String),

    /// A label is empty or longer than the configured limit.
    #[error("WB_ERR_204: Invalid {field}: {reason}")]
    InvalidLabel { field: &'static str, reason: String },

    /// The bump does not produce the canonical derived address.
    #[error("WB_ERR_205: Invalid derivation: {reason}")]
    InvalidDerivation { reason: String },

    // =================================================================
    // Lifecycle Errors (3xx)
    // =================================================================
    /// The operation is not legal from the record's current status.
    #[error("WB_ERR_300: Illegal transition: cannot {operation} while {status}")]
    IllegalTransition {
        operation: &'static str,
        status: MatchStatus,
    },

    /// A completed match carries no winner.
    #[error("WB_ERR_301: No winner set")]
    NoWinnerSet,

    // =================================================================
    // Bet Errors (4xx)
    // =================================================================
    /// Bet amount must be positive.
    #[error("WB_ERR_400: Bet amount must be greater than zero")]
    ZeroAmount,

    /// Bet amount is below the configured minimum.
    #[error("WB_ERR_401: Bet too small: minimum {minimum}, got {amount}")]
    BetTooSmall { minimum: u64, amount: u64 },

    /// The label names neither competitor and no slot is open.
    #[error("WB_ERR_402: Invalid competitor: {0}")]
    InvalidCompetitor(String),

    /// The bettor already holds a bet in this match.
    #[error("WB_ERR_403: Bettor {0} already placed a bet in this match")]
    DuplicateBettor(Address),

    /// The bet ledger reached its capacity.
    #[error("WB_ERR_404: Bet ledger full ({capacity} bets)")]
    BetLedgerFull { capacity: usize },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// A batch entry doesn't correspond to a matching bet.
    #[error("WB_ERR_500: Invalid batch entry: {bettor}: {reason}")]
    InvalidBatchEntry { bettor: Address, reason: String },

    /// The bet was already paid out.
    #[error("WB_ERR_501: Already claimed: {0}")]
    AlreadyClaimed(Address),

    /// The payout exceeds the escrow left in the account.
    #[error("WB_ERR_502: Insufficient escrow in {account}: need {needed}, have {available}")]
    InsufficientEscrow {
        account: Address,
        needed: u64,
        available: u64,
    },

    /// Close attempted with unclaimed applicable bets.
    #[error("WB_ERR_503: Unsettled claims: {remaining} bet(s) still unclaimed")]
    UnsettledClaims { remaining: usize },

    /// Fee or share arithmetic overflowed.
    #[error("WB_ERR_504: Arithmetic overflow in {context}")]
    Overflow { context: &'static str },

    // =================================================================
    // Ledger Errors (6xx)
    // =================================================================
    /// A signer's wallet cannot fund the transfer.
    #[error("WB_ERR_600: Insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: Address,
        needed: u64,
        available: u64,
    },

    /// A transaction signature failed verification.
    #[error("WB_ERR_601: Signature verification failed for {0}")]
    InvalidSignature(Address),

    /// The operation requires a signature that the transaction lacks.
    #[error("WB_ERR_602: Missing required signer: {0}")]
    MissingSigner(Address),

    /// The transaction carries no signatures at all.
    #[error("WB_ERR_603: Transaction has no signers")]
    NoSigners,

    /// Lamports were created or destroyed.
    #[error("WB_ERR_604: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// A transaction with this id was already processed (replay).
    #[error("WB_ERR_605: Duplicate transaction: {0}")]
    DuplicateTransaction(crate::TxId),

    /// The transaction id is older than the replay window remembers.
    #[error("WB_ERR_606: Transaction expired: {0} predates the replay window")]
    TransactionExpired(crate::TxId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("WB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("WB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("WB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, WagerError>;

impl From<serde_json::Error> for WagerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_display_contains_prefix() {
        let msg = format!("{}", WagerError::Paused);
        assert!(msg.starts_with("WB_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn illegal_transition_display() {
        let err = WagerError::IllegalTransition {
            operation: "claim refund",
            status: MatchStatus::Completed,
        };
        let msg = format!("{err}");
        assert!(msg.contains("WB_ERR_300"));
        assert!(msg.contains("claim refund"));
        assert!(msg.contains("COMPLETED"));
    }

    #[test]
    fn insufficient_escrow_display() {
        let err = WagerError::InsufficientEscrow {
            account: Address([7u8; 32]),
            needed: 100,
            available: 50,
        };
        let msg = format!("{err}");
        assert!(msg.contains("WB_ERR_502"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_wb_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(WagerError::ZeroAmount),
            Box::new(WagerError::NoWinnerSet),
            Box::new(WagerError::UnsettledClaims { remaining: 2 }),
            Box::new(WagerError::Internal("test".into())),
            Box::new(WagerError::IdentifierMismatch {
                expected: "a".into(),
                supplied: "b".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("WB_ERR_"),
                "Error missing WB_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let err: WagerError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, WagerError::Serialization(_)));
    }
}
