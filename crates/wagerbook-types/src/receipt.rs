//! Receipt types for the Wagerbook audit trail.
//!
//! Every committed transaction produces a [`Receipt`] listing the funds it
//! moved out of escrow. Receipts are only issued for transactions that
//! landed; aborted transactions leave no trace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, MatchStatus, OperationKind, TxId};

/// Why funds left an escrow account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutKind {
    /// Winning bettor's proportional share.
    Prize,
    /// Bettor's original stake returned.
    Refund,
    /// Protocol fee taken at resolution.
    Fee,
    /// Privileged withdrawal from the registry account.
    Withdrawal,
    /// Rounding remainder swept to the fee destination on close.
    Dust,
    /// Storage allowance returned when a record is closed.
    StorageReclaim,
}

impl std::fmt::Display for PayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prize => write!(f, "PRIZE"),
            Self::Refund => write!(f, "REFUND"),
            Self::Fee => write!(f, "FEE"),
            Self::Withdrawal => write!(f, "WITHDRAWAL"),
            Self::Dust => write!(f, "DUST"),
            Self::StorageReclaim => write!(f, "STORAGE_RECLAIM"),
        }
    }
}

/// A single transfer out of escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: Address,
    pub amount: u64,
    pub kind: PayoutKind,
}

impl Payout {
    #[must_use]
    pub fn new(recipient: Address, amount: u64, kind: PayoutKind) -> Self {
        Self {
            recipient,
            amount,
            kind,
        }
    }
}

/// Proof that a transaction committed, and what it paid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: TxId,
    pub operation: OperationKind,
    /// The match the operation touched, if any.
    pub match_id: Option<String>,
    /// Status after the operation; `None` for non-match operations and
    /// for closes (the record no longer exists).
    pub status: Option<MatchStatus>,
    pub payouts: Vec<Payout>,
    pub executed_at: DateTime<Utc>,
}

impl Receipt {
    #[must_use]
    pub fn new(tx_id: TxId, operation: OperationKind) -> Self {
        Self {
            tx_id,
            operation,
            match_id: None,
            status: None,
            payouts: Vec::new(),
            executed_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn for_match(mut self, match_id: &str, status: Option<MatchStatus>) -> Self {
        self.match_id = Some(match_id.to_string());
        self.status = status;
        self
    }

    /// Total lamports paid out with the given kind.
    #[must_use]
    pub fn total(&self, kind: PayoutKind) -> u64 {
        self.payouts
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.amount)
            .sum()
    }

    /// Amount paid to `recipient` across all kinds.
    #[must_use]
    pub fn paid_to(&self, recipient: &Address) -> u64 {
        self.payouts
            .iter()
            .filter(|p| p.recipient == *recipient)
            .map(|p| p.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payout_kind_display() {
        assert_eq!(format!("{}", PayoutKind::Prize), "PRIZE");
        assert_eq!(format!("{}", PayoutKind::StorageReclaim), "STORAGE_RECLAIM");
    }

    #[test]
    fn totals_filter_by_kind_and_recipient() {
        let x = Address([1u8; 32]);
        let y = Address([2u8; 32]);
        let mut receipt =
            Receipt::new(TxId::new(), OperationKind::ClaimPrize).for_match("M", Some(MatchStatus::Completed));
        receipt.payouts.push(Payout::new(x, 190, PayoutKind::Prize));
        receipt.payouts.push(Payout::new(y, 10, PayoutKind::Fee));
        assert_eq!(receipt.total(PayoutKind::Prize), 190);
        assert_eq!(receipt.total(PayoutKind::Refund), 0);
        assert_eq!(receipt.paid_to(&y), 10);
        assert_eq!(receipt.match_id.as_deref(), Some("M"));
    }
}
