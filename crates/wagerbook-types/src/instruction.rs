//! Instructions accepted by the settlement program.
//!
//! An [`Instruction`] is the payload of a signed transaction. Its
//! [`OperationKind`] drives the authorization / pause gate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Address;

/// One operation against the settlement program.
///
/// Match-scoped instructions name both the record's address and the
/// `match_id` the caller believes lives there; a mismatch is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Create the escrow registry. The signer becomes the authority.
    Initialize { bump: u8 },
    /// Create a match record at a fresh, signing key.
    CreateMatch {
        match_account: Address,
        match_id: String,
        competitor_a: String,
        competitor_b: String,
    },
    PlaceBet {
        match_account: Address,
        match_id: String,
        competitor: String,
        amount: u64,
    },
    AdvanceToBattle {
        match_account: Address,
        match_id: String,
    },
    EndMatch {
        match_account: Address,
        match_id: String,
        winner: String,
    },
    CancelMatch {
        match_account: Address,
        match_id: String,
    },
    /// Pay winners. An empty batch means every unclaimed winning bet.
    ClaimPrize {
        match_account: Address,
        match_id: String,
        batch: Vec<Address>,
    },
    /// Refund bettors. An empty batch means every unclaimed bet.
    ClaimRefund {
        match_account: Address,
        match_id: String,
        batch: Vec<Address>,
    },
    ReclaimPrize {
        match_account: Address,
        match_id: String,
        bettor: Address,
    },
    EmergencyCancel {
        match_account: Address,
        match_id: String,
    },
    CloseMatch {
        match_account: Address,
        match_id: String,
    },
    SetPause { paused: bool },
    /// Move escrow out of a program account (the registry or a match
    /// record) without going through match logic.
    WithdrawFromEscrow {
        source: Address,
        recipient: Address,
        amount: u64,
    },
    TransferAuthority { new_authority: Address },
}

impl Instruction {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Initialize { .. } => OperationKind::Initialize,
            Self::CreateMatch { .. } => OperationKind::CreateMatch,
            Self::PlaceBet { .. } => OperationKind::PlaceBet,
            Self::AdvanceToBattle { .. } => OperationKind::AdvanceToBattle,
            Self::EndMatch { .. } => OperationKind::EndMatch,
            Self::CancelMatch { .. } => OperationKind::CancelMatch,
            Self::ClaimPrize { .. } => OperationKind::ClaimPrize,
            Self::ClaimRefund { .. } => OperationKind::ClaimRefund,
            Self::ReclaimPrize { .. } => OperationKind::ReclaimPrize,
            Self::EmergencyCancel { .. } => OperationKind::EmergencyCancel,
            Self::CloseMatch { .. } => OperationKind::CloseMatch,
            Self::SetPause { .. } => OperationKind::SetPause,
            Self::WithdrawFromEscrow { .. } => OperationKind::WithdrawFromEscrow,
            Self::TransferAuthority { .. } => OperationKind::TransferAuthority,
        }
    }

    /// The match record this instruction targets, if any.
    #[must_use]
    pub fn match_account(&self) -> Option<Address> {
        match self {
            Self::CreateMatch { match_account, .. }
            | Self::PlaceBet { match_account, .. }
            | Self::AdvanceToBattle { match_account, .. }
            | Self::EndMatch { match_account, .. }
            | Self::CancelMatch { match_account, .. }
            | Self::ClaimPrize { match_account, .. }
            | Self::ClaimRefund { match_account, .. }
            | Self::ReclaimPrize { match_account, .. }
            | Self::EmergencyCancel { match_account, .. }
            | Self::CloseMatch { match_account, .. } => Some(*match_account),
            Self::Initialize { .. }
            | Self::SetPause { .. }
            | Self::WithdrawFromEscrow { .. }
            | Self::TransferAuthority { .. } => None,
        }
    }
}

/// The kind of operation, independent of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Initialize,
    CreateMatch,
    PlaceBet,
    AdvanceToBattle,
    EndMatch,
    CancelMatch,
    ClaimPrize,
    ClaimRefund,
    ReclaimPrize,
    EmergencyCancel,
    CloseMatch,
    SetPause,
    WithdrawFromEscrow,
    TransferAuthority,
}

impl OperationKind {
    /// Rejected while the registry is paused.
    #[must_use]
    pub fn is_pause_gated(self) -> bool {
        matches!(
            self,
            Self::CreateMatch
                | Self::PlaceBet
                | Self::AdvanceToBattle
                | Self::EndMatch
                | Self::CancelMatch
                | Self::ClaimPrize
                | Self::ClaimRefund
                | Self::ReclaimPrize
        )
    }

    /// Restricted to the registry authority.
    #[must_use]
    pub fn is_privileged(self) -> bool {
        matches!(
            self,
            Self::AdvanceToBattle
                | Self::EndMatch
                | Self::CancelMatch
                | Self::ReclaimPrize
                | Self::EmergencyCancel
                | Self::CloseMatch
                | Self::SetPause
                | Self::WithdrawFromEscrow
                | Self::TransferAuthority
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialize => "INITIALIZE",
            Self::CreateMatch => "CREATE_MATCH",
            Self::PlaceBet => "PLACE_BET",
            Self::AdvanceToBattle => "ADVANCE_TO_BATTLE",
            Self::EndMatch => "END_MATCH",
            Self::CancelMatch => "CANCEL_MATCH",
            Self::ClaimPrize => "CLAIM_PRIZE",
            Self::ClaimRefund => "CLAIM_REFUND",
            Self::ReclaimPrize => "RECLAIM_PRIZE",
            Self::EmergencyCancel => "EMERGENCY_CANCEL",
            Self::CloseMatch => "CLOSE_MATCH",
            Self::SetPause => "SET_PAUSE",
            Self::WithdrawFromEscrow => "WITHDRAW_FROM_ESCROW",
            Self::TransferAuthority => "TRANSFER_AUTHORITY",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_cancel_bypasses_pause_but_not_authority() {
        assert!(!OperationKind::EmergencyCancel.is_pause_gated());
        assert!(OperationKind::EmergencyCancel.is_privileged());
    }

    #[test]
    fn claims_are_open_to_any_caller() {
        assert!(!OperationKind::ClaimPrize.is_privileged());
        assert!(!OperationKind::ClaimRefund.is_privileged());
        assert!(OperationKind::ClaimPrize.is_pause_gated());
        assert!(OperationKind::ClaimRefund.is_pause_gated());
    }

    #[test]
    fn pause_toggle_is_never_pause_gated() {
        assert!(!OperationKind::SetPause.is_pause_gated());
        assert!(OperationKind::SetPause.is_privileged());
    }

    #[test]
    fn instruction_kind_and_target() {
        let account = Address([3u8; 32]);
        let ix = Instruction::ClaimRefund {
            match_account: account,
            match_id: "M".into(),
            batch: vec![],
        };
        assert_eq!(ix.kind(), OperationKind::ClaimRefund);
        assert_eq!(ix.match_account(), Some(account));
        assert_eq!(Instruction::SetPause { paused: true }.match_account(), None);
        assert_eq!(format!("{}", ix.kind()), "CLAIM_REFUND");
    }
}
