//! Authorization and pause gate for every mutating operation.
//!
//! ## Design Principles
//!
//! - **Pure**: a decision depends only on (registry, caller, operation)
//! - **Pause first**: a paused registry rejects gated operations even for
//!   the authority
//! - **Fail-closed**: a denial aborts the transaction before any write

use std::fmt;

use wagerbook_types::{Address, EscrowRegistry, OperationKind, Result, WagerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Paused,
    Unauthorized,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paused => write!(f, "PAUSED"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Denied(DenyReason),
}

impl GateDecision {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }
}

/// Decide whether `caller` may perform `operation` given the registry state.
#[must_use]
pub fn evaluate(registry: &EscrowRegistry, caller: &Address, operation: OperationKind) -> GateDecision {
    if operation.is_pause_gated() && registry.paused {
        return GateDecision::Denied(DenyReason::Paused);
    }
    if operation.is_privileged() && !registry.is_authority(caller) {
        return GateDecision::Denied(DenyReason::Unauthorized);
    }
    GateDecision::Allowed
}

/// [`evaluate`], mapped onto the error taxonomy.
///
/// # Errors
/// Returns `Paused` or `Unauthorized`.
pub fn enforce(registry: &EscrowRegistry, caller: &Address, operation: OperationKind) -> Result<()> {
    match evaluate(registry, caller, operation) {
        GateDecision::Allowed => Ok(()),
        GateDecision::Denied(reason) => {
            tracing::warn!(%caller, op = %operation, %reason, "Gate denied operation");
            Err(match reason {
                DenyReason::Paused => WagerError::Paused,
                DenyReason::Unauthorized => WagerError::Unauthorized { caller: *caller },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OPS: [OperationKind; 14] = [
        OperationKind::Initialize,
        OperationKind::CreateMatch,
        OperationKind::PlaceBet,
        OperationKind::AdvanceToBattle,
        OperationKind::EndMatch,
        OperationKind::CancelMatch,
        OperationKind::ClaimPrize,
        OperationKind::ClaimRefund,
        OperationKind::ReclaimPrize,
        OperationKind::EmergencyCancel,
        OperationKind::CloseMatch,
        OperationKind::SetPause,
        OperationKind::WithdrawFromEscrow,
        OperationKind::TransferAuthority,
    ];

    fn registry(paused: bool) -> (EscrowRegistry, Address) {
        let authority = Address([1u8; 32]);
        let mut reg = EscrowRegistry::new(authority, 255);
        reg.paused = paused;
        (reg, authority)
    }

    #[test]
    fn authority_allowed_everything_when_unpaused() {
        let (reg, authority) = registry(false);
        for op in ALL_OPS {
            assert!(evaluate(&reg, &authority, op).is_allowed(), "{op}");
        }
    }

    #[test]
    fn stranger_only_gets_open_operations() {
        let (reg, _) = registry(false);
        let stranger = Address([2u8; 32]);
        let allowed: Vec<OperationKind> = ALL_OPS
            .into_iter()
            .filter(|op| evaluate(&reg, &stranger, *op).is_allowed())
            .collect();
        assert_eq!(
            allowed,
            vec![
                OperationKind::Initialize,
                OperationKind::CreateMatch,
                OperationKind::PlaceBet,
                OperationKind::ClaimPrize,
                OperationKind::ClaimRefund,
            ]
        );
    }

    #[test]
    fn pause_checked_before_authority() {
        let (reg, _) = registry(true);
        let stranger = Address([2u8; 32]);
        assert_eq!(
            evaluate(&reg, &stranger, OperationKind::EndMatch),
            GateDecision::Denied(DenyReason::Paused)
        );
        assert_eq!(
            evaluate(&reg, &stranger, OperationKind::EmergencyCancel),
            GateDecision::Denied(DenyReason::Unauthorized)
        );
    }

    #[test]
    fn paused_registry_still_allows_recovery_paths() {
        let (reg, authority) = registry(true);
        for op in [
            OperationKind::EmergencyCancel,
            OperationKind::CloseMatch,
            OperationKind::SetPause,
            OperationKind::WithdrawFromEscrow,
            OperationKind::TransferAuthority,
        ] {
            assert!(evaluate(&reg, &authority, op).is_allowed(), "{op}");
        }
        assert_eq!(
            evaluate(&reg, &authority, OperationKind::PlaceBet),
            GateDecision::Denied(DenyReason::Paused)
        );
    }

    #[test]
    fn enforce_maps_errors() {
        let (reg, _) = registry(true);
        let stranger = Address([2u8; 32]);
        assert!(matches!(
            enforce(&reg, &stranger, OperationKind::ClaimPrize),
            Err(WagerError::Paused)
        ));
        assert!(matches!(
            enforce(&reg, &stranger, OperationKind::SetPause),
            Err(WagerError::Unauthorized { caller }) if caller == stranger
        ));
    }
}
