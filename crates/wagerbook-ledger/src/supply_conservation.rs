//! Supply conservation invariant checker.
//!
//! Lamports enter the ledger only through the faucet; every transaction
//! merely moves them between accounts:
//! ```text
//! Σ(account lamports) == Σ(faucet deposits)
//! ```
//!
//! The per-transaction half of the invariant (staged delta == 0) is
//! enforced by the ledger before commit; this tracker checks the global
//! half on demand.

use wagerbook_types::{Result, WagerError};

/// Tracks lamports deposited since genesis and validates the live total
/// against it.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: u128,
    deposit_count: u64,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a faucet deposit.
    pub fn record_deposit(&mut self, lamports: u64) {
        self.deposits += u128::from(lamports);
        self.deposit_count += 1;
    }

    /// Expected total supply.
    #[must_use]
    pub fn expected_supply(&self) -> u128 {
        self.deposits
    }

    #[must_use]
    pub fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    /// Verify that the actual supply (sum of all account balances) matches
    /// the lamports deposited.
    ///
    /// # Errors
    /// Returns [`WagerError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_supply: u128) -> Result<()> {
        if actual_supply != self.deposits {
            return Err(WagerError::SupplyInvariantViolation {
                reason: format!(
                    "actual supply {actual_supply} != expected {} ({} deposits)",
                    self.deposits, self.deposit_count
                ),
            });
        }
        Ok(())
    }

    /// Reject a staged transaction that would mint or burn lamports.
    ///
    /// # Errors
    /// Returns [`WagerError::SupplyInvariantViolation`] for a non-zero delta.
    pub fn verify_delta(delta: i128) -> Result<()> {
        if delta != 0 {
            return Err(WagerError::SupplyInvariantViolation {
                reason: format!("transaction changes supply by {delta} lamports"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.expected_supply(), 0);
        assert!(sc.verify(0).is_ok());
    }

    #[test]
    fn deposits_increase_expected() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(1_000);
        sc.record_deposit(500);
        assert_eq!(sc.expected_supply(), 1_500);
        assert_eq!(sc.deposit_count(), 2);
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(10);
        let err = sc.verify(11).unwrap_err();
        assert!(matches!(err, WagerError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn deposits_beyond_u64_accumulate() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(u64::MAX);
        sc.record_deposit(u64::MAX);
        assert_eq!(sc.expected_supply(), u128::from(u64::MAX) * 2);
    }

    #[test]
    fn nonzero_delta_rejected() {
        assert!(SupplyConservation::verify_delta(0).is_ok());
        assert!(SupplyConservation::verify_delta(1).is_err());
        assert!(SupplyConservation::verify_delta(-5).is_err());
    }
}
