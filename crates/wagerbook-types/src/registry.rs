//! The singleton escrow registry ("house").

use serde::{Deserialize, Serialize};

use crate::{Address, constants};

/// Singleton record holding the settlement authority and the global pause
/// flag. Lives at the address derived from [`constants::REGISTRY_SEED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRegistry {
    /// Identity permitted to perform privileged operations.
    pub authority: Address,
    /// When true, fund-moving and match-creating operations are rejected.
    pub paused: bool,
    /// Nonce proving the registry address was derived.
    pub derivation_bump: u8,
}

impl EscrowRegistry {
    /// Serialized size: discriminator + authority + paused + bump.
    pub const SPACE: usize = constants::DISCRIMINATOR_LEN + 32 + 1 + 1;

    #[must_use]
    pub fn new(authority: Address, derivation_bump: u8) -> Self {
        Self {
            authority,
            paused: false,
            derivation_bump,
        }
    }

    #[must_use]
    pub fn is_authority(&self, caller: &Address) -> bool {
        self.authority == *caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_is_unpaused() {
        let authority = Address([1u8; 32]);
        let reg = EscrowRegistry::new(authority, 254);
        assert!(!reg.paused);
        assert!(reg.is_authority(&authority));
        assert!(!reg.is_authority(&Address([2u8; 32])));
    }
}
