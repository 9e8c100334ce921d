//! Identifiers used throughout Wagerbook.
//!
//! Identities are raw ed25519 public keys ([`Address`]). Program-owned
//! records that must not be controlled by any key (the escrow registry, the
//! treasury) live at *derived* addresses: SHA-256 digests that are
//! deliberately **not** valid curve points, so no signing key can exist for
//! them. Transactions carry a UUIDv7 [`TxId`].

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{WagerError, constants};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 32-byte ledger address: an ed25519 public key or a derived address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether these bytes decode to an ed25519 point (i.e. a key could own them).
    #[must_use]
    pub fn is_on_curve(&self) -> bool {
        VerifyingKey::from_bytes(&self.0).is_ok()
    }

    /// The identity of the settlement program itself.
    #[must_use]
    pub fn program_id() -> Self {
        let digest = Sha256::digest(constants::PROGRAM_ID_LABEL);
        Self(digest.into())
    }

    /// Derive the address for `seeds` with an explicit `bump`.
    ///
    /// `SHA-256(seed_0 || .. || seed_n || bump || program_id || marker)`.
    ///
    /// # Errors
    /// Returns `InvalidDerivation` if the seeds exceed the limits or the
    /// digest happens to be a valid curve point.
    pub fn create_derived(seeds: &[&[u8]], bump: u8, program_id: &Self) -> crate::Result<Self> {
        if seeds.len() > constants::MAX_SEEDS {
            return Err(WagerError::InvalidDerivation {
                reason: format!("{} seeds exceeds maximum {}", seeds.len(), constants::MAX_SEEDS),
            });
        }
        if let Some(seed) = seeds.iter().find(|s| s.len() > constants::MAX_SEED_LEN) {
            return Err(WagerError::InvalidDerivation {
                reason: format!(
                    "seed of {} bytes exceeds maximum {}",
                    seed.len(),
                    constants::MAX_SEED_LEN
                ),
            });
        }

        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update([bump]);
        hasher.update(program_id.as_bytes());
        hasher.update(constants::DERIVATION_MARKER);
        let candidate = Self(hasher.finalize().into());

        if candidate.is_on_curve() {
            return Err(WagerError::InvalidDerivation {
                reason: format!("bump {bump} yields an on-curve address"),
            });
        }
        Ok(candidate)
    }

    /// Find the canonical derived address: the highest bump that yields an
    /// off-curve digest.
    ///
    /// # Errors
    /// Returns `InvalidDerivation` if no bump in `0..=255` works.
    pub fn find_derived(seeds: &[&[u8]], program_id: &Self) -> crate::Result<(Self, u8)> {
        for bump in (0..=u8::MAX).rev() {
            match Self::create_derived(seeds, bump, program_id) {
                Ok(address) => return Ok((address, bump)),
                Err(WagerError::InvalidDerivation { .. }) => {}
                Err(other) => return Err(other),
            }
        }
        Err(WagerError::InvalidDerivation {
            reason: "no viable bump".to_string(),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

/// Random address for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }
}

// ---------------------------------------------------------------------------
// TxId
// ---------------------------------------------------------------------------

/// Globally unique transaction identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TxId(pub Uuid);

impl TxId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
