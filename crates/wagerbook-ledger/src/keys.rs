//! Ed25519 keypairs and signature verification.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use wagerbook_types::{Address, Result, WagerError};

/// A signing identity. Its [`Address`] is the raw public key.
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a keypair from its 32-byte secret seed.
    #[must_use]
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(secret),
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_pubkey(self.signing.verifying_key().to_bytes())
    }

    /// Sign `message`, returning the 64-byte signature.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing.sign(message).to_bytes().to_vec()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Verify that `signature` over `message` was produced by `signer`'s key.
///
/// # Errors
/// Returns `InvalidSignature` if the address is not a curve point, the
/// signature is malformed, or verification fails.
pub fn verify(signer: &Address, message: &[u8], signature: &[u8]) -> Result<()> {
    let key = VerifyingKey::from_bytes(signer.as_bytes())
        .map_err(|_| WagerError::InvalidSignature(*signer))?;
    let signature =
        Signature::from_slice(signature).map_err(|_| WagerError::InvalidSignature(*signer))?;
    key.verify(message, &signature)
        .map_err(|_| WagerError::InvalidSignature(*signer))
}
