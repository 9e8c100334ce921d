//! Signed transactions.

use serde::{Deserialize, Serialize};
use wagerbook_types::{Address, Instruction, Result, TxId, WagerError};

use crate::keys::{self, Keypair};

/// One signer's signature over the transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub signer: Address,
    pub signature: Vec<u8>,
}

/// An instruction plus the signatures authorizing it.
///
/// The first signature's address is the invoking identity (and fee payer
/// for any storage the instruction allocates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub instruction: Instruction,
    pub signatures: Vec<TxSignature>,
}

impl Transaction {
    /// Build and sign a transaction. `signers[0]` becomes the caller.
    ///
    /// # Errors
    /// Returns `Serialization` if the instruction cannot be encoded.
    pub fn new(instruction: Instruction, signers: &[&Keypair]) -> Result<Self> {
        let id = TxId::new();
        let payload = Self::signing_payload(&id, &instruction)?;
        let signatures = signers
            .iter()
            .map(|kp| TxSignature {
                signer: kp.address(),
                signature: kp.sign(&payload),
            })
            .collect();
        Ok(Self {
            id,
            instruction,
            signatures,
        })
    }

    /// Canonical signing payload.
    ///
    /// Format: `"wagerbook:tx:v1:" || tx_id(16) || json(instruction)`
    pub fn signing_payload(id: &TxId, instruction: &Instruction) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(128);
        payload.extend_from_slice(b"wagerbook:tx:v1:");
        payload.extend_from_slice(id.0.as_bytes());
        payload.extend_from_slice(&serde_json::to_vec(instruction)?);
        Ok(payload)
    }

    /// Verify every signature and return the distinct signers in order.
    ///
    /// # Errors
    /// - `NoSigners` if the transaction is unsigned
    /// - `InvalidSignature` if any signature fails
    pub fn verify(&self) -> Result<Vec<Address>> {
        if self.signatures.is_empty() {
            return Err(WagerError::NoSigners);
        }
        let payload = Self::signing_payload(&self.id, &self.instruction)?;
        let mut signers = Vec::with_capacity(self.signatures.len());
        for sig in &self.signatures {
            keys::verify(&sig.signer, &payload, &sig.signature)?;
            if !signers.contains(&sig.signer) {
                signers.push(sig.signer);
            }
        }
        Ok(signers)
    }
}
