//! # Proof System Capabilities
//!
//! Capability traits for producing, checking and combining state-transition
//! proofs, and `AttestedProofSystem`, a deterministic implementation of all
//! three.
//!
//! ## Statement
//!
//! ```text
//! digest = BLAKE3("rp-statement-v1" || block || range.start || range.end
//!                 || start_root || end_root)
//! proof  = Ed25519(signing_key, digest)
//! ```
//!
//! Merging requires `left.end_root == right.start_root` and adjacent ranges in
//! the same block; the merged statement spans `left.start_root -> right.end_root`.

use crate::errors::{CryptoError, CryptoResult};
use crate::hashing::Blake3Hasher;
use crate::signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use async_trait::async_trait;
use shared_types::{Hash, SequenceRange, StateProof, StateRoot};

const STATEMENT_DOMAIN: &[u8] = b"rp-statement-v1";

/// Key that proofs are verified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationKey(pub [u8; 32]);

/// One applied operation, as seen by the prover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    /// Block of the operation.
    pub block_number: u64,
    /// Sequence of the operation.
    pub sequence: u64,
    /// Root before applying the operation.
    pub start_root: StateRoot,
    /// Root after applying the operation.
    pub end_root: StateRoot,
    /// Digest of the encoded operation.
    pub operation_digest: Hash,
}

/// Produces singleton proofs for applied operations.
#[async_trait]
pub trait StateTransitionProver: Send + Sync {
    /// Prove one transition.
    async fn prove(&self, transition: &StateTransition) -> CryptoResult<StateProof>;
}

/// Checks a proof against a verification key.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// `true` when the proof is valid for `key`.
    async fn verify(&self, proof: &StateProof, key: &VerificationKey) -> bool;
}

/// Combines two consecutive proofs into one.
#[async_trait]
pub trait ProofMerger: Send + Sync {
    /// Merge `left` and `right`; requires `left.end_root == right.start_root`.
    async fn merge(&self, left: &StateProof, right: &StateProof) -> CryptoResult<StateProof>;
}

/// Digest a proof attests to.
pub fn statement_digest(
    block_number: u64,
    range: &SequenceRange,
    start_root: &StateRoot,
    end_root: &StateRoot,
) -> Hash {
    let mut hasher = Blake3Hasher::new();
    hasher
        .update(STATEMENT_DOMAIN)
        .update_u64(block_number)
        .update_u64(range.start())
        .update_u64(range.end())
        .update(start_root)
        .update(end_root);
    hasher.finalize()
}

/// Ed25519-attested proof system.
pub struct AttestedProofSystem {
    keypair: Ed25519KeyPair,
}

impl AttestedProofSystem {
    /// Build from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Ed25519KeyPair::from_seed(seed),
        }
    }

    /// Build with a random key.
    pub fn random() -> Self {
        Self {
            keypair: Ed25519KeyPair::generate(),
        }
    }

    /// Key that this system's proofs verify against.
    pub fn verification_key(&self) -> VerificationKey {
        VerificationKey(*self.keypair.public_key().as_bytes())
    }

    fn attest(
        &self,
        block_number: u64,
        range: SequenceRange,
        start_root: StateRoot,
        end_root: StateRoot,
    ) -> StateProof {
        let digest = statement_digest(block_number, &range, &start_root, &end_root);
        StateProof {
            block_number,
            range,
            start_root,
            end_root,
            proof: self.keypair.sign_digest(&digest).to_vec(),
        }
    }

    fn check(proof: &StateProof, key: &VerificationKey) -> CryptoResult<()> {
        let public_key = Ed25519PublicKey::from_bytes(key.0)?;
        let signature = Ed25519Signature::from_slice(&proof.proof)?;
        let digest = statement_digest(
            proof.block_number,
            &proof.range,
            &proof.start_root,
            &proof.end_root,
        );
        public_key.verify_digest(&digest, &signature)
    }

    fn check_own(&self, proof: &StateProof) -> CryptoResult<()> {
        Self::check(proof, &self.verification_key()).map_err(|_| CryptoError::InvalidProof {
            block_number: proof.block_number,
            range: proof.range.to_string(),
        })
    }
}

#[async_trait]
impl StateTransitionProver for AttestedProofSystem {
    async fn prove(&self, transition: &StateTransition) -> CryptoResult<StateProof> {
        Ok(self.attest(
            transition.block_number,
            SequenceRange::single(transition.sequence),
            transition.start_root,
            transition.end_root,
        ))
    }
}

#[async_trait]
impl ProofVerifier for AttestedProofSystem {
    async fn verify(&self, proof: &StateProof, key: &VerificationKey) -> bool {
        Self::check(proof, key).is_ok()
    }
}

#[async_trait]
impl ProofMerger for AttestedProofSystem {
    async fn merge(&self, left: &StateProof, right: &StateProof) -> CryptoResult<StateProof> {
        self.check_own(left)?;
        self.check_own(right)?;

        if !left.chains_into(right) {
            return Err(CryptoError::StateMismatch {
                left: left.range.to_string(),
                right: right.range.to_string(),
            });
        }

        let range = left
            .range
            .concat(&right.range)
            .map_err(|e| CryptoError::StateMismatch {
                left: left.range.to_string(),
                right: e.to_string(),
            })?;

        Ok(self.attest(left.block_number, range, left.start_root, right.end_root))
    }
}
