//! Ed25519 keys for signing external message payloads.
//!
//! Wallet payloads are authorized by signing the 32-byte representation
//! hash of the payload cell, so the signing surface here is hash-oriented.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of an Ed25519 public key.
pub const PUBLIC_KEY_BYTES: usize = 32;

/// Length of an Ed25519 signature.
pub const SIGNATURE_BYTES: usize = 64;

#[derive(Debug, Error)]
pub enum Ed25519Error {
    #[error("Invalid key bytes: {0}")]
    InvalidKey(String),

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("Invalid signature length: {0}")]
    InvalidSignature(usize),
}

pub type Ed25519Result<T> = Result<T, Ed25519Error>;

/// An Ed25519 keypair.
///
/// ```
/// use ton_crypto::Ed25519Keypair;
///
/// let keypair = Ed25519Keypair::generate();
/// let hash = ton_crypto::sha256(b"payload");
/// let signature = keypair.sign_hash(&hash);
/// assert!(ton_crypto::verify_signature(&keypair.public_key, &hash, &signature).is_ok());
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ed25519Keypair {
    seed: [u8; 32],
    #[zeroize(skip)]
    pub public_key: [u8; PUBLIC_KEY_BYTES],
    // `seed` holds the same secret and is wiped on drop.
    #[zeroize(skip)]
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Fresh keypair from the OS random source.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Deterministic keypair from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&seed))
    }

    pub fn from_bytes(bytes: &[u8]) -> Ed25519Result<Self> {
        let seed: [u8; 32] = bytes.try_into().map_err(|_| {
            Ed25519Error::InvalidKey(format!("Expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_seed(seed))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        Self {
            seed: signing_key.to_bytes(),
            public_key: signing_key.verifying_key().to_bytes(),
            signing_key,
        }
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_BYTES] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign a 32-byte cell hash.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> [u8; SIGNATURE_BYTES] {
        self.sign(hash)
    }

    pub fn verify(&self, message: &[u8], signature: &[u8; SIGNATURE_BYTES]) -> Ed25519Result<()> {
        self.signing_key
            .verifying_key()
            .verify(message, &Signature::from_bytes(signature))
            .map_err(|_| Ed25519Error::VerificationFailed)
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }
}

impl std::fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Keypair")
            .field("public_key", &hex::encode(self.public_key))
            .finish_non_exhaustive()
    }
}

/// Verify `signature` over `message` with a bare public key.
pub fn verify_signature(
    public_key: &[u8; PUBLIC_KEY_BYTES],
    message: &[u8],
    signature: &[u8; SIGNATURE_BYTES],
) -> Ed25519Result<()> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| Ed25519Error::InvalidKey(e.to_string()))?;
    verifying_key
        .verify_strict(message, &Signature::from_bytes(signature))
        .map_err(|_| Ed25519Error::VerificationFailed)
}

/// Slice variant of [`verify_signature`] for signatures read out of cells.
pub fn verify_signature_slice(
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Ed25519Result<()> {
    let public_key: &[u8; PUBLIC_KEY_BYTES] = public_key.try_into().map_err(|_| {
        Ed25519Error::InvalidKey(format!(
            "Public key must be 32 bytes, got {}",
            public_key.len()
        ))
    })?;
    let signature: &[u8; SIGNATURE_BYTES] = signature
        .try_into()
        .map_err(|_| Ed25519Error::InvalidSignature(signature.len()))?;
    verify_signature(public_key, message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_hash_and_verify() {
        let keypair = Ed25519Keypair::generate();
        let hash = [7u8; 32];
        let signature = keypair.sign_hash(&hash);
        assert!(keypair.verify(&hash, &signature).is_ok());
        assert!(verify_signature(&keypair.public_key, &hash, &signature).is_ok());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let keypair = Ed25519Keypair::generate();
        let hash = [1u8; 32];
        let mut signature = keypair.sign_hash(&hash);
        signature[10] ^= 0x01;
        assert!(matches!(
            verify_signature(&keypair.public_key, &hash, &signature),
            Err(Ed25519Error::VerificationFailed)
        ));
    }

    #[test]
    fn test_other_key_rejected() {
        let alice = Ed25519Keypair::generate();
        let bob = Ed25519Keypair::generate();
        let hash = [2u8; 32];
        let signature = alice.sign_hash(&hash);
        assert!(verify_signature(&bob.public_key, &hash, &signature).is_err());
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = Ed25519Keypair::from_seed([9u8; 32]);
        let b = Ed25519Keypair::from_bytes(&[9u8; 32]).unwrap();
        assert_eq!(a.public_key, b.public_key);
        assert_eq!(a.sign(b"x"), b.sign(b"x"));
        assert!(Ed25519Keypair::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_slice_lengths_checked() {
        let keypair = Ed25519Keypair::generate();
        let signature = keypair.sign(b"m");
        assert!(verify_signature_slice(&keypair.public_key, b"m", &signature).is_ok());
        assert!(matches!(
            verify_signature_slice(&keypair.public_key, b"m", &signature[..63]),
            Err(Ed25519Error::InvalidSignature(63))
        ));
        assert!(verify_signature_slice(&[0u8; 5], b"m", &signature).is_err());
    }

    #[test]
    fn test_debug_hides_seed() {
        let keypair = Ed25519Keypair::from_seed([0xAA; 32]);
        let printed = format!("{:?}", keypair);
        assert!(!printed.contains(&hex::encode([0xAA; 32])));
    }
}
