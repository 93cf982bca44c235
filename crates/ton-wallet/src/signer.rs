//! Signing capability handed to the wallet wrapper.
//!
//! A [`Signer`] turns a payload hash into a 64-byte Ed25519 signature. It
//! is passed explicitly to every send, so tests can swap in doubles that
//! sign with the wrong key or replay a captured signature.

use std::sync::{Mutex, PoisonError};

use ton_crypto::{Ed25519Keypair, SIGNATURE_BYTES};

pub trait Signer {
    fn sign(&self, hash: &[u8; 32]) -> [u8; SIGNATURE_BYTES];
}

impl Signer for Ed25519Keypair {
    fn sign(&self, hash: &[u8; 32]) -> [u8; SIGNATURE_BYTES] {
        self.sign_hash(hash)
    }
}

impl<F> Signer for F
where
    F: Fn(&[u8; 32]) -> [u8; SIGNATURE_BYTES],
{
    fn sign(&self, hash: &[u8; 32]) -> [u8; SIGNATURE_BYTES] {
        self(hash)
    }
}

/// Returns the same signature for every hash.
#[derive(Debug, Clone, Copy)]
pub struct FixedSigner(pub [u8; SIGNATURE_BYTES]);

impl Signer for FixedSigner {
    fn sign(&self, _hash: &[u8; 32]) -> [u8; SIGNATURE_BYTES] {
        self.0
    }
}

/// Delegates to `inner` and keeps the last signature it produced.
#[derive(Debug)]
pub struct RecordingSigner<S> {
    inner: S,
    last: Mutex<Option<[u8; SIGNATURE_BYTES]>>,
}

impl<S: Signer> RecordingSigner<S> {
    pub fn new(inner: S) -> Self {
        RecordingSigner {
            inner,
            last: Mutex::new(None),
        }
    }

    pub fn last_signature(&self) -> Option<[u8; SIGNATURE_BYTES]> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A signer that replays the last recorded signature.
    pub fn replay(&self) -> Option<FixedSigner> {
        self.last_signature().map(FixedSigner)
    }
}

impl<S: Signer> Signer for RecordingSigner<S> {
    fn sign(&self, hash: &[u8; 32]) -> [u8; SIGNATURE_BYTES] {
        let signature = self.inner.sign(hash);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(signature);
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_signer_verifies() {
        let keypair = Ed25519Keypair::generate();
        let hash = [5u8; 32];
        let signature = Signer::sign(&keypair, &hash);
        assert!(ton_crypto::verify_signature(&keypair.public_key, &hash, &signature).is_ok());
    }

    #[test]
    fn test_closure_signer() {
        let keypair = Ed25519Keypair::generate();
        let signer = |hash: &[u8; 32]| keypair.sign_hash(hash);
        assert_eq!(signer.sign(&[1; 32]), keypair.sign_hash(&[1; 32]));
    }

    #[test]
    fn test_recording_and_replay() {
        let recording = RecordingSigner::new(Ed25519Keypair::generate());
        assert!(recording.replay().is_none());

        let first = recording.sign(&[1; 32]);
        assert_eq!(recording.last_signature(), Some(first));

        let replay = recording.replay().unwrap();
        assert_eq!(replay.sign(&[2; 32]), first);
    }
}
