//! Cryptographic primitives for signed TON wallet messages.
//!
//! - **Ed25519**: keypairs that sign payload cell hashes, and standalone
//!   verification against a stored public key
//! - **SHA256**: digests used to derive deterministic seeds and addresses

pub mod ed25519;
pub mod sha256;

pub use ed25519::{
    Ed25519Error, Ed25519Keypair, Ed25519Result, PUBLIC_KEY_BYTES, SIGNATURE_BYTES,
    verify_signature, verify_signature_slice,
};
pub use sha256::{sha256, sha256_multi};

/// 32 bytes from the thread-local CSPRNG.
pub fn random_bytes_32() -> [u8; 32] {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}
