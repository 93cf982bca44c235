//! Authorized wallet: signed external messages with replay protection
//!
//! An owner authorizes one outbound internal message at a time by signing
//! a payload of `seqno`, a `valid_until` deadline, a send mode and the
//! message itself. The wallet accepts it only if the signature matches its
//! stored key, the seqno equals its stored seqno, and the deadline has not
//! passed; it then bumps the seqno and dispatches the message.
//!
//! - [`UnsignedPayload`]: the composer and payload codec
//! - [`Signer`]: signing capability passed to every send
//! - [`SignedEnvelope`]: `signature || payload` wire form
//! - [`verify`]: reference verifier over an explicit [`AccountAuthState`]
//! - [`AuthorizedWallet`]: contract wrapper (deploy, send, getters)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ton_cell::{Cell, MsgAddress};
//! use ton_contract::{InternalMessage, SendMode};
//! use ton_crypto::Ed25519Keypair;
//! use ton_wallet::{AccountAuthState, SignedEnvelope, UnsignedPayload, verify};
//!
//! let keypair = Ed25519Keypair::generate();
//! let state = AccountAuthState::new(keypair.public_key);
//!
//! let msg = InternalMessage::new(MsgAddress::internal(0, [7; 32]), 1_000_000_000);
//! let payload = UnsignedPayload::compose(0, 1_060, SendMode::PAY_GAS_SEPARATELY, &msg).unwrap();
//! let envelope = SignedEnvelope::sign(&payload, &keypair).unwrap().to_cell().unwrap();
//!
//! let auth = verify(&state, &envelope, 1_000).unwrap();
//! assert_eq!(auth.new_state.seqno, 1);
//! assert!(verify(&auth.new_state, &envelope, 1_000).is_err());
//! ```

pub mod envelope;
pub mod error;
pub mod payload;
pub mod signer;
pub mod verifier;
pub mod wallet;

pub use envelope::SignedEnvelope;
pub use error::{WalletError, WalletResult};
pub use payload::{DEFAULT_VALIDITY_SECS, UnsignedPayload, default_valid_until};
pub use signer::{FixedSigner, RecordingSigner, Signer};
pub use verifier::{AccountAuthState, Authorization, Rejection, verify};
pub use wallet::{AuthorizedWallet, SendMsgArgs, WalletConfig};
