//! Reference verifier for authorized external messages.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. envelope long enough to hold a signature
//! 2. signature over the payload hash, against the stored key
//! 3. payload decodes
//! 4. `seqno == stored_seqno`
//! 5. `now <= valid_until`
//!
//! A rejection leaves the account state untouched.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use ton_cell::{Cell, CellBuilder, CellSlice};
use ton_contract::SendMode;
use ton_crypto::PUBLIC_KEY_BYTES;

use crate::{SignedEnvelope, WalletError, WalletResult};

/// Why an envelope was refused. Each reason maps to the exit code the
/// wallet contract throws.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    #[error("seqno does not match the account")]
    SeqnoMismatch,

    #[error("message validity window has passed")]
    Expired,

    #[error("signature does not verify against the account key")]
    SignatureInvalid,

    #[error("envelope or payload is malformed")]
    MalformedPayload,
}

impl Rejection {
    pub const SEQNO_MISMATCH_EXIT: i32 = 33;
    pub const EXPIRED_EXIT: i32 = 34;
    pub const SIGNATURE_INVALID_EXIT: i32 = 35;
    /// Cell underflow.
    pub const MALFORMED_EXIT: i32 = 9;

    pub fn exit_code(self) -> i32 {
        match self {
            Rejection::SeqnoMismatch => Self::SEQNO_MISMATCH_EXIT,
            Rejection::Expired => Self::EXPIRED_EXIT,
            Rejection::SignatureInvalid => Self::SIGNATURE_INVALID_EXIT,
            Rejection::MalformedPayload => Self::MALFORMED_EXIT,
        }
    }

    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            Self::SEQNO_MISMATCH_EXIT => Some(Rejection::SeqnoMismatch),
            Self::EXPIRED_EXIT => Some(Rejection::Expired),
            Self::SIGNATURE_INVALID_EXIT => Some(Rejection::SignatureInvalid),
            Self::MALFORMED_EXIT => Some(Rejection::MalformedPayload),
            _ => None,
        }
    }
}

/// Per-account authorization state, persisted as the wallet data cell
/// `seqno:uint32 public_key:bits256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountAuthState {
    pub seqno: u32,
    pub public_key: [u8; PUBLIC_KEY_BYTES],
}

impl AccountAuthState {
    /// State of a freshly deployed wallet.
    pub fn new(public_key: [u8; PUBLIC_KEY_BYTES]) -> Self {
        AccountAuthState {
            seqno: 0,
            public_key,
        }
    }

    pub fn to_cell(&self) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(self.seqno)?;
        builder.store_bytes(&self.public_key)?;
        Ok(builder.build()?)
    }

    pub fn from_cell(cell: &Cell) -> WalletResult<Self> {
        let mut slice = CellSlice::new(cell);
        let seqno = slice.load_u32()?;
        let public_key = slice.load_array::<PUBLIC_KEY_BYTES>()?;
        if !slice.is_empty() {
            return Err(WalletError::InvalidData(
                "trailing data after public key".to_string(),
            ));
        }
        Ok(AccountAuthState { seqno, public_key })
    }
}

/// An accepted envelope: the state to commit and the message to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub new_state: AccountAuthState,
    pub mode: SendMode,
    pub message: Arc<Cell>,
}

/// Check `envelope` against `state` at time `now`.
pub fn verify(
    state: &AccountAuthState,
    envelope: &Cell,
    now: u32,
) -> Result<Authorization, Rejection> {
    let envelope = SignedEnvelope::from_cell(envelope).inspect_err(|_| {
        trace!(bits = envelope.bit_len(), "envelope too short for a signature");
    })?;

    let hash = envelope.payload_hash();
    if ton_crypto::verify_signature(&state.public_key, &hash, &envelope.signature).is_err() {
        debug!(payload_hash = %hex::encode(hash), "signature rejected");
        return Err(Rejection::SignatureInvalid);
    }

    let payload = envelope.decode_payload()?;

    if payload.seqno != state.seqno {
        debug!(expected = state.seqno, got = payload.seqno, "seqno rejected");
        return Err(Rejection::SeqnoMismatch);
    }

    if now > payload.valid_until {
        debug!(now, valid_until = payload.valid_until, "expired message rejected");
        return Err(Rejection::Expired);
    }

    // A wallet at u32::MAX cannot advance and so can never authorize again.
    let seqno = state.seqno.checked_add(1).ok_or(Rejection::SeqnoMismatch)?;

    trace!(seqno, mode = payload.mode.as_u8(), "envelope authorized");
    Ok(Authorization {
        new_state: AccountAuthState {
            seqno,
            public_key: state.public_key,
        },
        mode: payload.mode,
        message: payload.message,
    })
}
