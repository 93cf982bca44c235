//! The unsigned part of an authorized external message.
//!
//! ```text
//! payload$_ seqno:uint32 valid_until:uint32 mode:uint8 message:^Cell
//! ```
//!
//! The representation hash of this cell is what the owner signs.

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellSlice, HASH_BYTES};
use ton_contract::{InternalMessage, SendMode};

use crate::{WalletError, WalletResult};

/// Default validity window, in seconds, for freshly composed payloads.
pub const DEFAULT_VALIDITY_SECS: u32 = 60;

/// `now + DEFAULT_VALIDITY_SECS`.
pub fn default_valid_until(now: u32) -> WalletResult<u32> {
    now.checked_add(DEFAULT_VALIDITY_SECS)
        .ok_or(WalletError::ValidUntilOverflow {
            now,
            window: DEFAULT_VALIDITY_SECS,
        })
}

/// Sequence number, deadline, send mode and the message to dispatch.
///
/// The composer does not check `seqno` against the account; the chain
/// does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedPayload {
    pub seqno: u32,
    pub valid_until: u32,
    pub mode: SendMode,
    pub message: Arc<Cell>,
}

impl UnsignedPayload {
    pub fn new(seqno: u32, valid_until: u32, mode: SendMode, message: Arc<Cell>) -> Self {
        UnsignedPayload {
            seqno,
            valid_until,
            mode,
            message,
        }
    }

    /// Compose a payload carrying `message`.
    pub fn compose(
        seqno: u32,
        valid_until: u32,
        mode: SendMode,
        message: &InternalMessage,
    ) -> WalletResult<Self> {
        Ok(Self::new(
            seqno,
            valid_until,
            mode,
            Arc::new(message.to_cell()?),
        ))
    }

    pub fn to_cell(&self) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(self.seqno)?;
        builder.store_u32(self.valid_until)?;
        builder.store_u8(self.mode.as_u8())?;
        builder.store_ref(self.message.clone())?;
        Ok(builder.build()?)
    }

    /// Hash to be signed.
    pub fn hash(&self) -> WalletResult<[u8; HASH_BYTES]> {
        Ok(self.to_cell()?.hash())
    }

    /// Decode a payload cell. Trailing bits or references are an error.
    pub fn from_cell(cell: &Cell) -> WalletResult<Self> {
        let mut slice = CellSlice::new(cell);
        let seqno = slice.load_u32()?;
        let valid_until = slice.load_u32()?;
        let mode = SendMode::from_u8(slice.load_u8()?);
        let message = slice.load_ref()?.clone();
        if !slice.is_empty() {
            return Err(WalletError::InvalidData(format!(
                "{} bits and {} refs after payload",
                slice.bits_left(),
                slice.refs_left()
            )));
        }
        Ok(Self::new(seqno, valid_until, mode, message))
    }

    /// The embedded message decoded as an internal message.
    pub fn internal_message(&self) -> WalletResult<InternalMessage> {
        Ok(InternalMessage::from_cell(&self.message)?)
    }
}
