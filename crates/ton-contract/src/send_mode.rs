//! Outbound message send modes.

use bitflags::bitflags;

bitflags! {
    /// Flags of the `SENDRAWMSG` mode byte.
    ///
    /// Unknown bits are kept as-is so a mode byte read from a payload
    /// survives a round trip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SendMode: u8 {
        const PAY_GAS_SEPARATELY = 1;
        const IGNORE_ERRORS = 2;
        const DESTROY_ACCOUNT_IF_ZERO = 32;
        const CARRY_ALL_REMAINING_INCOMING_VALUE = 64;
        const CARRY_ALL_BALANCE = 128;
    }
}

impl SendMode {
    pub fn from_u8(mode: u8) -> Self {
        Self::from_bits_retain(mode)
    }

    pub fn as_u8(self) -> u8 {
        self.bits()
    }
}

impl From<u8> for SendMode {
    fn from(mode: u8) -> Self {
        Self::from_u8(mode)
    }
}
