//! Signed envelope: `signature:bits512` followed by the payload's own bits
//! and references, with no other framing.

use ton_cell::{Cell, CellBuilder, CellSlice, HASH_BYTES};
use ton_crypto::SIGNATURE_BYTES;

use crate::verifier::Rejection;
use crate::{Signer, UnsignedPayload, WalletResult};

const SIGNATURE_BITS: usize = SIGNATURE_BYTES * 8;

/// A signature and the payload cell it was made over.
///
/// The payload is carried verbatim; it is only decoded once the signature
/// has been checked against its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub signature: [u8; SIGNATURE_BYTES],
    pub payload: Cell,
}

impl SignedEnvelope {
    /// Sign `payload` and wrap it.
    pub fn sign(payload: &UnsignedPayload, signer: &impl Signer) -> WalletResult<Self> {
        let payload = payload.to_cell()?;
        let signature = signer.sign(&payload.hash());
        Ok(SignedEnvelope { signature, payload })
    }

    pub fn payload_hash(&self) -> [u8; HASH_BYTES] {
        self.payload.hash()
    }

    pub fn to_cell(&self) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_bytes(&self.signature)?;
        builder.store_cell(&self.payload)?;
        Ok(builder.build()?)
    }

    /// Split a received body into signature and payload cell.
    pub fn from_cell(cell: &Cell) -> Result<Self, Rejection> {
        if cell.bit_len() < SIGNATURE_BITS {
            return Err(Rejection::MalformedPayload);
        }
        let mut slice = CellSlice::new(cell);
        let signature = slice
            .load_array::<SIGNATURE_BYTES>()
            .map_err(|_| Rejection::MalformedPayload)?;
        let payload = slice.to_cell().map_err(|_| Rejection::MalformedPayload)?;
        Ok(SignedEnvelope { signature, payload })
    }

    pub fn decode_payload(&self) -> Result<UnsignedPayload, Rejection> {
        UnsignedPayload::from_cell(&self.payload).map_err(|_| Rejection::MalformedPayload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ton_contract::SendMode;
    use ton_crypto::Ed25519Keypair;

    fn payload() -> UnsignedPayload {
        UnsignedPayload::new(7, 1_000, SendMode::PAY_GAS_SEPARATELY, Arc::new(Cell::empty()))
    }

    #[test]
    fn test_wire_layout() {
        let keypair = Ed25519Keypair::generate();
        let envelope = SignedEnvelope::sign(&payload(), &keypair).unwrap();
        let cell = envelope.to_cell().unwrap();
        assert_eq!(cell.bit_len(), 512 + 72);
        assert_eq!(cell.reference_count(), 1);
        assert_eq!(&cell.data()[..64], &envelope.signature);
        assert_eq!(&cell.data()[64..68], &7u32.to_be_bytes());
    }

    #[test]
    fn test_parse_recovers_payload_hash() {
        let keypair = Ed25519Keypair::generate();
        let envelope = SignedEnvelope::sign(&payload(), &keypair).unwrap();
        let parsed = SignedEnvelope::from_cell(&envelope.to_cell().unwrap()).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(parsed.payload_hash(), payload().hash().unwrap());
        assert_eq!(parsed.decode_payload().unwrap(), payload());
    }

    #[test]
    fn test_short_envelope_is_malformed() {
        let mut builder = CellBuilder::new();
        builder.store_bytes(&[0u8; 63]).unwrap();
        assert_eq!(
            SignedEnvelope::from_cell(&builder.build().unwrap()),
            Err(Rejection::MalformedPayload)
        );
    }
}
