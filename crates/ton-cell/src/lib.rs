//! TON Cell and Bag of Cells (BoC) library
//!
//! Every contract message and every piece of contract state on TON is a tree
//! of cells. This crate provides:
//!
//! - **Cell**: immutable node with up to 1023 data bits and 4 references
//! - **CellBuilder**: append-only writer producing a `Cell`
//! - **CellSlice**: sequential reader over a `Cell`
//! - **BagOfCells**: the byte serialization used on the wire
//! - **MsgAddress**: message address (`addr_none`, `addr_extern`, `addr_std`)
//!
//! Only ordinary cells are modelled. Exotic cells (pruned branches, Merkle
//! proofs) never appear in the wallet, minter or main contract messages.
//!
//! # Example
//!
//! ```
//! use ton_cell::{BagOfCells, CellBuilder, CellSlice};
//!
//! let mut builder = CellBuilder::new();
//! builder.store_u32(7).unwrap();
//! builder.store_u8(3).unwrap();
//! let cell = builder.build().unwrap();
//!
//! let bytes = BagOfCells::from_root(cell.clone()).serialize().unwrap();
//! let restored = BagOfCells::deserialize(&bytes).unwrap();
//! assert_eq!(restored.single_root().unwrap().hash(), cell.hash());
//!
//! let mut slice = CellSlice::new(&cell);
//! assert_eq!(slice.load_u32().unwrap(), 7);
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;

mod address;
mod boc;
mod builder;
mod cell;
mod slice;

pub use address::MsgAddress;
pub use boc::BagOfCells;
pub use builder::CellBuilder;
pub use cell::{Cell, HASH_BYTES};
pub use slice::CellSlice;

/// Errors that can occur while building, reading or serializing cells.
#[derive(Debug, Error)]
pub enum CellError {
    /// The cell data exceeds the maximum of 1023 bits.
    #[error("Cell data too long: {0} bits (max 1023)")]
    DataTooLong(usize),

    /// The cell has too many references (max 4).
    #[error("Too many cell references: {0} (max 4)")]
    TooManyRefs(usize),

    /// Invalid BoC format.
    #[error("Invalid BoC format: {0}")]
    InvalidBoc(String),

    /// Cell index out of range inside a BoC.
    #[error("Cell not found: index {0}")]
    CellNotFound(usize),

    /// CRC32-C checksum mismatch.
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// Unexpected end of input.
    #[error("Unexpected end of data")]
    UnexpectedEof,

    /// Not enough bits left in a slice.
    #[error("Not enough bits: need {need}, have {have}")]
    NotEnoughBits { need: usize, have: usize },

    /// Not enough references left in a slice.
    #[error("Not enough refs: need {need}, have {have}")]
    NotEnoughRefs { need: usize, have: usize },

    /// Invalid address.
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Invalid base64 input.
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    /// Expected exactly one root.
    #[error("Expected single root, found {0}")]
    NotSingleRoot(usize),

    /// Exotic cells are not supported.
    #[error("Exotic cells are not supported")]
    ExoticCell,

    /// Integer width outside the supported range.
    #[error("Invalid bit length: {0}")]
    InvalidBitLength(usize),

    /// Value does not fit in the requested width.
    #[error("Value {value} does not fit in {bits} bits")]
    ValueOverflow { value: u128, bits: usize },
}

/// Result type for cell operations.
pub type CellResult<T> = Result<T, CellError>;

/// Maximum number of data bits in a cell.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references in a cell.
pub const MAX_CELL_REFS: usize = 4;

/// Magic prefix of a generic serialized BoC.
pub const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// CRC32-C (Castagnoli), the checksum used by BoC.
fn crc32c(data: &[u8]) -> u32 {
    const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
    CRC32C.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_nested_refs_survive_boc() {
        let mut inner = CellBuilder::new();
        inner.store_u32(0xDEADBEEF).unwrap();
        let inner = Arc::new(inner.build().unwrap());

        let mut outer = CellBuilder::new();
        outer.store_u8(1).unwrap();
        outer.store_ref(inner.clone()).unwrap();
        outer.store_ref(inner).unwrap();
        let outer = outer.build().unwrap();

        let bytes = BagOfCells::from_root(outer.clone()).serialize().unwrap();
        let boc = BagOfCells::deserialize(&bytes).unwrap();
        let root = boc.single_root().unwrap();
        assert_eq!(root.hash(), outer.hash());

        let mut slice = CellSlice::new(root);
        assert_eq!(slice.load_u8().unwrap(), 1);
        let child = slice.load_ref().unwrap();
        assert_eq!(CellSlice::new(child).load_u32().unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_hash_depends_on_refs() {
        let leaf = Arc::new(Cell::empty());
        let mut a = CellBuilder::new();
        a.store_u8(5).unwrap();
        let a = a.build().unwrap();

        let mut b = CellBuilder::new();
        b.store_u8(5).unwrap();
        b.store_ref(leaf).unwrap();
        let b = b.build().unwrap();

        assert_ne!(a.hash(), b.hash());
        assert_eq!(b.depth(), 1);
    }

    #[test]
    fn test_known_empty_cell_hash() {
        // Well-known hash of the empty ordinary cell.
        assert_eq!(
            hex::encode(Cell::empty().hash()),
            "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7"
        );
    }
}
