//! Ordinary TON cell.
//!
//! The representation hash is computed once at construction:
//! `sha256(d1 || d2 || data_with_tag || depth(ref_i)... || hash(ref_i)...)`.

use std::sync::Arc;

use crate::{sha256, CellSlice, MAX_CELL_BITS, MAX_CELL_REFS};

/// Hash size in bytes (SHA256).
pub const HASH_BYTES: usize = 32;

/// An immutable ordinary cell.
///
/// Two cells are equal when their representation hashes are equal, which
/// covers the whole subtree.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) data: Vec<u8>,
    pub(crate) bit_len: usize,
    pub(crate) references: Vec<Arc<Cell>>,
    hash: [u8; HASH_BYTES],
    depth: u16,
}

impl Cell {
    pub(crate) fn new(data: Vec<u8>, bit_len: usize, references: Vec<Arc<Cell>>) -> Self {
        debug_assert!(bit_len <= MAX_CELL_BITS);
        debug_assert!(references.len() <= MAX_CELL_REFS);

        let depth = references
            .iter()
            .map(|r| r.depth.saturating_add(1))
            .max()
            .unwrap_or(0);

        let mut cell = Cell {
            data,
            bit_len,
            references,
            hash: [0u8; HASH_BYTES],
            depth,
        };
        cell.hash = sha256(&cell.representation());
        cell
    }

    /// The empty cell (no bits, no refs).
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, Vec::new())
    }

    /// Bytes that are hashed to produce the cell hash.
    pub fn representation(&self) -> Vec<u8> {
        let mut repr = Vec::with_capacity(2 + self.data.len() + self.references.len() * 34);
        let (d1, d2) = self.descriptors();
        repr.push(d1);
        repr.push(d2);
        repr.extend_from_slice(&self.data_with_completion_tag());
        for reference in &self.references {
            repr.extend_from_slice(&reference.depth.to_be_bytes());
        }
        for reference in &self.references {
            repr.extend_from_slice(&reference.hash);
        }
        repr
    }

    /// Descriptor bytes `(d1, d2)`.
    ///
    /// `d1` is the reference count (ordinary cells, level 0);
    /// `d2 = ceil(bits / 8) + floor(bits / 8)`.
    pub fn descriptors(&self) -> (u8, u8) {
        let d1 = self.references.len() as u8;
        let d2 = (self.bit_len.div_ceil(8) + self.bit_len / 8) as u8;
        (d1, d2)
    }

    /// Data padded with the completion tag: when the bit length is not a
    /// multiple of 8 a single `1` bit follows the data.
    pub fn data_with_completion_tag(&self) -> Vec<u8> {
        let mut out = self.data[..self.bit_len.div_ceil(8)].to_vec();
        let rem = self.bit_len % 8;
        if rem != 0
            && let Some(last) = out.last_mut()
        {
            *last |= 1 << (7 - rem);
        }
        out
    }

    /// Representation hash.
    pub fn hash(&self) -> [u8; HASH_BYTES] {
        self.hash
    }

    /// 0 for a leaf, otherwise 1 + max depth of the references.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Raw data bytes (unused trailing bits are zero).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn references(&self) -> &[Arc<Cell>] {
        &self.references
    }

    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.references.get(index)
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// True when the cell holds neither bits nor references.
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0 && self.references.is_empty()
    }

    /// Start reading this cell from the beginning.
    pub fn as_slice(&self) -> CellSlice<'_> {
        CellSlice::new(self)
    }

    /// Bit at `index`, or `None` when out of range.
    pub fn get_bit(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len {
            return None;
        }
        Some((self.data[index / 8] >> (7 - index % 8)) & 1 == 1)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}
