//! CellSlice for reading cells sequentially.

use std::sync::Arc;

use crate::{Cell, CellBuilder, CellError, CellResult, MsgAddress};

/// Read cursor over a cell's bits and references.
///
/// ```
/// use ton_cell::{CellBuilder, CellSlice};
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// let cell = builder.build().unwrap();
///
/// let mut slice = CellSlice::new(&cell);
/// assert_eq!(slice.load_u32().unwrap(), 0x12345678);
/// assert!(slice.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bit_offset: usize,
    ref_offset: usize,
}

impl<'a> CellSlice<'a> {
    pub fn new(cell: &'a Cell) -> Self {
        CellSlice {
            cell,
            bit_offset: 0,
            ref_offset: 0,
        }
    }

    fn ensure_bits(&self, need: usize) -> CellResult<()> {
        let have = self.bits_left();
        if need > have {
            return Err(CellError::NotEnoughBits { need, have });
        }
        Ok(())
    }

    /// Unread bit at position `i` counted from the cursor.
    pub(crate) fn bit_at(&self, i: usize) -> bool {
        let index = self.bit_offset + i;
        (self.cell.data[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    pub(crate) fn remaining_refs(&self) -> &'a [Arc<Cell>] {
        &self.cell.references[self.ref_offset..]
    }

    pub fn load_bit(&mut self) -> CellResult<bool> {
        self.ensure_bits(1)?;
        let bit = self.bit_at(0);
        self.bit_offset += 1;
        Ok(bit)
    }

    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.ensure_bits(bits)?;
        let mut value = 0u64;
        for i in 0..bits {
            value = (value << 1) | self.bit_at(i) as u64;
        }
        self.bit_offset += bits;
        Ok(value)
    }

    /// Read without advancing the cursor.
    pub fn preload_uint(&self, bits: usize) -> CellResult<u64> {
        self.clone().load_uint(bits)
    }

    pub fn load_int(&mut self, bits: usize) -> CellResult<i64> {
        if bits == 0 || bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        let raw = self.load_uint(bits)?;
        if bits == 64 {
            return Ok(raw as i64);
        }
        // sign-extend
        let shift = 64 - bits;
        Ok(((raw << shift) as i64) >> shift)
    }

    pub fn load_u8(&mut self) -> CellResult<u8> {
        self.load_uint(8).map(|v| v as u8)
    }

    pub fn load_u16(&mut self) -> CellResult<u16> {
        self.load_uint(16).map(|v| v as u16)
    }

    pub fn load_u32(&mut self) -> CellResult<u32> {
        self.load_uint(32).map(|v| v as u32)
    }

    pub fn load_u64(&mut self) -> CellResult<u64> {
        self.load_uint(64)
    }

    pub fn load_i8(&mut self) -> CellResult<i8> {
        self.load_int(8).map(|v| v as i8)
    }

    pub fn load_bytes(&mut self, count: usize) -> CellResult<Vec<u8>> {
        self.ensure_bits(count * 8)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.load_u8()?);
        }
        Ok(out)
    }

    /// Load exactly `N` bytes into an array.
    pub fn load_array<const N: usize>(&mut self) -> CellResult<[u8; N]> {
        let bytes = self.load_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    pub fn load_ref(&mut self) -> CellResult<&'a Arc<Cell>> {
        let reference = self
            .cell
            .references
            .get(self.ref_offset)
            .ok_or(CellError::NotEnoughRefs { need: 1, have: 0 })?;
        self.ref_offset += 1;
        Ok(reference)
    }

    /// `Maybe ^Cell`.
    pub fn load_maybe_ref(&mut self) -> CellResult<Option<&'a Arc<Cell>>> {
        if self.load_bit()? {
            self.load_ref().map(Some)
        } else {
            Ok(None)
        }
    }

    /// `VarUInteger 16`.
    pub fn load_coins(&mut self) -> CellResult<u128> {
        let len = self.load_uint(4)? as usize;
        let mut value = 0u128;
        for byte in self.load_bytes(len)? {
            value = (value << 8) | byte as u128;
        }
        Ok(value)
    }

    pub fn load_address(&mut self) -> CellResult<MsgAddress> {
        match self.load_uint(2)? {
            0b00 => Ok(MsgAddress::Null),
            0b01 => {
                let len = self.load_uint(9)? as u16;
                let mut data = vec![0u8; (len as usize).div_ceil(8)];
                for i in 0..len as usize {
                    if self.load_bit()? {
                        data[i / 8] |= 1 << (7 - i % 8);
                    }
                }
                Ok(MsgAddress::External { len, data })
            }
            0b10 => {
                if self.load_bit()? {
                    // anycast depth:(#<= 30) rewrite_pfx:(bits depth)
                    let depth = self.load_uint(5)? as usize;
                    self.skip_bits(depth)?;
                }
                let workchain = self.load_int(8)? as i32;
                let address = self.load_array::<32>()?;
                Ok(MsgAddress::Internal { workchain, address })
            }
            _ => Err(CellError::InvalidAddress(
                "addr_var is not supported".to_string(),
            )),
        }
    }

    pub fn skip_bits(&mut self, count: usize) -> CellResult<()> {
        self.ensure_bits(count)?;
        self.bit_offset += count;
        Ok(())
    }

    pub fn skip_refs(&mut self, count: usize) -> CellResult<()> {
        let have = self.refs_left();
        if count > have {
            return Err(CellError::NotEnoughRefs { need: count, have });
        }
        self.ref_offset += count;
        Ok(())
    }

    pub fn bits_left(&self) -> usize {
        self.cell.bit_len - self.bit_offset
    }

    pub fn refs_left(&self) -> usize {
        self.cell.references.len() - self.ref_offset
    }

    pub fn is_empty(&self) -> bool {
        self.bits_left() == 0 && self.refs_left() == 0
    }

    /// Copy the unread part into a new cell.
    pub fn to_cell(&self) -> CellResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_slice(self)?;
        builder.build()
    }

    pub fn cell(&self) -> &'a Cell {
        self.cell
    }
}
