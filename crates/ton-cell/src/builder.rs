//! CellBuilder for constructing cells.

use std::sync::Arc;

use crate::{Cell, CellError, CellResult, CellSlice, MsgAddress, MAX_CELL_BITS, MAX_CELL_REFS};

/// Append-only writer for a single cell.
///
/// Every `store_*` method checks the 1023-bit / 4-ref limits and returns
/// `&mut Self` so calls can be chained with `?`.
///
/// ```
/// use ton_cell::CellBuilder;
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(1)?.store_coins(1_000_000_000)?;
/// let cell = builder.build()?;
/// assert_eq!(cell.bit_len(), 32 + 4 + 32);
/// # Ok::<(), ton_cell::CellError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    references: Vec<Arc<Cell>>,
}

impl CellBuilder {
    pub fn new() -> Self {
        CellBuilder {
            data: Vec::with_capacity(128),
            bit_len: 0,
            references: Vec::new(),
        }
    }

    fn ensure_bits(&self, extra: usize) -> CellResult<()> {
        if self.bit_len + extra > MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + extra));
        }
        Ok(())
    }

    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        self.ensure_bits(1)?;
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            let last = self.data.len() - 1;
            self.data[last] |= 1 << (7 - self.bit_len % 8);
        }
        self.bit_len += 1;
        Ok(self)
    }

    pub fn store_bits(&mut self, bits: &[bool]) -> CellResult<&mut Self> {
        self.ensure_bits(bits.len())?;
        for &bit in bits {
            self.store_bit(bit)?;
        }
        Ok(self)
    }

    /// Store the low `bits` bits of `value`, most significant first.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        if bits < 64 && value >> bits != 0 {
            return Err(CellError::ValueOverflow {
                value: value as u128,
                bits,
            });
        }
        self.ensure_bits(bits)?;
        for i in (0..bits).rev() {
            self.store_bit((value >> i) & 1 == 1)?;
        }
        Ok(self)
    }

    /// Store a two's complement signed integer.
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        if bits == 0 || bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        if bits < 64 {
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(CellError::ValueOverflow {
                    value: value.unsigned_abs() as u128,
                    bits,
                });
            }
        }
        let masked = if bits == 64 {
            value as u64
        } else {
            (value as u64) & ((1u64 << bits) - 1)
        };
        self.store_uint(masked, bits)
    }

    pub fn store_u8(&mut self, value: u8) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 8)
    }

    pub fn store_u16(&mut self, value: u16) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 16)
    }

    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 32)
    }

    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.store_uint(value, 64)
    }

    pub fn store_i8(&mut self, value: i8) -> CellResult<&mut Self> {
        self.store_int(value as i64, 8)
    }

    pub fn store_i32(&mut self, value: i32) -> CellResult<&mut Self> {
        self.store_int(value as i64, 32)
    }

    /// Store raw bytes. Byte-aligned writes copy directly.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        self.ensure_bits(bytes.len() * 8)?;
        if self.bit_len % 8 == 0 {
            self.data.extend_from_slice(bytes);
            self.bit_len += bytes.len() * 8;
            return Ok(self);
        }
        for &byte in bytes {
            self.store_u8(byte)?;
        }
        Ok(self)
    }

    /// Store `VarUInteger 16`: 4-bit byte length followed by the value.
    pub fn store_coins(&mut self, amount: u128) -> CellResult<&mut Self> {
        let len = (128 - amount.leading_zeros() as usize).div_ceil(8);
        if len > 15 {
            return Err(CellError::ValueOverflow {
                value: amount,
                bits: 120,
            });
        }
        self.store_uint(len as u64, 4)?;
        let be = amount.to_be_bytes();
        self.store_bytes(&be[16 - len..])
    }

    pub fn store_address(&mut self, addr: &MsgAddress) -> CellResult<&mut Self> {
        match addr {
            MsgAddress::Null => self.store_uint(0b00, 2),
            MsgAddress::External { len, data } => {
                // addr_extern$01 len:(## 9) external_address:(bits len)
                self.store_uint(0b01, 2)?;
                self.store_uint(*len as u64, 9)?;
                for i in 0..*len as usize {
                    let bit = data
                        .get(i / 8)
                        .map(|b| (b >> (7 - i % 8)) & 1 == 1)
                        .unwrap_or(false);
                    self.store_bit(bit)?;
                }
                Ok(self)
            }
            MsgAddress::Internal { workchain, address } => {
                // addr_std$10 anycast:nothing workchain_id:int8 address:bits256
                self.store_uint(0b100, 3)?;
                self.store_int(*workchain as i64, 8)?;
                self.store_bytes(address)
            }
        }
    }

    pub fn store_ref(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        if self.references.len() >= MAX_CELL_REFS {
            return Err(CellError::TooManyRefs(self.references.len() + 1));
        }
        self.references.push(cell);
        Ok(self)
    }

    /// `Maybe ^Cell`: one presence bit, then the reference when present.
    pub fn store_maybe_ref(&mut self, cell: Option<Arc<Cell>>) -> CellResult<&mut Self> {
        match cell {
            Some(cell) => {
                self.store_bit(true)?;
                self.store_ref(cell)
            }
            None => self.store_bit(false),
        }
    }

    /// Append the unread bits and references of a slice.
    pub fn store_slice(&mut self, slice: &CellSlice) -> CellResult<&mut Self> {
        self.ensure_bits(slice.bits_left())?;
        for i in 0..slice.bits_left() {
            self.store_bit(slice.bit_at(i))?;
        }
        for reference in slice.remaining_refs() {
            self.store_ref(reference.clone())?;
        }
        Ok(self)
    }

    /// Append all bits and references of a cell.
    pub fn store_cell(&mut self, cell: &Cell) -> CellResult<&mut Self> {
        self.store_slice(&CellSlice::new(cell))
    }

    pub fn bits_left(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    pub fn refs_left(&self) -> usize {
        MAX_CELL_REFS - self.references.len()
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn ref_count(&self) -> usize {
        self.references.len()
    }

    pub fn build(self) -> CellResult<Cell> {
        Ok(Cell::new(self.data, self.bit_len, self.references))
    }
}
