//! Bag of Cells (BoC) serialization.
//!
//! Layout of the generic format (`0xb5ee9c72`):
//!
//! ```text
//! magic:u32 flags:u8 off_bytes:u8
//! cells:size roots:size absent:size tot_cells_size:off_bytes
//! root_list:[size; roots] [index] cell_data [crc32c:u32 LE]
//! ```
//!
//! Cells are written root first; every reference points to a higher index.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{BOC_GENERIC_MAGIC, Cell, CellError, CellResult, HASH_BYTES, crc32c};

const FLAG_HAS_INDEX: u8 = 0x80;
const FLAG_HAS_CRC: u8 = 0x40;
const FLAG_SIZE_MASK: u8 = 0x07;

/// A serialized collection of cell trees with shared subtrees stored once.
#[derive(Debug, Clone)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
}

impl BagOfCells {
    pub fn new(roots: Vec<Arc<Cell>>) -> Self {
        BagOfCells { roots }
    }

    pub fn from_root(root: Cell) -> Self {
        BagOfCells {
            roots: vec![Arc::new(root)],
        }
    }

    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    pub fn single_root(&self) -> CellResult<&Arc<Cell>> {
        match self.roots.as_slice() {
            [root] => Ok(root),
            roots => Err(CellError::NotSingleRoot(roots.len())),
        }
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Serialize with a CRC32-C trailer and no index.
    pub fn serialize(&self) -> CellResult<Vec<u8>> {
        self.serialize_with_options(true, false)
    }

    pub fn serialize_with_options(&self, with_crc: bool, with_index: bool) -> CellResult<Vec<u8>> {
        if self.roots.is_empty() {
            return Err(CellError::InvalidBoc("No root cells".to_string()));
        }

        let order = self.topological_order();
        let index_of: HashMap<[u8; HASH_BYTES], usize> = order
            .iter()
            .enumerate()
            .map(|(i, cell)| (cell.hash(), i))
            .collect();

        let size_bytes = bytes_needed(order.len());
        let mut cell_data = Vec::with_capacity(order.len());
        for cell in &order {
            cell_data.push(encode_cell(cell, &index_of, size_bytes)?);
        }
        let total_size: usize = cell_data.iter().map(Vec::len).sum();
        let off_bytes = bytes_needed(total_size);

        let mut out = Vec::with_capacity(total_size + 32);
        out.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());

        let mut flags = size_bytes as u8;
        if with_index {
            flags |= FLAG_HAS_INDEX;
        }
        if with_crc {
            flags |= FLAG_HAS_CRC;
        }
        out.push(flags);
        out.push(off_bytes as u8);

        write_uint(&mut out, order.len() as u64, size_bytes);
        write_uint(&mut out, self.roots.len() as u64, size_bytes);
        write_uint(&mut out, 0, size_bytes);
        write_uint(&mut out, total_size as u64, off_bytes);

        for root in &self.roots {
            let index = index_of
                .get(&root.hash())
                .ok_or_else(|| CellError::InvalidBoc("Root not indexed".to_string()))?;
            write_uint(&mut out, *index as u64, size_bytes);
        }

        if with_index {
            let mut offset = 0usize;
            for data in &cell_data {
                offset += data.len();
                write_uint(&mut out, offset as u64, off_bytes);
            }
        }

        for data in cell_data {
            out.extend_from_slice(&data);
        }

        if with_crc {
            let crc = crc32c(&out);
            out.extend_from_slice(&crc.to_le_bytes());
        }

        Ok(out)
    }

    pub fn serialize_to_base64(&self) -> CellResult<String> {
        Ok(STANDARD.encode(self.serialize()?))
    }

    pub fn deserialize(data: &[u8]) -> CellResult<Self> {
        let mut reader = Reader { data, offset: 0 };

        let magic = reader.read_uint(4)? as u32;
        if magic != BOC_GENERIC_MAGIC {
            return Err(CellError::InvalidBoc(format!(
                "Invalid magic: {:08x}, expected {:08x}",
                magic, BOC_GENERIC_MAGIC
            )));
        }

        let flags = reader.read_uint(1)? as u8;
        let has_index = flags & FLAG_HAS_INDEX != 0;
        let has_crc = flags & FLAG_HAS_CRC != 0;
        let size_bytes = (flags & FLAG_SIZE_MASK) as usize;
        let off_bytes = reader.read_uint(1)? as usize;
        if size_bytes == 0 || size_bytes > 4 || off_bytes == 0 || off_bytes > 8 {
            return Err(CellError::InvalidBoc(format!(
                "Invalid size fields: size={}, off={}",
                size_bytes, off_bytes
            )));
        }

        if has_crc {
            let Some(body_len) = data.len().checked_sub(4) else {
                return Err(CellError::UnexpectedEof);
            };
            let expected = u32::from_le_bytes([
                data[body_len],
                data[body_len + 1],
                data[body_len + 2],
                data[body_len + 3],
            ]);
            let actual = crc32c(&data[..body_len]);
            if expected != actual {
                return Err(CellError::CrcMismatch { expected, actual });
            }
            reader.data = &data[..body_len];
        }

        let cell_count = reader.read_uint(size_bytes)? as usize;
        let root_count = reader.read_uint(size_bytes)? as usize;
        let absent = reader.read_uint(size_bytes)?;
        let total_size = reader.read_uint(off_bytes)? as usize;
        if absent != 0 {
            return Err(CellError::InvalidBoc("Absent cells are not supported".to_string()));
        }

        // Every cell takes at least its two descriptor bytes.
        let min_cells_len = cell_count
            .checked_mul(2)
            .ok_or_else(|| CellError::InvalidBoc(format!("Cell count {} too large", cell_count)))?;
        if root_count > cell_count
            || total_size > reader.remaining()
            || min_cells_len > total_size
        {
            return Err(CellError::InvalidBoc(format!(
                "Header does not fit the input: cells={} roots={} size={} available={}",
                cell_count,
                root_count,
                total_size,
                reader.remaining()
            )));
        }

        let mut root_indices = Vec::with_capacity(root_count);
        for _ in 0..root_count {
            root_indices.push(reader.read_uint(size_bytes)? as usize);
        }
        if has_index {
            let index_len = cell_count
                .checked_mul(off_bytes)
                .ok_or_else(|| CellError::InvalidBoc("Index size overflows".to_string()))?;
            reader.skip(index_len)?;
        }

        let cells_start = reader.offset;
        let cells_end = cells_start
            .checked_add(total_size)
            .ok_or_else(|| CellError::InvalidBoc("Cell data size overflows".to_string()))?;
        let mut raw = Vec::with_capacity(cell_count);
        for index in 0..cell_count {
            raw.push(RawCell::read(&mut reader, index, cell_count, size_bytes)?);
        }
        if reader.offset != cells_end {
            return Err(CellError::InvalidBoc(format!(
                "Cell data size mismatch: declared {}, read {}",
                total_size,
                reader.offset - cells_start
            )));
        }

        // References point forward, so build from the last cell back.
        let mut built: Vec<Option<Arc<Cell>>> = vec![None; cell_count];
        for (index, cell) in raw.into_iter().enumerate().rev() {
            let references = cell
                .refs
                .iter()
                .map(|&r| built[r].clone().ok_or(CellError::CellNotFound(r)))
                .collect::<CellResult<Vec<_>>>()?;
            built[index] = Some(Arc::new(Cell::new(cell.data, cell.bit_len, references)));
        }

        let roots = root_indices
            .into_iter()
            .map(|i| {
                built
                    .get(i)
                    .cloned()
                    .flatten()
                    .ok_or(CellError::CellNotFound(i))
            })
            .collect::<CellResult<Vec<_>>>()?;

        Ok(BagOfCells { roots })
    }

    pub fn deserialize_from_base64(encoded: &str) -> CellResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    /// Roots first, each cell before everything it references.
    fn topological_order(&self) -> Vec<Arc<Cell>> {
        let mut post_order = Vec::new();
        let mut seen = HashSet::new();
        for root in self.roots.iter().rev() {
            visit(root, &mut post_order, &mut seen);
        }
        post_order.reverse();
        post_order
    }
}

fn visit(cell: &Arc<Cell>, out: &mut Vec<Arc<Cell>>, seen: &mut HashSet<[u8; HASH_BYTES]>) {
    if !seen.insert(cell.hash()) {
        return;
    }
    for reference in cell.references().iter().rev() {
        visit(reference, out, seen);
    }
    out.push(cell.clone());
}

fn encode_cell(
    cell: &Cell,
    index_of: &HashMap<[u8; HASH_BYTES], usize>,
    size_bytes: usize,
) -> CellResult<Vec<u8>> {
    let (d1, d2) = cell.descriptors();
    let mut out = vec![d1, d2];
    out.extend_from_slice(&cell.data_with_completion_tag());
    for reference in cell.references() {
        let index = index_of
            .get(&reference.hash())
            .ok_or_else(|| CellError::InvalidBoc("Reference not indexed".to_string()))?;
        write_uint(&mut out, *index as u64, size_bytes);
    }
    Ok(out)
}

struct RawCell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<usize>,
}

impl RawCell {
    fn read(reader: &mut Reader, index: usize, cell_count: usize, size_bytes: usize) -> CellResult<Self> {
        let d1 = reader.read_uint(1)? as u8;
        let d2 = reader.read_uint(1)? as u8;
        if d1 & 0x08 != 0 || d1 >> 5 != 0 {
            return Err(CellError::ExoticCell);
        }
        let ref_count = (d1 & 0x07) as usize;
        if ref_count > crate::MAX_CELL_REFS {
            return Err(CellError::TooManyRefs(ref_count));
        }

        let byte_len = (d2 as usize).div_ceil(2);
        let mut data = reader.take(byte_len)?.to_vec();
        let bit_len = if d2 % 2 == 0 {
            byte_len * 8
        } else {
            strip_completion_tag(&mut data)?
        };

        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            let r = reader.read_uint(size_bytes)? as usize;
            if r <= index || r >= cell_count {
                return Err(CellError::InvalidBoc(format!(
                    "Cell {} has invalid reference {}",
                    index, r
                )));
            }
            refs.push(r);
        }

        Ok(RawCell { data, bit_len, refs })
    }
}

/// Clear the trailing `1` marker and return the real bit length.
fn strip_completion_tag(data: &mut [u8]) -> CellResult<usize> {
    let last = data
        .last_mut()
        .ok_or_else(|| CellError::InvalidBoc("Missing completion tag".to_string()))?;
    if *last == 0 {
        return Err(CellError::InvalidBoc("Missing completion tag".to_string()));
    }
    let trailing = last.trailing_zeros() as usize;
    *last &= !(1u8 << trailing);
    Ok(data.len() * 8 - trailing - 1)
}

fn bytes_needed(n: usize) -> usize {
    let bits = usize::BITS as usize - n.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

fn write_uint(buf: &mut Vec<u8>, value: u64, bytes: usize) {
    for i in (0..bytes).rev() {
        buf.push((value >> (i * 8)) as u8);
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> CellResult<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or(CellError::UnexpectedEof)?;
        let bytes = self.data.get(self.offset..end).ok_or(CellError::UnexpectedEof)?;
        self.offset = end;
        Ok(bytes)
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn skip(&mut self, len: usize) -> CellResult<()> {
        self.take(len).map(|_| ())
    }

    fn read_uint(&mut self, bytes: usize) -> CellResult<u64> {
        Ok(self
            .take(bytes)?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }
}
