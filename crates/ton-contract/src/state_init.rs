//! Contract StateInit and address derivation.

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellSlice, MsgAddress};

use crate::{ContractError, ContractResult};

/// Code and data a contract is deployed with.
///
/// Serialized as `split_depth:(Maybe) special:(Maybe) code:(Maybe ^Cell)
/// data:(Maybe ^Cell) library:(Maybe ^Cell)` with only code and data set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInit {
    pub code: Arc<Cell>,
    pub data: Arc<Cell>,
}

impl StateInit {
    pub fn new(code: Arc<Cell>, data: Arc<Cell>) -> Self {
        StateInit { code, data }
    }

    pub fn to_cell(&self) -> ContractResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_bit(false)?; // split_depth
        builder.store_bit(false)?; // special
        builder.store_maybe_ref(Some(self.code.clone()))?;
        builder.store_maybe_ref(Some(self.data.clone()))?;
        builder.store_bit(false)?; // library
        Ok(builder.build()?)
    }

    pub fn load(slice: &mut CellSlice) -> ContractResult<Self> {
        if slice.load_bit()? {
            slice.skip_bits(5)?;
        }
        if slice.load_bit()? {
            slice.skip_bits(2)?;
        }
        let code = slice
            .load_maybe_ref()?
            .ok_or_else(|| ContractError::InvalidMessage("StateInit without code".to_string()))?
            .clone();
        let data = slice
            .load_maybe_ref()?
            .ok_or_else(|| ContractError::InvalidMessage("StateInit without data".to_string()))?
            .clone();
        slice.load_maybe_ref()?;
        Ok(StateInit { code, data })
    }

    pub fn from_cell(cell: &Cell) -> ContractResult<Self> {
        Self::load(&mut CellSlice::new(cell))
    }

    /// Address a contract with this StateInit gets in `workchain`.
    pub fn address(&self, workchain: i32) -> ContractResult<MsgAddress> {
        Ok(MsgAddress::internal(workchain, self.to_cell()?.hash()))
    }
}

/// Address derived from the representation hash of `init`.
pub fn contract_address(workchain: i32, init: &StateInit) -> ContractResult<MsgAddress> {
    init.address(workchain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_with(value: u32) -> Arc<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(value).unwrap();
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn test_layout() {
        let init = StateInit::new(cell_with(1), cell_with(2));
        let cell = init.to_cell().unwrap();
        assert_eq!(cell.bit_len(), 5);
        assert_eq!(cell.data(), &[0b0011_0000]);
        assert_eq!(cell.reference_count(), 2);
        assert_eq!(StateInit::from_cell(&cell).unwrap(), init);
    }

    #[test]
    fn test_address_depends_on_data() {
        let a = StateInit::new(cell_with(1), cell_with(2));
        let b = StateInit::new(cell_with(1), cell_with(3));
        let addr_a = contract_address(0, &a).unwrap();
        assert_ne!(addr_a, contract_address(0, &b).unwrap());
        assert_eq!(addr_a.workchain(), Some(0));
        assert_eq!(addr_a.hash_part(), Some(&a.to_cell().unwrap().hash()));
    }
}
