//! Get-method arguments and results.

use std::collections::VecDeque;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use ton_cell::{Cell, CellBuilder, CellSlice, MsgAddress};

use crate::{ContractError, ContractResult};

/// One stack entry passed to or returned from a get-method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleItem {
    Null,
    /// Up to 257 bits.
    Int(BigInt),
    Cell(Arc<Cell>),
    Slice(Arc<Cell>),
}

impl TupleItem {
    pub fn type_name(&self) -> &'static str {
        match self {
            TupleItem::Null => "null",
            TupleItem::Int(_) => "int",
            TupleItem::Cell(_) => "cell",
            TupleItem::Slice(_) => "slice",
        }
    }

    /// A slice holding a single address, the usual way to pass one in.
    pub fn address(address: &MsgAddress) -> ContractResult<Self> {
        let mut builder = CellBuilder::new();
        builder.store_address(address)?;
        Ok(TupleItem::Slice(Arc::new(builder.build()?)))
    }
}

/// Sequential reader over a get-method result stack.
#[derive(Debug, Clone, Default)]
pub struct TupleReader {
    items: VecDeque<TupleItem>,
}

impl TupleReader {
    pub fn new(items: Vec<TupleItem>) -> Self {
        TupleReader {
            items: items.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn pop(&mut self) -> ContractResult<TupleItem> {
        self.items.pop_front().ok_or(ContractError::TupleUnderflow)
    }

    pub fn skip(&mut self, count: usize) -> ContractResult<&mut Self> {
        for _ in 0..count {
            self.pop()?;
        }
        Ok(self)
    }

    pub fn read_big_number(&mut self) -> ContractResult<BigInt> {
        match self.pop()? {
            TupleItem::Int(value) => Ok(value),
            other => Err(mismatch("int", &other)),
        }
    }

    pub fn read_number(&mut self) -> ContractResult<i64> {
        let value = self.read_big_number()?;
        value
            .to_i64()
            .ok_or_else(|| ContractError::InvalidAmount(format!("{} does not fit in i64", value)))
    }

    /// Non-negative amount such as a coin balance.
    pub fn read_coins(&mut self) -> ContractResult<u128> {
        let value = self.read_big_number()?;
        value
            .to_u128()
            .ok_or_else(|| ContractError::InvalidAmount(format!("{} is not a coin amount", value)))
    }

    pub fn read_bool(&mut self) -> ContractResult<bool> {
        Ok(!self.read_big_number()?.is_zero())
    }

    pub fn read_cell(&mut self) -> ContractResult<Arc<Cell>> {
        match self.pop()? {
            TupleItem::Cell(cell) | TupleItem::Slice(cell) => Ok(cell),
            other => Err(mismatch("cell", &other)),
        }
    }

    pub fn read_address(&mut self) -> ContractResult<MsgAddress> {
        let cell = self.read_cell()?;
        Ok(CellSlice::new(&cell).load_address()?)
    }
}

fn mismatch(expected: &'static str, found: &TupleItem) -> ContractError {
    ContractError::TupleType {
        expected,
        found: found.type_name(),
    }
}
