//! Internal and inbound external message layouts.
//!
//! ```text
//! int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
//!   src:MsgAddress dest:MsgAddressInt value:CurrencyCollection
//!   ihr_fee:Coins fwd_fee:Coins created_lt:uint64 created_at:uint32
//! ext_in_msg_info$10 src:MsgAddressExt dest:MsgAddressInt import_fee:Coins
//! message$_ info init:(Maybe (Either StateInit ^StateInit)) body:(Either X ^X)
//! ```
//!
//! Bodies and StateInits are always written as references; both forms
//! are accepted when reading.

use std::sync::Arc;

use ton_cell::{BagOfCells, Cell, CellBuilder, CellSlice, MsgAddress};

use crate::{ContractError, ContractResult, StateInit};

/// Text comment body: `op = 0` followed by the UTF-8 bytes.
pub fn comment(text: &str) -> ContractResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_u32(0)?;
    builder.store_bytes(text.as_bytes())?;
    Ok(builder.build()?)
}

/// First 32 bits of a body, when present.
pub fn body_op(body: &Cell) -> Option<u32> {
    CellSlice::new(body).load_u32().ok()
}

/// An internal message. Built with `src = addr_none` the way wallets
/// relay them; the chain fills the real source in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalMessage {
    pub ihr_disabled: bool,
    pub bounce: bool,
    pub bounced: bool,
    pub src: MsgAddress,
    pub dest: MsgAddress,
    pub value: u128,
    pub ihr_fee: u128,
    pub fwd_fee: u128,
    pub created_lt: u64,
    pub created_at: u32,
    pub init: Option<StateInit>,
    pub body: Arc<Cell>,
}

impl InternalMessage {
    /// Bounceable message with an empty body.
    pub fn new(dest: MsgAddress, value: u128) -> Self {
        InternalMessage {
            ihr_disabled: true,
            bounce: true,
            bounced: false,
            src: MsgAddress::Null,
            dest,
            value,
            ihr_fee: 0,
            fwd_fee: 0,
            created_lt: 0,
            created_at: 0,
            init: None,
            body: Arc::new(Cell::empty()),
        }
    }

    pub fn with_body(mut self, body: Arc<Cell>) -> Self {
        self.body = body;
        self
    }

    pub fn with_comment(self, text: &str) -> ContractResult<Self> {
        let body = comment(text)?;
        Ok(self.with_body(Arc::new(body)))
    }

    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_init(mut self, init: StateInit) -> Self {
        self.init = Some(init);
        self
    }

    pub fn op(&self) -> Option<u32> {
        body_op(&self.body)
    }

    pub fn store(&self, builder: &mut CellBuilder) -> ContractResult<()> {
        builder.store_bit(false)?;
        builder.store_bit(self.ihr_disabled)?;
        builder.store_bit(self.bounce)?;
        builder.store_bit(self.bounced)?;
        builder.store_address(&self.src)?;
        builder.store_address(&self.dest)?;
        builder.store_coins(self.value)?;
        builder.store_bit(false)?; // no extra currencies
        builder.store_coins(self.ihr_fee)?;
        builder.store_coins(self.fwd_fee)?;
        builder.store_u64(self.created_lt)?;
        builder.store_u32(self.created_at)?;
        store_init_and_body(builder, self.init.as_ref(), &self.body)
    }

    pub fn to_cell(&self) -> ContractResult<Cell> {
        let mut builder = CellBuilder::new();
        self.store(&mut builder)?;
        Ok(builder.build()?)
    }

    pub fn load(slice: &mut CellSlice) -> ContractResult<Self> {
        if slice.load_bit()? {
            return Err(ContractError::InvalidMessage(
                "expected int_msg_info$0".to_string(),
            ));
        }
        let ihr_disabled = slice.load_bit()?;
        let bounce = slice.load_bit()?;
        let bounced = slice.load_bit()?;
        let src = slice.load_address()?;
        let dest = slice.load_address()?;
        let value = slice.load_coins()?;
        if slice.load_bit()? {
            slice.skip_refs(1)?;
        }
        let ihr_fee = slice.load_coins()?;
        let fwd_fee = slice.load_coins()?;
        let created_lt = slice.load_u64()?;
        let created_at = slice.load_u32()?;
        let (init, body) = load_init_and_body(slice)?;
        Ok(InternalMessage {
            ihr_disabled,
            bounce,
            bounced,
            src,
            dest,
            value,
            ihr_fee,
            fwd_fee,
            created_lt,
            created_at,
            init,
            body,
        })
    }

    pub fn from_cell(cell: &Cell) -> ContractResult<Self> {
        Self::load(&mut CellSlice::new(cell))
    }
}

/// An inbound external message addressed to a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalMessage {
    pub src: MsgAddress,
    pub dest: MsgAddress,
    pub import_fee: u128,
    pub init: Option<StateInit>,
    pub body: Arc<Cell>,
}

impl ExternalMessage {
    pub fn new(dest: MsgAddress, body: Arc<Cell>) -> Self {
        ExternalMessage {
            src: MsgAddress::Null,
            dest,
            import_fee: 0,
            init: None,
            body,
        }
    }

    pub fn with_init(mut self, init: StateInit) -> Self {
        self.init = Some(init);
        self
    }

    pub fn to_cell(&self) -> ContractResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_uint(0b10, 2)?;
        builder.store_address(&self.src)?;
        builder.store_address(&self.dest)?;
        builder.store_coins(self.import_fee)?;
        store_init_and_body(&mut builder, self.init.as_ref(), &self.body)?;
        Ok(builder.build()?)
    }

    pub fn from_cell(cell: &Cell) -> ContractResult<Self> {
        let mut slice = CellSlice::new(cell);
        if slice.load_uint(2)? != 0b10 {
            return Err(ContractError::InvalidMessage(
                "expected ext_in_msg_info$10".to_string(),
            ));
        }
        let src = slice.load_address()?;
        let dest = slice.load_address()?;
        let import_fee = slice.load_coins()?;
        let (init, body) = load_init_and_body(&mut slice)?;
        Ok(ExternalMessage {
            src,
            dest,
            import_fee,
            init,
            body,
        })
    }

    /// Bag of Cells bytes, the form submitted to a network endpoint.
    pub fn to_boc(&self) -> ContractResult<Vec<u8>> {
        Ok(BagOfCells::from_root(self.to_cell()?).serialize()?)
    }

    pub fn from_boc(bytes: &[u8]) -> ContractResult<Self> {
        let boc = BagOfCells::deserialize(bytes)?;
        Self::from_cell(boc.single_root()?)
    }
}

fn store_init_and_body(
    builder: &mut CellBuilder,
    init: Option<&StateInit>,
    body: &Arc<Cell>,
) -> ContractResult<()> {
    match init {
        Some(init) => {
            builder.store_bit(true)?;
            builder.store_bit(true)?;
            builder.store_ref(Arc::new(init.to_cell()?))?;
        }
        None => {
            builder.store_bit(false)?;
        }
    }
    builder.store_bit(true)?;
    builder.store_ref(body.clone())?;
    Ok(())
}

fn load_init_and_body(slice: &mut CellSlice) -> ContractResult<(Option<StateInit>, Arc<Cell>)> {
    let init = if slice.load_bit()? {
        if slice.load_bit()? {
            Some(StateInit::from_cell(slice.load_ref()?)?)
        } else {
            Some(StateInit::load(slice)?)
        }
    } else {
        None
    };
    let body = if slice.load_bit()? {
        slice.load_ref()?.clone()
    } else {
        Arc::new(slice.to_cell()?)
    };
    Ok((init, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> MsgAddress {
        MsgAddress::internal(0, [byte; 32])
    }

    #[test]
    fn test_comment_body() {
        let body = comment("optional text here").unwrap();
        let mut slice = CellSlice::new(&body);
        assert_eq!(slice.load_u32().unwrap(), 0);
        assert_eq!(slice.load_bytes(18).unwrap(), b"optional text here");
        assert_eq!(body_op(&body), Some(0));
        assert_eq!(body_op(&Cell::empty()), None);
    }

    #[test]
    fn test_internal_message_layout_and_decode() {
        let msg = InternalMessage::new(addr(1), 1_000_000_000)
            .with_comment("hi")
            .unwrap();
        let cell = msg.to_cell().unwrap();

        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_uint(4).unwrap(), 0b0110);
        assert_eq!(slice.load_address().unwrap(), MsgAddress::Null);
        assert_eq!(slice.load_address().unwrap(), addr(1));

        let decoded = InternalMessage::from_cell(&cell).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.op(), Some(0));
    }

    #[test]
    fn test_inline_body_accepted() {
        let mut builder = CellBuilder::new();
        builder.store_uint(0b0110, 4).unwrap();
        builder.store_address(&MsgAddress::Null).unwrap();
        builder.store_address(&addr(2)).unwrap();
        builder.store_coins(5).unwrap();
        builder.store_bit(false).unwrap();
        builder.store_coins(0).unwrap();
        builder.store_coins(0).unwrap();
        builder.store_u64(0).unwrap();
        builder.store_u32(0).unwrap();
        builder.store_bit(false).unwrap(); // no init
        builder.store_bit(false).unwrap(); // inline body
        builder.store_u32(1).unwrap();
        let cell = builder.build().unwrap();

        let msg = InternalMessage::from_cell(&cell).unwrap();
        assert_eq!(msg.value, 5);
        assert_eq!(msg.op(), Some(1));
    }

    #[test]
    fn test_external_message_boc() {
        let mut init_code = CellBuilder::new();
        init_code.store_u8(7).unwrap();
        let init = StateInit::new(
            Arc::new(init_code.build().unwrap()),
            Arc::new(Cell::empty()),
        );
        let body = Arc::new(comment("ext").unwrap());
        let msg = ExternalMessage::new(addr(3), body).with_init(init);

        let bytes = msg.to_boc().unwrap();
        assert_eq!(ExternalMessage::from_boc(&bytes).unwrap(), msg);
    }

    #[test]
    fn test_external_boc_with_oversized_header() {
        let mut bytes = vec![0xb5, 0xee, 0x9c, 0x72, 0x01, 8, 1, 1, 0];
        bytes.extend_from_slice(&[0xff; 8]);
        bytes.extend_from_slice(&[0, 0, 0]);
        assert!(matches!(
            ExternalMessage::from_boc(&bytes),
            Err(ContractError::Cell(_))
        ));
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let msg = InternalMessage::new(addr(4), 1).to_cell().unwrap();
        assert!(matches!(
            ExternalMessage::from_cell(&msg),
            Err(ContractError::InvalidMessage(_))
        ));
    }
}
