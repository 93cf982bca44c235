use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellSlice, MsgAddress};
use ton_contract::{Contract, ContractProvider, InternalArgs, SendReport, Sender, StateInit};

use crate::MainResult;

/// Relay the incoming value back to the configured address.
pub const OP_SEND_MESSAGE: u32 = 1;

/// `op = 1` from anyone but the configured address.
pub const ERR_WRONG_SENDER: i32 = 500;

pub const ERR_UNKNOWN_OP: i32 = 0xffff;

/// Deploy-time data: `addr:MsgAddress`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainConfig {
    pub addr: MsgAddress,
}

impl MainConfig {
    pub fn to_cell(&self) -> MainResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_address(&self.addr)?;
        Ok(builder.build()?)
    }

    pub fn from_cell(cell: &Cell) -> MainResult<Self> {
        Ok(MainConfig {
            addr: CellSlice::new(cell).load_address()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MainContract {
    address: MsgAddress,
    init: Option<StateInit>,
}

impl MainContract {
    pub fn create_from_address(address: MsgAddress) -> Self {
        MainContract {
            address,
            init: None,
        }
    }

    pub fn create_from_config(
        config: &MainConfig,
        code: Arc<Cell>,
        workchain: i32,
    ) -> MainResult<Self> {
        let init = StateInit::new(code, Arc::new(config.to_cell()?));
        Ok(MainContract {
            address: init.address(workchain)?,
            init: Some(init),
        })
    }

    pub async fn send_deploy(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        value: u128,
    ) -> MainResult<SendReport> {
        Ok(provider
            .internal(via, InternalArgs::new(value, Cell::empty()))
            .await?)
    }

    pub async fn send_message(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        value: u128,
    ) -> MainResult<SendReport> {
        let mut body = CellBuilder::new();
        body.store_u32(OP_SEND_MESSAGE)?;
        Ok(provider
            .internal(via, InternalArgs::new(value, body.build()?))
            .await?)
    }
}

impl Contract for MainContract {
    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn init(&self) -> Option<&StateInit> {
        self.init.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_contract::{MockProvider, MockSender, SendMode, body_op};

    #[test]
    fn test_config_roundtrip() {
        let config = MainConfig {
            addr: MsgAddress::internal(0, [0x11; 32]),
        };
        let cell = config.to_cell().unwrap();
        assert_eq!(cell.bit_len(), 267);
        assert_eq!(MainConfig::from_cell(&cell).unwrap(), config);
    }

    #[tokio::test]
    async fn test_send_message_body() {
        let config = MainConfig {
            addr: MsgAddress::internal(0, [0x11; 32]),
        };
        let main = MainContract::create_from_config(&config, Arc::new(Cell::empty()), 0).unwrap();
        assert_eq!(main.address(), &main.init().unwrap().address(0).unwrap());

        let provider = MockProvider::new(main.address().clone());
        let via = MockSender::new(config.addr.clone());

        main.send_deploy(&provider, &via, 5).await.unwrap();
        assert!(provider.last_internal().unwrap().body.is_empty());

        main.send_message(&provider, &via, 7).await.unwrap();
        let sent = provider.last_internal().unwrap();
        assert_eq!(sent.value, 7);
        assert_eq!(sent.send_mode, SendMode::PAY_GAS_SEPARATELY);
        assert_eq!(body_op(&sent.body), Some(OP_SEND_MESSAGE));
        assert_eq!(sent.body.bit_len(), 32);
    }
}
