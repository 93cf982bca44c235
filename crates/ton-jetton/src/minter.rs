//! Jetton minter contract interface.
//!
//! The minter holds the total supply and the wallet code, mints to holders'
//! wallets, relays admin messages to them and can replace its own code.

use std::sync::Arc;

use num_bigint::BigInt;
use tracing::debug;

use ton_cell::{Cell, CellBuilder, CellSlice, MsgAddress};
use ton_contract::{
    Contract, ContractProvider, InternalArgs, SendReport, Sender, StateInit, TupleItem,
    TupleReader,
};

use crate::error::{JettonError, JettonResult};
use crate::wallet::InternalTransfer;

/// Mint `amount` TON plus an `internal_transfer` to a holder's wallet.
pub const OP_MINT: u32 = 21;

/// Relay an arbitrary message to a holder's wallet.
pub const OP_CALL_TO: u32 = 6;

/// Replace the minter's code and data.
pub const OP_UPGRADE: u32 = 5;

/// Deploy-time minter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinterConfig {
    pub admin_address: MsgAddress,
    pub jetton_wallet_code: Arc<Cell>,
}

impl MinterConfig {
    pub fn to_cell(&self) -> JettonResult<Cell> {
        MinterData {
            total_supply: 0,
            admin_address: self.admin_address.clone(),
            transfer_admin_address: MsgAddress::Null,
            jetton_wallet_code: self.jetton_wallet_code.clone(),
        }
        .to_cell()
    }
}

/// Persistent minter data.
///
/// ```text
/// total_supply:Coins admin:MsgAddress transfer_admin:MsgAddress ^wallet_code
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinterData {
    pub total_supply: u128,
    pub admin_address: MsgAddress,
    pub transfer_admin_address: MsgAddress,
    pub jetton_wallet_code: Arc<Cell>,
}

impl MinterData {
    pub fn to_cell(&self) -> JettonResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_coins(self.total_supply)?;
        builder.store_address(&self.admin_address)?;
        builder.store_address(&self.transfer_admin_address)?;
        builder.store_ref(self.jetton_wallet_code.clone())?;
        Ok(builder.build()?)
    }

    pub fn from_cell(cell: &Cell) -> JettonResult<Self> {
        let mut slice = CellSlice::new(cell);
        Ok(MinterData {
            total_supply: slice.load_coins()?,
            admin_address: slice.load_address()?,
            transfer_admin_address: slice.load_address()?,
            jetton_wallet_code: slice.load_ref()?.clone(),
        })
    }
}

/// Result of `get_jetton_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonData {
    pub total_supply: BigInt,
    pub mintable: bool,
    pub admin_address: MsgAddress,
    pub content: Arc<Cell>,
    pub wallet_code: Arc<Cell>,
}

impl JettonData {
    /// Stack order: `[total_supply, mintable, admin, content, wallet_code]`.
    pub fn to_stack(&self) -> JettonResult<Vec<TupleItem>> {
        let mintable = if self.mintable { -1 } else { 0 };
        Ok(vec![
            TupleItem::Int(self.total_supply.clone()),
            TupleItem::Int(mintable.into()),
            TupleItem::address(&self.admin_address)?,
            TupleItem::Cell(self.content.clone()),
            TupleItem::Cell(self.wallet_code.clone()),
        ])
    }

    pub fn from_stack(stack: &mut TupleReader) -> JettonResult<Self> {
        Ok(JettonData {
            total_supply: stack.read_big_number()?,
            mintable: stack.read_bool()?,
            admin_address: stack.read_address()?,
            content: stack.read_cell()?,
            wallet_code: stack.read_cell()?,
        })
    }
}

/// Parsed body of a message to the minter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinterRequest {
    /// `mint#15 query_id:uint64 to:MsgAddress amount:Coins ^internal_transfer`
    Mint {
        query_id: u64,
        to_address: MsgAddress,
        amount: u128,
        master_msg: Arc<Cell>,
    },
    /// `call_to#06 query_id:uint64 to:MsgAddress amount:Coins ^master_msg`
    CallTo {
        query_id: u64,
        to_address: MsgAddress,
        amount: u128,
        master_msg: Arc<Cell>,
    },
    /// `upgrade#05 query_id:uint64 ^new_data ^new_code`
    Upgrade {
        query_id: u64,
        new_data: Arc<Cell>,
        new_code: Arc<Cell>,
    },
}

impl MinterRequest {
    pub fn op(&self) -> u32 {
        match self {
            MinterRequest::Mint { .. } => OP_MINT,
            MinterRequest::CallTo { .. } => OP_CALL_TO,
            MinterRequest::Upgrade { .. } => OP_UPGRADE,
        }
    }

    pub fn to_cell(&self) -> JettonResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(self.op())?;
        match self {
            MinterRequest::Mint {
                query_id,
                to_address,
                amount,
                master_msg,
            }
            | MinterRequest::CallTo {
                query_id,
                to_address,
                amount,
                master_msg,
            } => {
                builder.store_u64(*query_id)?;
                builder.store_address(to_address)?;
                builder.store_coins(*amount)?;
                builder.store_ref(master_msg.clone())?;
            }
            MinterRequest::Upgrade {
                query_id,
                new_data,
                new_code,
            } => {
                builder.store_u64(*query_id)?;
                builder.store_ref(new_data.clone())?;
                builder.store_ref(new_code.clone())?;
            }
        }
        Ok(builder.build()?)
    }

    /// Fails with [`JettonError::UnknownOp`] for ops the minter does not
    /// handle and with a cell error for truncated bodies.
    pub fn parse(body: &Cell) -> JettonResult<Self> {
        let mut slice = CellSlice::new(body);
        let op = slice.load_u32()?;
        let query_id = match op {
            OP_MINT | OP_CALL_TO | OP_UPGRADE => slice.load_u64()?,
            other => return Err(JettonError::UnknownOp(other)),
        };
        if op == OP_UPGRADE {
            let new_data = slice.load_ref()?.clone();
            let new_code = slice.load_ref()?.clone();
            return Ok(MinterRequest::Upgrade {
                query_id,
                new_data,
                new_code,
            });
        }

        let to_address = slice.load_address()?;
        let amount = slice.load_coins()?;
        let master_msg = slice.load_ref()?.clone();
        Ok(if op == OP_MINT {
            MinterRequest::Mint {
                query_id,
                to_address,
                amount,
                master_msg,
            }
        } else {
            MinterRequest::CallTo {
                query_id,
                to_address,
                amount,
                master_msg,
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct MintArgs {
    pub to_address: MsgAddress,
    pub jetton_amount: u128,
    /// TON forwarded to the holder's wallet.
    pub amount: u128,
    pub value: u128,
}

#[derive(Debug, Clone)]
pub struct CallToArgs {
    pub to_address: MsgAddress,
    pub amount: u128,
    pub master_msg: Cell,
    pub value: u128,
}

#[derive(Debug, Clone)]
pub struct UpgradeArgs {
    pub new_data: Cell,
    pub new_code: Cell,
    pub value: u128,
}

/// Jetton minter contract interface.
#[derive(Debug, Clone)]
pub struct Minter {
    address: MsgAddress,
    init: Option<StateInit>,
}

impl Minter {
    pub fn create_from_address(address: MsgAddress) -> Self {
        Minter {
            address,
            init: None,
        }
    }

    pub fn create_from_config(
        config: &MinterConfig,
        code: Arc<Cell>,
        workchain: i32,
    ) -> JettonResult<Self> {
        let init = StateInit::new(code, Arc::new(config.to_cell()?));
        Ok(Minter {
            address: init.address(workchain)?,
            init: Some(init),
        })
    }

    pub async fn send_deploy(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        value: u128,
    ) -> JettonResult<SendReport> {
        Ok(provider
            .internal(via, InternalArgs::new(value, Cell::empty()))
            .await?)
    }

    pub async fn send_mint(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        args: MintArgs,
    ) -> JettonResult<SendReport> {
        let transfer = InternalTransfer::mint(args.jetton_amount, &self.address);
        let request = MinterRequest::Mint {
            query_id: 0,
            to_address: args.to_address,
            amount: args.amount,
            master_msg: Arc::new(transfer.to_cell()?),
        };
        debug!(
            "Minting {} jettons via {}",
            args.jetton_amount, self.address
        );
        self.send_request(provider, via, args.value, request).await
    }

    pub async fn send_call_to(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        args: CallToArgs,
    ) -> JettonResult<SendReport> {
        let request = MinterRequest::CallTo {
            query_id: 0,
            to_address: args.to_address,
            amount: args.amount,
            master_msg: Arc::new(args.master_msg),
        };
        self.send_request(provider, via, args.value, request).await
    }

    pub async fn send_upgrade_minter(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        args: UpgradeArgs,
    ) -> JettonResult<SendReport> {
        let request = MinterRequest::Upgrade {
            query_id: 0,
            new_data: Arc::new(args.new_data),
            new_code: Arc::new(args.new_code),
        };
        self.send_request(provider, via, args.value, request).await
    }

    async fn send_request(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        value: u128,
        request: MinterRequest,
    ) -> JettonResult<SendReport> {
        let args = InternalArgs::new(value, request.to_cell()?);
        Ok(provider.internal(via, args).await?)
    }

    /// Jetton wallet address of `owner`, as computed by the minter.
    pub async fn get_wallet_address(
        &self,
        provider: &impl ContractProvider,
        owner: &MsgAddress,
    ) -> JettonResult<MsgAddress> {
        let mut stack = provider
            .get("get_wallet_address", vec![TupleItem::address(owner)?])
            .await?;
        Ok(stack.read_address()?)
    }

    pub async fn get_jetton_data(
        &self,
        provider: &impl ContractProvider,
    ) -> JettonResult<JettonData> {
        let mut stack = provider.get("get_jetton_data", vec![]).await?;
        JettonData::from_stack(&mut stack)
    }

    pub async fn get_total_supply(&self, provider: &impl ContractProvider) -> JettonResult<u128> {
        Ok(self.jetton_data_at(provider, 0).await?.read_coins()?)
    }

    pub async fn get_admin_address(
        &self,
        provider: &impl ContractProvider,
    ) -> JettonResult<MsgAddress> {
        Ok(self.jetton_data_at(provider, 2).await?.read_address()?)
    }

    pub async fn get_content(&self, provider: &impl ContractProvider) -> JettonResult<Arc<Cell>> {
        Ok(self.jetton_data_at(provider, 3).await?.read_cell()?)
    }

    pub async fn get_wallet_code(
        &self,
        provider: &impl ContractProvider,
    ) -> JettonResult<Arc<Cell>> {
        Ok(self.jetton_data_at(provider, 4).await?.read_cell()?)
    }

    /// `get_jetton_data` stack with the first `skip` entries dropped.
    async fn jetton_data_at(
        &self,
        provider: &impl ContractProvider,
        skip: usize,
    ) -> JettonResult<TupleReader> {
        let mut stack = provider.get("get_jetton_data", vec![]).await?;
        stack.skip(skip)?;
        Ok(stack)
    }
}

impl Contract for Minter {
    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn init(&self) -> Option<&StateInit> {
        self.init.as_ref()
    }
}
