//! Jetton Wallet contract interface.
//!
//! The Jetton Wallet contract holds a user's token balance and handles transfers.
//! Each user has their own Jetton Wallet for each Jetton they hold, at an
//! address derived from the minter's wallet code and [`JettonWalletData`].

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellSlice, MsgAddress};
use ton_contract::{Contract, ContractProvider, InternalArgs, SendReport, Sender, StateInit};

use crate::error::{JettonError, JettonResult};

/// TEP-74 Operation codes.
pub mod opcodes {
    /// Transfer tokens to another address.
    pub const OP_TRANSFER: u32 = 0x0f8a7ea5;

    /// Internal transfer between wallets, also sent by the minter on mint.
    pub const OP_INTERNAL_TRANSFER: u32 = 0x178d4519;

    /// Burn tokens.
    pub const OP_BURN: u32 = 0x595f07bc;
}

pub use opcodes::*;

/// Persistent data of a standard jetton wallet.
///
/// ```text
/// balance:Coins owner:MsgAddress jetton_master:MsgAddress ^wallet_code
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonWalletData {
    pub balance: u128,
    pub owner: MsgAddress,
    pub jetton_master: MsgAddress,
    pub wallet_code: Arc<Cell>,
}

impl JettonWalletData {
    /// Data of a wallet that has not received anything yet.
    pub fn empty(owner: MsgAddress, jetton_master: MsgAddress, wallet_code: Arc<Cell>) -> Self {
        JettonWalletData {
            balance: 0,
            owner,
            jetton_master,
            wallet_code,
        }
    }

    pub fn to_cell(&self) -> JettonResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_coins(self.balance)?;
        builder.store_address(&self.owner)?;
        builder.store_address(&self.jetton_master)?;
        builder.store_ref(self.wallet_code.clone())?;
        Ok(builder.build()?)
    }

    pub fn from_cell(cell: &Cell) -> JettonResult<Self> {
        let mut slice = CellSlice::new(cell);
        let balance = slice.load_coins()?;
        let owner = slice.load_address()?;
        let jetton_master = slice.load_address()?;
        let wallet_code = slice.load_ref()?.clone();
        Ok(JettonWalletData {
            balance,
            owner,
            jetton_master,
            wallet_code,
        })
    }

    /// StateInit of this wallet: `wallet_code` plus this data.
    pub fn state_init(&self) -> JettonResult<StateInit> {
        Ok(StateInit::new(
            self.wallet_code.clone(),
            Arc::new(self.to_cell()?),
        ))
    }
}

/// StateInit of `owner`'s wallet for the jetton minted by `jetton_master`.
pub fn jetton_wallet_state_init(
    owner: &MsgAddress,
    jetton_master: &MsgAddress,
    wallet_code: Arc<Cell>,
) -> JettonResult<StateInit> {
    JettonWalletData::empty(owner.clone(), jetton_master.clone(), wallet_code).state_init()
}

/// Address of `owner`'s wallet for the jetton minted by `jetton_master`.
pub fn jetton_wallet_address(
    owner: &MsgAddress,
    jetton_master: &MsgAddress,
    wallet_code: Arc<Cell>,
    workchain: i32,
) -> JettonResult<MsgAddress> {
    Ok(jetton_wallet_state_init(owner, jetton_master, wallet_code)?.address(workchain)?)
}

/// Jetton Wallet contract interface.
#[derive(Debug, Clone)]
pub struct JettonWallet {
    /// Address of the Jetton Wallet contract.
    address: MsgAddress,
    init: Option<StateInit>,
}

impl JettonWallet {
    pub fn create_from_address(address: MsgAddress) -> Self {
        JettonWallet {
            address,
            init: None,
        }
    }

    /// A wallet deployed with empty data.
    pub fn create_from_config(code: Arc<Cell>, workchain: i32) -> JettonResult<Self> {
        Self::from_init(StateInit::new(code, Arc::new(Cell::empty())), workchain)
    }

    /// The wallet a minter would deploy for `owner`.
    pub fn for_owner(
        owner: &MsgAddress,
        jetton_master: &MsgAddress,
        wallet_code: Arc<Cell>,
        workchain: i32,
    ) -> JettonResult<Self> {
        let init = jetton_wallet_state_init(owner, jetton_master, wallet_code)?;
        Self::from_init(init, workchain)
    }

    fn from_init(init: StateInit, workchain: i32) -> JettonResult<Self> {
        Ok(JettonWallet {
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

    /// Calls `get_wallet_data`: `[balance, owner, jetton_master, wallet_code]`.
    pub async fn get_wallet_data(
        &self,
        provider: &impl ContractProvider,
    ) -> JettonResult<JettonWalletData> {
        let mut stack = provider.get("get_wallet_data", vec![]).await?;
        Ok(JettonWalletData {
            balance: stack.read_coins()?,
            owner: stack.read_address()?,
            jetton_master: stack.read_address()?,
            wallet_code: stack.read_cell()?,
        })
    }

    /// Creates a burn message body.
    ///
    /// ```text
    /// burn#595f07bc
    ///   query_id:uint64
    ///   amount:(VarUInteger 16)
    ///   response_destination:MsgAddress
    ///   custom_payload:(Maybe ^Cell)
    /// ```
    pub fn create_burn_body(
        query_id: u64,
        amount: u128,
        response_destination: &MsgAddress,
        custom_payload: Option<Cell>,
    ) -> JettonResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(OP_BURN)?;
        builder.store_u64(query_id)?;
        builder.store_coins(amount)?;
        builder.store_address(response_destination)?;
        builder.store_maybe_ref(custom_payload.map(Arc::new))?;
        Ok(builder.build()?)
    }
}

impl Contract for JettonWallet {
    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn init(&self) -> Option<&StateInit> {
        self.init.as_ref()
    }
}

/// `internal_transfer` body the minter forwards to a holder's wallet.
///
/// ```text
/// internal_transfer#178d4519
///   query_id:uint64
///   amount:(VarUInteger 16)
///   from:MsgAddress
///   response_address:MsgAddress
///   forward_ton_amount:(VarUInteger 16)
///   forward_payload:(Either Cell ^Cell)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalTransfer {
    pub query_id: u64,
    pub amount: u128,
    pub from: MsgAddress,
    pub response_address: MsgAddress,
    pub forward_ton_amount: u128,
}

impl InternalTransfer {
    /// Mint transfer: `from` and `response_address` are both the minter.
    pub fn mint(amount: u128, minter: &MsgAddress) -> Self {
        InternalTransfer {
            query_id: 0,
            amount,
            from: minter.clone(),
            response_address: minter.clone(),
            forward_ton_amount: 0,
        }
    }

    /// Empty in-place forward payload.
    pub fn to_cell(&self) -> JettonResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(OP_INTERNAL_TRANSFER)?;
        builder.store_u64(self.query_id)?;
        builder.store_coins(self.amount)?;
        builder.store_address(&self.from)?;
        builder.store_address(&self.response_address)?;
        builder.store_coins(self.forward_ton_amount)?;
        builder.store_bit(false)?;
        Ok(builder.build()?)
    }

    pub fn from_cell(cell: &Cell) -> JettonResult<Self> {
        let mut slice = CellSlice::new(cell);
        let op = slice.load_u32()?;
        if op != OP_INTERNAL_TRANSFER {
            return Err(JettonError::InvalidData(format!(
                "expected internal_transfer, got op 0x{:08x}",
                op
            )));
        }
        Ok(InternalTransfer {
            query_id: slice.load_u64()?,
            amount: slice.load_coins()?,
            from: slice.load_address()?,
            response_address: slice.load_address()?,
            forward_ton_amount: slice.load_coins()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_contract::{MockProvider, MockSender, TupleItem};

    fn wallet_code() -> Arc<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_bytes(b"jetton-wallet").unwrap();
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn test_wallet_address_depends_on_owner() {
        let master = MsgAddress::internal(0, [0x10; 32]);
        let alice = MsgAddress::internal(0, [0xA1; 32]);
        let bob = MsgAddress::internal(0, [0xB0; 32]);

        let a = jetton_wallet_address(&alice, &master, wallet_code(), 0).unwrap();
        let b = jetton_wallet_address(&bob, &master, wallet_code(), 0).unwrap();
        assert_ne!(a, b);

        let wallet = JettonWallet::for_owner(&alice, &master, wallet_code(), 0).unwrap();
        assert_eq!(wallet.address(), &a);

        let data = JettonWalletData::from_cell(&wallet.init().unwrap().data).unwrap();
        assert_eq!(data, JettonWalletData::empty(alice, master, wallet_code()));
    }

    #[test]
    fn test_empty_config_wallet() {
        let wallet = JettonWallet::create_from_config(wallet_code(), 0).unwrap();
        let init = wallet.init().unwrap();
        assert!(init.data.is_empty());
        assert_eq!(wallet.address(), &init.address(0).unwrap());
        assert!(JettonWallet::create_from_address(wallet.address().clone())
            .init()
            .is_none());
    }

    #[test]
    fn test_create_burn_body() {
        let response = MsgAddress::internal(0, [0x9A; 32]);
        let body = JettonWallet::create_burn_body(0, 20, &response, Some(Cell::empty())).unwrap();

        let mut slice = CellSlice::new(&body);
        assert_eq!(slice.load_u32().unwrap(), OP_BURN);
        assert_eq!(slice.load_u64().unwrap(), 0);
        assert_eq!(slice.load_coins().unwrap(), 20);
        assert_eq!(slice.load_address().unwrap(), response);
        assert!(slice.load_maybe_ref().unwrap().is_some());
        assert!(slice.is_empty());
    }

    #[test]
    fn test_internal_transfer_layout() {
        let minter = MsgAddress::internal(0, [0x55; 32]);
        let transfer = InternalTransfer::mint(100, &minter);
        let cell = transfer.to_cell().unwrap();
        assert_eq!(InternalTransfer::from_cell(&cell).unwrap(), transfer);

        let burn = JettonWallet::create_burn_body(0, 1, &minter, None).unwrap();
        assert!(matches!(
            InternalTransfer::from_cell(&burn),
            Err(JettonError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_deploy_and_wallet_data() {
        let owner = MsgAddress::internal(0, [0x01; 32]);
        let master = MsgAddress::internal(0, [0x02; 32]);
        let wallet = JettonWallet::for_owner(&owner, &master, wallet_code(), 0).unwrap();

        let mut provider = MockProvider::new(wallet.address().clone());
        provider.set_get_result(
            "get_wallet_data",
            vec![
                TupleItem::Int(42.into()),
                TupleItem::address(&owner).unwrap(),
                TupleItem::address(&master).unwrap(),
                TupleItem::Cell(wallet_code()),
            ],
        );
        let via = MockSender::new(owner.clone());

        wallet.send_deploy(&provider, &via, 50_000_000).await.unwrap();
        let sent = provider.last_internal().unwrap();
        assert_eq!(sent.value, 50_000_000);
        assert!(sent.body.is_empty());

        let data = wallet.get_wallet_data(&provider).await.unwrap();
        assert_eq!(data.balance, 42);
        assert_eq!(data.owner, owner);
        assert_eq!(data.jetton_master, master);
    }
}
