//! The seams between contract wrappers and whatever carries their messages.
//!
//! Wrappers only build cells and read stacks. A [`ContractProvider`] bound
//! to one contract address delivers them, either to a live network client
//! or to an in-memory chain in tests.

use std::future::Future;
use std::sync::Arc;

use ton_cell::{Cell, MsgAddress};

use crate::{ContractResult, SendMode, SendReport, StateInit, TupleItem, TupleReader};

/// A typed handle to one deployed (or deployable) contract.
pub trait Contract {
    fn address(&self) -> &MsgAddress;

    /// Code and data to attach while the account is not yet active.
    fn init(&self) -> Option<&StateInit> {
        None
    }
}

/// Arguments of an internal message a wrapper asks a provider to send.
#[derive(Debug, Clone)]
pub struct InternalArgs {
    pub value: u128,
    /// Defaults to bounceable when unset.
    pub bounce: Option<bool>,
    pub send_mode: SendMode,
    pub body: Arc<Cell>,
}

impl InternalArgs {
    pub fn new(value: u128, body: Cell) -> Self {
        InternalArgs {
            value,
            bounce: None,
            send_mode: SendMode::PAY_GAS_SEPARATELY,
            body: Arc::new(body),
        }
    }
}

/// A fully addressed message handed to a [`Sender`].
#[derive(Debug, Clone)]
pub struct SenderArguments {
    pub to: MsgAddress,
    pub value: u128,
    pub bounce: bool,
    pub send_mode: SendMode,
    pub init: Option<StateInit>,
    pub body: Arc<Cell>,
}

/// Something that can originate internal messages, e.g. a funded wallet.
pub trait Sender: Send + Sync {
    fn address(&self) -> Option<&MsgAddress>;

    fn send(&self, args: SenderArguments) -> impl Future<Output = ContractResult<SendReport>> + Send;
}

/// Message and get-method transport for a single contract address.
pub trait ContractProvider: Send + Sync {
    /// Send an internal message to the bound contract through `via`.
    fn internal(
        &self,
        via: &impl Sender,
        args: InternalArgs,
    ) -> impl Future<Output = ContractResult<SendReport>> + Send;

    /// Submit an inbound external message whose body is `body`.
    fn external(&self, body: Cell) -> impl Future<Output = ContractResult<SendReport>> + Send;

    /// Run a get-method on the bound contract.
    fn get(
        &self,
        method: &str,
        args: Vec<TupleItem>,
    ) -> impl Future<Output = ContractResult<TupleReader>> + Send;
}
