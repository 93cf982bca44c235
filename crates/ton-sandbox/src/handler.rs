//! Native stand-ins for contract code.
//!
//! The sandbox does not run TVM. Each code cell is bound to a
//! [`ContractHandler`] that plays the contract's compute phase: it sees the
//! inbound message and the stored data, and either fails with an exit code
//! or returns [`Effects`] for the chain to apply.

use std::fmt;
use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellError, MsgAddress};
use ton_contract::{ContractError, InternalMessage, SendMode, TupleItem};
use ton_crypto::sha256;

/// TVM-style exit code of a failed computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const INTEGER_OVERFLOW: ExitCode = ExitCode(4);
    pub const CELL_UNDERFLOW: ExitCode = ExitCode(9);
    /// No such get-method, or no external message entry point.
    pub const UNKNOWN_METHOD: ExitCode = ExitCode(11);
    pub const UNKNOWN_OP: ExitCode = ExitCode(0xffff);
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.0)
    }
}

impl From<CellError> for ExitCode {
    fn from(_: CellError) -> Self {
        ExitCode::CELL_UNDERFLOW
    }
}

impl From<ContractError> for ExitCode {
    fn from(_: ContractError) -> Self {
        ExitCode::CELL_UNDERFLOW
    }
}

pub type ComputeResult = Result<Effects, ExitCode>;

/// What a handler sees while processing one inbound message.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub now: u32,
    pub address: &'a MsgAddress,
    /// Balance after the inbound value was credited.
    pub balance: u128,
    pub data: &'a Cell,
    /// `None` for inbound external messages.
    pub src: Option<&'a MsgAddress>,
    pub value: u128,
    pub bounced: bool,
    pub body: &'a Cell,
}

/// What a handler sees while running a get-method.
#[derive(Debug, Clone, Copy)]
pub struct GetContext<'a> {
    pub now: u32,
    pub address: &'a MsgAddress,
    pub balance: u128,
    pub data: &'a Cell,
}

/// One `SENDRAWMSG` action. The message cell is parsed in the action
/// phase, so a malformed one fails there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutAction {
    pub mode: SendMode,
    pub message: Arc<Cell>,
}

/// Result of a successful computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    /// Replacement data, committed only if the action phase succeeds.
    pub data: Option<Arc<Cell>>,
    pub code: Option<Arc<Cell>>,
    pub actions: Vec<OutAction>,
}

impl Effects {
    /// Accept the message and change nothing.
    pub fn none() -> Self {
        Effects::default()
    }

    pub fn with_data(mut self, data: Cell) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    pub fn with_code(mut self, code: Arc<Cell>) -> Self {
        self.code = Some(code);
        self
    }

    pub fn send_raw(mut self, mode: SendMode, message: Arc<Cell>) -> Self {
        self.actions.push(OutAction { mode, message });
        self
    }

    pub fn send(self, mode: SendMode, message: &InternalMessage) -> Result<Self, ExitCode> {
        Ok(self.send_raw(mode, Arc::new(message.to_cell()?)))
    }
}

/// Compute phase of one contract code.
pub trait ContractHandler: Send + Sync {
    fn receive_internal(&self, ctx: &MessageContext<'_>) -> ComputeResult;

    /// Returning an error means the message was not accepted: no
    /// transaction is recorded.
    fn receive_external(&self, _ctx: &MessageContext<'_>) -> ComputeResult {
        Err(ExitCode::UNKNOWN_METHOD)
    }

    fn get(
        &self,
        _ctx: &GetContext<'_>,
        _method: &str,
        _args: &[TupleItem],
    ) -> Result<Vec<TupleItem>, ExitCode> {
        Err(ExitCode::UNKNOWN_METHOD)
    }
}

/// Handler of code nobody registered: takes every internal message and
/// does nothing with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ContractHandler for AcceptAll {
    fn receive_internal(&self, _ctx: &MessageContext<'_>) -> ComputeResult {
        Ok(Effects::none())
    }
}

/// Placeholder code cell identified by `name`: the 256-bit hash of it.
pub fn code_cell(name: &str) -> Arc<Cell> {
    let mut builder = CellBuilder::new();
    if builder.store_bytes(&sha256(name.as_bytes())).is_err() {
        return Arc::new(Cell::empty());
    }
    Arc::new(builder.build().unwrap_or_default())
}

pub fn wallet_code() -> Arc<Cell> {
    code_cell("authorized-wallet")
}

pub fn main_code() -> Arc<Cell> {
    code_cell("main")
}

pub fn minter_code() -> Arc<Cell> {
    code_cell("jetton-minter")
}

/// Jetton wallet code. No handler is registered for it.
pub fn jetton_wallet_code() -> Arc<Cell> {
    code_cell("jetton-wallet")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_cells_are_distinct() {
        let codes = [wallet_code(), main_code(), minter_code(), jetton_wallet_code()];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a.hash(), b.hash());
            }
        }
        assert_eq!(code_cell("main").hash(), main_code().hash());
    }

    #[test]
    fn test_accept_all_defaults() {
        let address = MsgAddress::internal(0, [1; 32]);
        let data = Cell::empty();
        let body = Cell::empty();
        let ctx = MessageContext {
            now: 0,
            address: &address,
            balance: 0,
            data: &data,
            src: None,
            value: 0,
            bounced: false,
            body: &body,
        };
        assert_eq!(AcceptAll.receive_internal(&ctx), Ok(Effects::none()));
        assert_eq!(AcceptAll.receive_external(&ctx), Err(ExitCode::UNKNOWN_METHOD));

        let get = GetContext {
            now: 0,
            address: &address,
            balance: 0,
            data: &data,
        };
        assert_eq!(AcceptAll.get(&get, "seqno", &[]), Err(ExitCode::UNKNOWN_METHOD));
    }
}
