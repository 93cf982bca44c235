//! Error types for ton-sandbox

use thiserror::Error;

use ton_cell::MsgAddress;
use ton_contract::ContractError;

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Account {0} is not active")]
    AccountNotActive(MsgAddress),

    #[error("Action phase at {address} failed with result code {result_code}")]
    ActionFailed { address: MsgAddress, result_code: i32 },

    #[error("Message chain exceeded {0} transactions")]
    TransactionLimit(usize),
}

pub type SandboxResult<T> = Result<T, SandboxError>;

impl From<SandboxError> for ContractError {
    fn from(err: SandboxError) -> Self {
        match err {
            SandboxError::Contract(inner) => inner,
            other => ContractError::Provider(other.to_string()),
        }
    }
}
