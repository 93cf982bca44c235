//! Error types for ton-contract

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Get-method stack underflow")]
    TupleUnderflow,

    #[error("Get-method stack type mismatch: expected {expected}, found {found}")]
    TupleType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Get-method {method} failed with exit code {exit_code}")]
    GetMethodFailed { method: String, exit_code: i32 },

    /// The contract refused to accept an inbound external message.
    #[error("External message not accepted, exit code {exit_code}")]
    ExternalNotAccepted { exit_code: i32 },

    #[error("Provider error: {0}")]
    Provider(String),
}

pub type ContractResult<T> = Result<T, ContractError>;
