//! Error types for Jetton operations.

use thiserror::Error;

/// Errors that can occur during Jetton operations.
#[derive(Debug, Error)]
pub enum JettonError {
    /// Cell operation error.
    #[error("Cell error: {0}")]
    CellError(#[from] ton_cell::CellError),

    /// Provider or get-method stack error.
    #[error("Contract error: {0}")]
    Contract(#[from] ton_contract::ContractError),

    /// Message body carries an op the contract does not handle.
    #[error("Unknown op: 0x{0:08x}")]
    UnknownOp(u32),

    /// Stored minter or wallet data does not have the expected layout.
    #[error("Invalid jetton data: {0}")]
    InvalidData(String),

    /// Get method returned unexpected result.
    #[error("Unexpected get method result: {0}")]
    UnexpectedResult(String),
}

/// Result type for Jetton operations.
pub type JettonResult<T> = Result<T, JettonError>;
