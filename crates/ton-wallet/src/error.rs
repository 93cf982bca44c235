//! Error types for ton-wallet

use thiserror::Error;

use crate::verifier::Rejection;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("Contract error: {0}")]
    Contract(#[from] ton_contract::ContractError),

    #[error("Authorization rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Invalid wallet data: {0}")]
    InvalidData(String),

    #[error("Validity window overflows u32: now={now}, window={window}")]
    ValidUntilOverflow { now: u32, window: u32 },
}

pub type WalletResult<T> = Result<T, WalletError>;

impl WalletError {
    /// Exit code of an external message the wallet refused, if that is
    /// what this error is.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            WalletError::Contract(ton_contract::ContractError::ExternalNotAccepted {
                exit_code,
            }) => Some(*exit_code),
            WalletError::Rejected(rejection) => Some(rejection.exit_code()),
            _ => None,
        }
    }

    /// The protocol rejection behind this error, if any.
    pub fn rejection(&self) -> Option<Rejection> {
        self.exit_code().and_then(Rejection::from_exit_code)
    }
}
