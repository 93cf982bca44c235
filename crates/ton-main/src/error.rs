//! Error types for ton-main

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("Contract error: {0}")]
    Contract(#[from] ton_contract::ContractError),
}

pub type MainResult<T> = Result<T, MainError>;
