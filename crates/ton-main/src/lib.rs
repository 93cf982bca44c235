//! Wrapper for the forwarding contract.
//!
//! The contract stores one address. An `op = 1` message from that address
//! is answered with a message back to it carrying the remaining value;
//! anyone else gets exit code [`ERR_WRONG_SENDER`].

pub mod contract;
pub mod error;

pub use contract::{
    ERR_UNKNOWN_OP, ERR_WRONG_SENDER, MainConfig, MainContract, OP_SEND_MESSAGE,
};
pub use error::{MainError, MainResult};
