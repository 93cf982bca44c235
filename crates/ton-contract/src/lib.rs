//! Contract plumbing shared by the TON contract wrappers
//!
//! - **Contract / ContractProvider / Sender**: the async seams wrappers are
//!   written against
//! - **StateInit**: deploy-time code and data, and the address they imply
//! - **InternalMessage / ExternalMessage**: message cell layouts
//! - **SendMode**: outbound message flags
//! - **TupleItem / TupleReader**: get-method stacks
//! - **Transaction / SendReport / TransactionMatcher**: what a send caused
//! - **MockProvider / MockSender**: recording stand-ins for wrapper tests
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ton_cell::Cell;
//! use ton_contract::{InternalMessage, StateInit, to_nano};
//!
//! let init = StateInit::new(Arc::new(Cell::empty()), Arc::new(Cell::empty()));
//! let address = init.address(0).unwrap();
//! let msg = InternalMessage::new(address, to_nano("1").unwrap())
//!     .with_comment("optional text here")
//!     .unwrap();
//! assert_eq!(msg.op(), Some(0));
//! ```

pub mod error;
pub mod message;
pub mod mock;
pub mod provider;
pub mod send_mode;
pub mod state_init;
pub mod transaction;
pub mod tuple;
pub mod units;

pub use error::{ContractError, ContractResult};
pub use message::{ExternalMessage, InternalMessage, body_op, comment};
pub use mock::{MockProvider, MockSender, SentMessage};
pub use provider::{Contract, ContractProvider, InternalArgs, Sender, SenderArguments};
pub use send_mode::SendMode;
pub use state_init::{StateInit, contract_address};
pub use transaction::{SendReport, Transaction, TransactionMatcher};
pub use tuple::{TupleItem, TupleReader};
pub use units::{NANO_PER_TON, from_nano, to_nano};
