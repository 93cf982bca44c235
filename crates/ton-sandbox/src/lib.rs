//! # ton-sandbox
//!
//! An in-memory chain for integration tests of the contract wrappers.
//!
//! - **Blockchain**: accounts, logical time and chain time behind one lock
//! - **Treasury**: named, funded senders
//! - **SandboxProvider / OpenedContract**: a [`ton_contract::ContractProvider`]
//!   bound to one address on the chain
//! - **ContractHandler**: native stand-in for a contract's code, with
//!   reference handlers for the authorized wallet, the forwarding contract
//!   and the jetton minter
//!
//! Messages are processed to completion, breadth-first, before a send
//! returns. There are no fees and no TVM: a code cell is identified by its
//! hash and run by whichever handler is registered for it. Code nobody
//! registered accepts every internal message.
//!
//! ## Example
//!
//! ```rust
//! use ton_contract::{Contract, TransactionMatcher, to_nano};
//! use ton_main::{MainConfig, MainContract};
//! use ton_sandbox::{Blockchain, BlockchainConfig, main_code};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let chain = Blockchain::create(BlockchainConfig::default());
//!     let deployer = chain.treasury("deployer").await.unwrap();
//!
//!     let config = MainConfig { addr: deployer.address().clone() };
//!     let contract = MainContract::create_from_config(&config, main_code(), 0).unwrap();
//!     let main = chain.open(contract);
//!
//!     let value = to_nano("0.05").unwrap();
//!     let report = main.send_deploy(main.provider(), &deployer, value).await.unwrap();
//!     assert!(report.has_transaction(
//!         &TransactionMatcher::new().to(main.address()).deploy(true).success(true)
//!     ));
//! }
//! ```

pub mod account;
pub mod chain;
pub mod config;
pub mod error;
pub mod handler;
pub mod main_handler;
pub mod minter_handler;
pub mod provider;
pub mod treasury;
pub mod wallet_handler;

pub use account::{Account, AccountState};
pub use chain::{ACTION_INVALID_MESSAGE, ACTION_NOT_ENOUGH_BALANCE, BOUNCE_OP, Blockchain};
pub use config::BlockchainConfig;
pub use error::{SandboxError, SandboxResult};
pub use handler::{
    AcceptAll, ComputeResult, ContractHandler, Effects, ExitCode, GetContext, MessageContext,
    OutAction, code_cell, jetton_wallet_code, main_code, minter_code, wallet_code,
};
pub use main_handler::MainHandler;
pub use minter_handler::{ERR_NOT_ADMIN, MinterHandler};
pub use provider::{OpenedContract, SandboxProvider};
pub use treasury::Treasury;
pub use wallet_handler::{ERR_CORRUPT_STATE, WalletHandler};
