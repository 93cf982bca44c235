//! # ton-jetton
//!
//! Wrappers for the two contracts of a TEP-74 fungible token.
//!
//! - **Minter**: holds the total supply and the wallet code, mints to
//!   holders, relays admin messages to their wallets (`call_to`) and can be
//!   upgraded in place.
//! - **Jetton Wallet**: one per holder, at an address derived from the
//!   minter's wallet code, the holder and the minter.
//!
//! ## Operation Codes
//!
//! - `mint` (21), `call_to` (6), `upgrade` (5): admin messages to the minter
//! - `internal_transfer` (0x178d4519): minter to holder wallet on mint
//! - `burn` (0x595f07bc), `transfer` (0x0f8a7ea5): holder wallet ops
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ton_cell::{Cell, MsgAddress};
//! use ton_contract::Contract;
//! use ton_jetton::{Minter, MinterConfig, jetton_wallet_address};
//!
//! let admin = MsgAddress::internal(0, [0x12; 32]);
//! let wallet_code = Arc::new(Cell::empty());
//! let config = MinterConfig {
//!     admin_address: admin.clone(),
//!     jetton_wallet_code: wallet_code.clone(),
//! };
//! let minter = Minter::create_from_config(&config, Arc::new(Cell::empty()), 0).unwrap();
//!
//! let holder = MsgAddress::internal(0, [0x34; 32]);
//! let wallet = jetton_wallet_address(&holder, minter.address(), wallet_code, 0).unwrap();
//! assert_ne!(&wallet, minter.address());
//! ```

pub mod error;
pub mod minter;
pub mod wallet;

pub use error::{JettonError, JettonResult};
pub use minter::{
    CallToArgs, JettonData, MintArgs, Minter, MinterConfig, MinterData, MinterRequest,
    OP_CALL_TO, OP_MINT, OP_UPGRADE, UpgradeArgs,
};
pub use wallet::{
    InternalTransfer, JettonWallet, JettonWalletData, jetton_wallet_address,
    jetton_wallet_state_init,
};

// Re-export operation codes
pub use wallet::opcodes::{OP_BURN, OP_INTERNAL_TRANSFER, OP_TRANSFER};
