//! Chain configuration.

use ton_contract::NANO_PER_TON;

/// Unix time the chain starts at unless configured otherwise.
pub const DEFAULT_NOW: u32 = 1_700_000_000;

/// Starting balance of every treasury: one million TON.
pub const DEFAULT_TREASURY_BALANCE: u128 = 1_000_000 * NANO_PER_TON;

/// Upper bound on transactions caused by one submitted message.
pub const DEFAULT_MAX_TRANSACTIONS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockchainConfig {
    /// Initial chain time. Later changed with `Blockchain::set_now`.
    pub now: u32,
    pub treasury_balance: u128,
    /// Workchain treasuries are created in.
    pub workchain: i32,
    pub max_transactions: usize,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        BlockchainConfig {
            now: DEFAULT_NOW,
            treasury_balance: DEFAULT_TREASURY_BALANCE,
            workchain: 0,
            max_transactions: DEFAULT_MAX_TRANSACTIONS,
        }
    }
}
