//! Funded senders.

use tracing::trace;

use ton_cell::MsgAddress;
use ton_contract::{ContractResult, SendReport, Sender, SenderArguments};

use crate::Blockchain;

/// A named, pre-funded account that sends whatever it is asked to.
///
/// Sends are paid from the treasury balance through the action phase, so
/// one that asks for more than the treasury holds fails before anything
/// reaches the chain. The treasury's own side of a send is not recorded
/// as a transaction.
#[derive(Debug, Clone)]
pub struct Treasury {
    name: String,
    address: MsgAddress,
    chain: Blockchain,
}

impl Treasury {
    pub(crate) fn new(name: &str, address: MsgAddress, chain: Blockchain) -> Self {
        Treasury {
            name: name.to_string(),
            address,
            chain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &MsgAddress {
        &self.address
    }

    pub async fn balance(&self) -> u128 {
        self.chain.balance(&self.address).await
    }
}

impl Sender for Treasury {
    fn address(&self) -> Option<&MsgAddress> {
        Some(&self.address)
    }

    async fn send(&self, args: SenderArguments) -> ContractResult<SendReport> {
        trace!("Treasury {} sending {} to {}", self.name, args.value, args.to);
        Ok(self.chain.send_internal(&self.address, args).await?)
    }
}
