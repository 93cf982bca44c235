//! Contract providers backed by a [`Blockchain`].

use std::ops::Deref;

use ton_cell::{Cell, MsgAddress};
use ton_contract::{
    Contract, ContractProvider, ContractResult, InternalArgs, SendReport, Sender, SenderArguments,
    StateInit, TupleItem, TupleReader,
};

use crate::Blockchain;

/// Provider bound to one address on a [`Blockchain`].
///
/// Internal messages carry the contract's StateInit for as long as the
/// account is not active, so the first message deploys it.
#[derive(Debug, Clone)]
pub struct SandboxProvider {
    chain: Blockchain,
    address: MsgAddress,
    init: Option<StateInit>,
}

impl SandboxProvider {
    pub fn new(chain: Blockchain, address: MsgAddress, init: Option<StateInit>) -> Self {
        SandboxProvider {
            chain,
            address,
            init,
        }
    }

    pub fn address(&self) -> &MsgAddress {
        &self.address
    }
}

impl ContractProvider for SandboxProvider {
    async fn internal(&self, via: &impl Sender, args: InternalArgs) -> ContractResult<SendReport> {
        let init = if self.chain.is_active(&self.address).await {
            None
        } else {
            self.init.clone()
        };
        via.send(SenderArguments {
            to: self.address.clone(),
            value: args.value,
            bounce: args.bounce.unwrap_or(true),
            send_mode: args.send_mode,
            init,
            body: args.body,
        })
        .await
    }

    async fn external(&self, body: Cell) -> ContractResult<SendReport> {
        let init = if self.chain.is_active(&self.address).await {
            None
        } else {
            self.init.as_ref()
        };
        Ok(self.chain.send_external(&self.address, init, body).await?)
    }

    async fn get(&self, method: &str, args: Vec<TupleItem>) -> ContractResult<TupleReader> {
        Ok(self.chain.run_get_method(&self.address, method, args).await?)
    }
}

/// A contract wrapper paired with the provider that reaches it.
///
/// Derefs to the wrapper, so its methods are called directly and handed
/// [`OpenedContract::provider`].
#[derive(Debug, Clone)]
pub struct OpenedContract<C> {
    contract: C,
    provider: SandboxProvider,
}

impl<C: Contract> OpenedContract<C> {
    pub(crate) fn new(chain: Blockchain, contract: C) -> Self {
        let provider =
            SandboxProvider::new(chain, contract.address().clone(), contract.init().cloned());
        OpenedContract { contract, provider }
    }

    pub fn provider(&self) -> &SandboxProvider {
        &self.provider
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn into_inner(self) -> C {
        self.contract
    }
}

impl<C> Deref for OpenedContract<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.contract
    }
}
