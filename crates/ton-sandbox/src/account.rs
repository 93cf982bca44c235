//! Account snapshots.

use std::sync::Arc;

use ton_cell::{Cell, MsgAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    /// Holds a balance but no code yet.
    Uninit,
    Active { code: Arc<Cell>, data: Arc<Cell> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: MsgAddress,
    pub balance: u128,
    pub state: AccountState,
}

impl Account {
    pub fn uninit(address: MsgAddress) -> Self {
        Account {
            address,
            balance: 0,
            state: AccountState::Uninit,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AccountState::Active { .. })
    }

    pub fn code(&self) -> Option<&Arc<Cell>> {
        match &self.state {
            AccountState::Active { code, .. } => Some(code),
            AccountState::Uninit => None,
        }
    }

    pub fn data(&self) -> Option<&Arc<Cell>> {
        match &self.state {
            AccountState::Active { data, .. } => Some(data),
            AccountState::Uninit => None,
        }
    }
}
