//! In-memory provider and sender that record what wrappers hand them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use ton_cell::{Cell, MsgAddress};

use crate::{
    ContractError, ContractProvider, ContractResult, InternalArgs, SendReport, Sender,
    SenderArguments, TupleItem, TupleReader,
};

/// Exit code of a get-method the contract does not define.
pub const UNKNOWN_METHOD_EXIT: i32 = 11;

/// One message a wrapper asked [`MockProvider`] to deliver.
#[derive(Debug, Clone)]
pub enum SentMessage {
    Internal {
        from: Option<MsgAddress>,
        args: InternalArgs,
    },
    External(Cell),
}

/// A provider that records sends and answers get-methods from canned
/// stacks.
///
/// ```
/// use ton_cell::{Cell, MsgAddress};
/// use ton_contract::{ContractProvider, MockProvider, TupleItem};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let mut provider = MockProvider::new(MsgAddress::internal(0, [1; 32]));
///     provider.set_get_result("seqno", vec![TupleItem::Int(3.into())]);
///
///     let mut stack = provider.get("seqno", vec![]).await.unwrap();
///     assert_eq!(stack.read_number().unwrap(), 3);
///
///     provider.external(Cell::empty()).await.unwrap();
///     assert_eq!(provider.sent().len(), 1);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockProvider {
    address: MsgAddress,
    getters: HashMap<String, Vec<TupleItem>>,
    sent: Mutex<Vec<SentMessage>>,
    get_calls: Mutex<Vec<(String, Vec<TupleItem>)>>,
}

impl MockProvider {
    pub fn new(address: MsgAddress) -> Self {
        MockProvider {
            address,
            ..Default::default()
        }
    }

    pub fn address(&self) -> &MsgAddress {
        &self.address
    }

    /// Stack returned by every later call to `method`.
    pub fn set_get_result(&mut self, method: &str, stack: Vec<TupleItem>) {
        self.getters.insert(method.to_string(), stack);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Arguments of the last internal message, if any.
    pub fn last_internal(&self) -> Option<InternalArgs> {
        self.sent().into_iter().rev().find_map(|msg| match msg {
            SentMessage::Internal { args, .. } => Some(args),
            SentMessage::External(_) => None,
        })
    }

    /// Body of the last external message, if any.
    pub fn last_external(&self) -> Option<Cell> {
        self.sent().into_iter().rev().find_map(|msg| match msg {
            SentMessage::External(body) => Some(body),
            SentMessage::Internal { .. } => None,
        })
    }

    pub fn get_calls(&self) -> Vec<(String, Vec<TupleItem>)> {
        self.get_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, msg: SentMessage) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(msg);
    }
}

impl ContractProvider for MockProvider {
    async fn internal(&self, via: &impl Sender, args: InternalArgs) -> ContractResult<SendReport> {
        self.record(SentMessage::Internal {
            from: via.address().cloned(),
            args,
        });
        Ok(SendReport::default())
    }

    async fn external(&self, body: Cell) -> ContractResult<SendReport> {
        self.record(SentMessage::External(body));
        Ok(SendReport::default())
    }

    async fn get(&self, method: &str, args: Vec<TupleItem>) -> ContractResult<TupleReader> {
        self.get_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((method.to_string(), args));
        let stack = self
            .getters
            .get(method)
            .ok_or_else(|| ContractError::GetMethodFailed {
                method: method.to_string(),
                exit_code: UNKNOWN_METHOD_EXIT,
            })?;
        Ok(TupleReader::new(stack.clone()))
    }
}

/// A sender with a fixed address that accepts everything it is given.
#[derive(Debug, Default)]
pub struct MockSender {
    address: Option<MsgAddress>,
    sent: Mutex<Vec<SenderArguments>>,
}

impl MockSender {
    pub fn new(address: MsgAddress) -> Self {
        MockSender {
            address: Some(address),
            sent: Mutex::default(),
        }
    }

    pub fn sent(&self) -> Vec<SenderArguments> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Sender for MockSender {
    fn address(&self) -> Option<&MsgAddress> {
        self.address.as_ref()
    }

    async fn send(&self, args: SenderArguments) -> ContractResult<SendReport> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args);
        Ok(SendReport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_internal_with_sender() {
        let provider = MockProvider::new(MsgAddress::internal(0, [1; 32]));
        let sender = MockSender::new(MsgAddress::internal(0, [2; 32]));

        provider
            .internal(&sender, InternalArgs::new(5, Cell::empty()))
            .await
            .unwrap();

        match &provider.sent()[0] {
            SentMessage::Internal { from, args } => {
                assert_eq!(from.as_ref(), sender.address());
                assert_eq!(args.value, 5);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(provider.last_internal().unwrap().value, 5);
        assert!(provider.last_external().is_none());
    }

    #[tokio::test]
    async fn test_unknown_getter_fails() {
        let provider = MockProvider::default();
        let err = provider.get("nope", vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            ContractError::GetMethodFailed { exit_code: UNKNOWN_METHOD_EXIT, .. }
        ));
        assert_eq!(provider.get_calls()[0].0, "nope");
    }

    #[tokio::test]
    async fn test_sender_records() {
        let sender = MockSender::new(MsgAddress::internal(0, [3; 32]));
        sender
            .send(SenderArguments {
                to: MsgAddress::internal(0, [4; 32]),
                value: 1,
                bounce: true,
                send_mode: crate::SendMode::PAY_GAS_SEPARATELY,
                init: None,
                body: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(sender.sent().len(), 1);
    }
}
