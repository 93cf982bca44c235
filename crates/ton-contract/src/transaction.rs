//! Transaction summaries and matchers for asserting on them.

use std::fmt;

use ton_cell::MsgAddress;

use crate::InternalMessage;

/// What happened when one account processed one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub lt: u64,
    pub now: u32,
    /// `None` for inbound external messages.
    pub from: Option<MsgAddress>,
    pub to: MsgAddress,
    pub value: u128,
    pub op: Option<u32>,
    pub deploy: bool,
    pub success: bool,
    pub aborted: bool,
    /// The inbound message was itself a bounce.
    pub bounced: bool,
    pub exit_code: i32,
    pub action_result_code: i32,
    pub out_messages: Vec<InternalMessage>,
}

impl Transaction {
    pub fn out_messages_count(&self) -> usize {
        self.out_messages.len()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self
            .from
            .as_ref()
            .map(MsgAddress::to_raw_string)
            .unwrap_or_else(|| "external".to_string());
        write!(
            f,
            "lt={} {} -> {} op={:?} value={} deploy={} success={} aborted={} exit={} action={} out={}",
            self.lt,
            from,
            self.to,
            self.op,
            self.value,
            self.deploy,
            self.success,
            self.aborted,
            self.exit_code,
            self.action_result_code,
            self.out_messages.len()
        )
    }
}

/// The transactions caused by one submitted message, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    pub transactions: Vec<Transaction>,
}

impl SendReport {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        SendReport { transactions }
    }

    pub fn find(&self, matcher: &TransactionMatcher) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| matcher.matches(tx))
    }

    pub fn has_transaction(&self, matcher: &TransactionMatcher) -> bool {
        self.find(matcher).is_some()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl fmt::Display for SendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tx in &self.transactions {
            writeln!(f, "{}", tx)?;
        }
        Ok(())
    }
}

/// Partial pattern over [`Transaction`]; unset fields match anything.
///
/// ```
/// use ton_cell::MsgAddress;
/// use ton_contract::{SendReport, TransactionMatcher};
///
/// let wallet = MsgAddress::internal(0, [1; 32]);
/// let matcher = TransactionMatcher::new().to(&wallet).success(true).out_messages_count(1);
/// assert!(!SendReport::default().has_transaction(&matcher));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionMatcher {
    from: Option<Option<MsgAddress>>,
    to: Option<MsgAddress>,
    op: Option<u32>,
    deploy: Option<bool>,
    success: Option<bool>,
    aborted: Option<bool>,
    exit_code: Option<i32>,
    action_result_code: Option<i32>,
    out_messages_count: Option<usize>,
}

impl TransactionMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, address: &MsgAddress) -> Self {
        self.from = Some(Some(address.clone()));
        self
    }

    /// Match only transactions triggered by an inbound external message.
    pub fn from_external(mut self) -> Self {
        self.from = Some(None);
        self
    }

    pub fn to(mut self, address: &MsgAddress) -> Self {
        self.to = Some(address.clone());
        self
    }

    pub fn op(mut self, op: u32) -> Self {
        self.op = Some(op);
        self
    }

    pub fn deploy(mut self, deploy: bool) -> Self {
        self.deploy = Some(deploy);
        self
    }

    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn aborted(mut self, aborted: bool) -> Self {
        self.aborted = Some(aborted);
        self
    }

    pub fn exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    pub fn action_result_code(mut self, code: i32) -> Self {
        self.action_result_code = Some(code);
        self
    }

    pub fn out_messages_count(mut self, count: usize) -> Self {
        self.out_messages_count = Some(count);
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        fn check<T: PartialEq>(want: &Option<T>, have: &T) -> bool {
            want.as_ref().is_none_or(|w| w == have)
        }

        check(&self.from, &tx.from)
            && check(&self.to, &tx.to)
            && self.op.is_none_or(|op| tx.op == Some(op))
            && check(&self.deploy, &tx.deploy)
            && check(&self.success, &tx.success)
            && check(&self.aborted, &tx.aborted)
            && check(&self.exit_code, &tx.exit_code)
            && check(&self.action_result_code, &tx.action_result_code)
            && check(&self.out_messages_count, &tx.out_messages.len())
    }
}
