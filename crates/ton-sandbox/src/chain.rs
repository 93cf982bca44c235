//! The in-memory chain.
//!
//! Every submitted message is processed to completion before the call
//! returns: the transaction it causes, then the messages that transaction
//! sent, breadth-first. All state sits behind one lock, so an account
//! never processes two messages at once.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use ton_cell::{Cell, CellBuilder, CellResult, CellSlice, MsgAddress};
use ton_contract::{
    Contract, ContractError, InternalMessage, SendMode, SendReport, SenderArguments, StateInit,
    Transaction, TupleItem, TupleReader, body_op,
};
use ton_crypto::sha256;

use crate::account::{Account, AccountState};
use crate::config::BlockchainConfig;
use crate::handler::{
    AcceptAll, ContractHandler, Effects, GetContext, MessageContext, OutAction, code_cell,
    main_code, minter_code, wallet_code,
};
use crate::main_handler::MainHandler;
use crate::minter_handler::MinterHandler;
use crate::provider::OpenedContract;
use crate::treasury::Treasury;
use crate::wallet_handler::WalletHandler;
use crate::{SandboxError, SandboxResult};

/// Action phase result code for an outbound message that does not parse.
pub const ACTION_INVALID_MESSAGE: i32 = 34;

/// Action phase result code for a send the balance cannot cover.
pub const ACTION_NOT_ENOUGH_BALANCE: i32 = 37;

/// Op prefix of a bounced message body.
pub const BOUNCE_OP: u32 = 0xffff_ffff;

/// Bits of the inbound body kept after [`BOUNCE_OP`].
const BOUNCE_BODY_BITS: usize = 256;

pub type SharedChainState = Arc<Mutex<ChainState>>;

/// Handle to an in-memory chain. Clones share the same state.
///
/// ```
/// use ton_sandbox::{Blockchain, BlockchainConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let chain = Blockchain::create(BlockchainConfig::default());
///     let alice = chain.treasury("alice").await.unwrap();
///     let again = chain.treasury("alice").await.unwrap();
///     assert_eq!(alice.address(), again.address());
///     assert!(chain.account(alice.address()).await.unwrap().is_active());
/// }
/// ```
#[derive(Clone)]
pub struct Blockchain {
    state: SharedChainState,
}

pub struct ChainState {
    config: BlockchainConfig,
    now: u32,
    lt: u64,
    accounts: HashMap<MsgAddress, Account>,
    handlers: HashMap<[u8; 32], Arc<dyn ContractHandler>>,
}

struct ActionOutcome {
    balance: u128,
    messages: Vec<InternalMessage>,
    destroy: bool,
}

impl fmt::Debug for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blockchain").finish_non_exhaustive()
    }
}

impl Blockchain {
    /// A chain with the reference wallet, main and minter handlers bound
    /// to [`wallet_code`], [`main_code`] and [`minter_code`].
    pub fn create(config: BlockchainConfig) -> Self {
        let mut handlers: HashMap<[u8; 32], Arc<dyn ContractHandler>> = HashMap::new();
        handlers.insert(wallet_code().hash(), Arc::new(WalletHandler));
        handlers.insert(main_code().hash(), Arc::new(MainHandler));
        handlers.insert(minter_code().hash(), Arc::new(MinterHandler));

        let state = ChainState {
            now: config.now,
            config,
            lt: 0,
            accounts: HashMap::new(),
            handlers,
        };
        Blockchain {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Bind `code` to `handler`, replacing any earlier binding.
    pub async fn register_code(&self, code: &Cell, handler: impl ContractHandler + 'static) {
        let mut state = self.state.lock().await;
        state.handlers.insert(code.hash(), Arc::new(handler));
    }

    pub async fn now(&self) -> u32 {
        self.state.lock().await.now
    }

    pub async fn set_now(&self, now: u32) {
        self.state.lock().await.now = now;
    }

    /// A funded sender named `name`. The same name always yields the same
    /// address; the account is created on first use.
    pub async fn treasury(&self, name: &str) -> SandboxResult<Treasury> {
        let init = treasury_init(name)?;
        let mut state = self.state.lock().await;
        let address = init.address(state.config.workchain)?;

        if !state.accounts.contains_key(&address) {
            debug!("Created treasury {} at {}", name, address);
            let account = Account {
                address: address.clone(),
                balance: state.config.treasury_balance,
                state: AccountState::Active {
                    code: init.code,
                    data: init.data,
                },
            };
            state.accounts.insert(address.clone(), account);
        }
        Ok(Treasury::new(name, address, self.clone()))
    }

    /// Wrap `contract` with a provider bound to its address.
    pub fn open<C: Contract>(&self, contract: C) -> OpenedContract<C> {
        OpenedContract::new(self.clone(), contract)
    }

    pub async fn account(&self, address: &MsgAddress) -> Option<Account> {
        self.state.lock().await.accounts.get(address).cloned()
    }

    pub async fn balance(&self, address: &MsgAddress) -> u128 {
        self.account(address).await.map_or(0, |account| account.balance)
    }

    pub(crate) async fn is_active(&self, address: &MsgAddress) -> bool {
        self.account(address).await.is_some_and(|account| account.is_active())
    }

    /// Send `args` from the active account `src`, paying from its balance.
    pub(crate) async fn send_internal(
        &self,
        src: &MsgAddress,
        args: SenderArguments,
    ) -> SandboxResult<SendReport> {
        let mut msg = InternalMessage::new(args.to, args.value)
            .with_bounce(args.bounce)
            .with_body(args.body);
        if let Some(init) = args.init {
            msg = msg.with_init(init);
        }
        let action = OutAction {
            mode: args.send_mode,
            message: Arc::new(msg.to_cell()?),
        };

        let mut state = self.state.lock().await;
        state.atomically(|state| {
            let mut sender = state
                .accounts
                .get(src)
                .filter(|account| account.is_active())
                .cloned()
                .ok_or_else(|| SandboxError::AccountNotActive(src.clone()))?;
            let outcome = state
                .action_phase(src, sender.balance, 0, &[action])
                .map_err(|result_code| SandboxError::ActionFailed {
                    address: src.clone(),
                    result_code,
                })?;
            sender.balance = outcome.balance;
            state.accounts.insert(src.clone(), sender);

            state.run(Vec::new(), outcome.messages)
        })
    }

    /// Submit an inbound external message. A rejection records nothing
    /// and surfaces as [`ContractError::ExternalNotAccepted`].
    pub(crate) async fn send_external(
        &self,
        dest: &MsgAddress,
        init: Option<&StateInit>,
        body: Cell,
    ) -> SandboxResult<SendReport> {
        let mut state = self.state.lock().await;
        state.atomically(|state| {
            let tx = state.execute_external(dest, init, &body)?;
            let queue = tx.out_messages.clone();
            state.run(vec![tx], queue)
        })
    }

    pub(crate) async fn run_get_method(
        &self,
        address: &MsgAddress,
        method: &str,
        args: Vec<TupleItem>,
    ) -> SandboxResult<TupleReader> {
        let state = self.state.lock().await;
        let account = state
            .accounts
            .get(address)
            .ok_or_else(|| SandboxError::AccountNotActive(address.clone()))?;
        let AccountState::Active { code, data } = &account.state else {
            return Err(SandboxError::AccountNotActive(address.clone()));
        };

        let ctx = GetContext {
            now: state.now,
            address,
            balance: account.balance,
            data,
        };
        let stack = state
            .handler(code)
            .get(&ctx, method, &args)
            .map_err(|exit| ContractError::GetMethodFailed {
                method: method.to_string(),
                exit_code: exit.0,
            })?;
        trace!("Get-method {} on {} returned {} items", method, address, stack.len());
        Ok(TupleReader::new(stack))
    }
}

impl ChainState {
    fn next_lt(&mut self) -> u64 {
        self.lt += 1;
        self.lt
    }

    /// Run `submit` and undo every account and lt change it made if it
    /// fails, so a rejected submission leaves the chain as it was.
    fn atomically<T>(
        &mut self,
        submit: impl FnOnce(&mut Self) -> SandboxResult<T>,
    ) -> SandboxResult<T> {
        let accounts = self.accounts.clone();
        let lt = self.lt;
        let result = submit(self);
        if result.is_err() {
            self.accounts = accounts;
            self.lt = lt;
        }
        result
    }

    fn handler(&self, code: &Cell) -> Arc<dyn ContractHandler> {
        self.handlers
            .get(&code.hash())
            .cloned()
            .unwrap_or_else(|| Arc::new(AcceptAll))
    }

    /// Process `queue` breadth-first, appending to `transactions`.
    fn run(
        &mut self,
        mut transactions: Vec<Transaction>,
        queue: Vec<InternalMessage>,
    ) -> SandboxResult<SendReport> {
        let mut queue = VecDeque::from(queue);
        while let Some(msg) = queue.pop_front() {
            if transactions.len() >= self.config.max_transactions {
                warn!(
                    "Rolling back: {} messages still queued after {} transactions",
                    queue.len() + 1,
                    transactions.len()
                );
                return Err(SandboxError::TransactionLimit(self.config.max_transactions));
            }
            let tx = self.execute_internal(msg);
            debug!("Transaction {}", tx);
            queue.extend(tx.out_messages.iter().cloned());
            transactions.push(tx);
        }
        Ok(SendReport::new(transactions))
    }

    /// Code and data to run with: the active state, or the attached
    /// StateInit when it matches an uninitialized address.
    fn runnable_state(
        account: &Account,
        init: Option<&StateInit>,
    ) -> Option<(Arc<Cell>, Arc<Cell>, bool)> {
        match &account.state {
            AccountState::Active { code, data } => Some((code.clone(), data.clone(), false)),
            AccountState::Uninit => {
                let workchain = account.address.workchain().unwrap_or(0);
                init.filter(|init| init.address(workchain).ok().as_ref() == Some(&account.address))
                    .map(|init| (init.code.clone(), init.data.clone(), true))
            }
        }
    }

    fn execute_internal(&mut self, msg: InternalMessage) -> Transaction {
        let lt = self.next_lt();
        let mut account = self
            .accounts
            .remove(&msg.dest)
            .unwrap_or_else(|| Account::uninit(msg.dest.clone()));
        account.balance = account.balance.saturating_add(msg.value);

        let mut tx = Transaction {
            lt,
            now: self.now,
            from: Some(msg.src.clone()),
            to: msg.dest.clone(),
            value: msg.value,
            op: body_op(&msg.body),
            deploy: false,
            success: false,
            aborted: true,
            bounced: msg.bounced,
            exit_code: 0,
            action_result_code: 0,
            out_messages: Vec::new(),
        };

        let Some((code, data, deploying)) = Self::runnable_state(&account, msg.init.as_ref())
        else {
            trace!("No state to run at {}, compute skipped", account.address);
            self.bounce(&mut account, &msg, &mut tx);
            self.accounts.insert(account.address.clone(), account);
            return tx;
        };

        let ctx = MessageContext {
            now: self.now,
            address: &msg.dest,
            balance: account.balance,
            data: &data,
            src: Some(&msg.src),
            value: msg.value,
            bounced: msg.bounced,
            body: &msg.body,
        };
        let handler = self.handler(&code);
        match handler.receive_internal(&ctx) {
            Err(exit) => {
                tx.exit_code = exit.0;
                self.bounce(&mut account, &msg, &mut tx);
            }
            Ok(effects) => {
                let destroy =
                    self.apply(&mut account, &mut tx, code, data, effects, msg.value);
                tx.deploy = deploying && tx.success;
                if destroy {
                    debug!("Destroyed {}", account.address);
                    return tx;
                }
                if !tx.success {
                    self.bounce(&mut account, &msg, &mut tx);
                }
            }
        }
        self.accounts.insert(account.address.clone(), account);
        tx
    }

    fn execute_external(
        &mut self,
        dest: &MsgAddress,
        init: Option<&StateInit>,
        body: &Cell,
    ) -> SandboxResult<Transaction> {
        let mut account = self
            .accounts
            .get(dest)
            .cloned()
            .unwrap_or_else(|| Account::uninit(dest.clone()));
        let (code, data, deploying) = Self::runnable_state(&account, init)
            .ok_or_else(|| SandboxError::AccountNotActive(dest.clone()))?;

        let ctx = MessageContext {
            now: self.now,
            address: dest,
            balance: account.balance,
            data: &data,
            src: None,
            value: 0,
            bounced: false,
            body,
        };
        let effects = self.handler(&code).receive_external(&ctx).map_err(|exit| {
            warn!("External message to {} not accepted: {}", dest, exit);
            ContractError::ExternalNotAccepted { exit_code: exit.0 }
        })?;

        let mut tx = Transaction {
            lt: self.next_lt(),
            now: self.now,
            from: None,
            to: dest.clone(),
            value: 0,
            op: body_op(body),
            deploy: false,
            success: false,
            aborted: true,
            bounced: false,
            exit_code: 0,
            action_result_code: 0,
            out_messages: Vec::new(),
        };
        let destroy = self.apply(&mut account, &mut tx, code, data, effects, 0);
        tx.deploy = deploying && tx.success;
        debug!("Transaction {}", tx);
        if destroy {
            self.accounts.remove(dest);
        } else {
            self.accounts.insert(dest.clone(), account);
        }
        Ok(tx)
    }

    /// Run the action phase for `effects` and commit them if it succeeds.
    /// Returns true when the account destroyed itself.
    fn apply(
        &mut self,
        account: &mut Account,
        tx: &mut Transaction,
        code: Arc<Cell>,
        data: Arc<Cell>,
        effects: Effects,
        incoming: u128,
    ) -> bool {
        let address = account.address.clone();
        match self.action_phase(&address, account.balance, incoming, &effects.actions) {
            Ok(outcome) => {
                account.balance = outcome.balance;
                account.state = AccountState::Active {
                    code: effects.code.unwrap_or(code),
                    data: effects.data.unwrap_or(data),
                };
                tx.success = true;
                tx.aborted = false;
                tx.out_messages = outcome.messages;
                outcome.destroy
            }
            Err(result_code) => {
                debug!("Action phase at {} failed with {}", address, result_code);
                tx.action_result_code = result_code;
                false
            }
        }
    }

    /// Turn send actions into outbound messages. Nothing is applied on
    /// error; the error is the action result code.
    fn action_phase(
        &mut self,
        src: &MsgAddress,
        balance: u128,
        incoming: u128,
        actions: &[OutAction],
    ) -> Result<ActionOutcome, i32> {
        let mut outcome = ActionOutcome {
            balance,
            messages: Vec::new(),
            destroy: false,
        };
        for action in actions {
            let ignore_errors = action.mode.contains(SendMode::IGNORE_ERRORS);
            let mut msg = match InternalMessage::from_cell(&action.message) {
                Ok(msg) => msg,
                Err(_) if ignore_errors => continue,
                Err(_) => return Err(ACTION_INVALID_MESSAGE),
            };

            let value = if action.mode.contains(SendMode::CARRY_ALL_BALANCE) {
                outcome.balance
            } else if action.mode.contains(SendMode::CARRY_ALL_REMAINING_INCOMING_VALUE) {
                msg.value.saturating_add(incoming)
            } else {
                msg.value
            };
            if value > outcome.balance {
                if ignore_errors {
                    trace!("Skipped send of {} from {}: balance {}", value, src, outcome.balance);
                    continue;
                }
                return Err(ACTION_NOT_ENOUGH_BALANCE);
            }

            outcome.balance -= value;
            msg.src = src.clone();
            msg.value = value;
            msg.bounced = false;
            msg.created_lt = self.next_lt();
            msg.created_at = self.now;
            outcome.messages.push(msg);

            if action.mode.contains(SendMode::CARRY_ALL_BALANCE | SendMode::DESTROY_ACCOUNT_IF_ZERO)
                && outcome.balance == 0
            {
                outcome.destroy = true;
            }
        }
        Ok(outcome)
    }

    /// Return the inbound value to its sender if the message asked for it.
    fn bounce(&mut self, account: &mut Account, msg: &InternalMessage, tx: &mut Transaction) {
        if !msg.bounce || msg.bounced {
            return;
        }
        let body = match bounce_body(&msg.body) {
            Ok(body) => body,
            Err(e) => {
                warn!("Cannot build bounce body for {}: {}", msg.dest, e);
                return;
            }
        };
        let value = msg.value.min(account.balance);
        account.balance -= value;

        let mut bounce = InternalMessage::new(msg.src.clone(), value)
            .with_bounce(false)
            .with_body(Arc::new(body));
        bounce.src = account.address.clone();
        bounce.bounced = true;
        bounce.created_lt = self.next_lt();
        bounce.created_at = self.now;
        tx.out_messages.push(bounce);
    }
}

fn treasury_init(name: &str) -> SandboxResult<StateInit> {
    let mut data = CellBuilder::new();
    data.store_bytes(&sha256(name.as_bytes()))?;
    Ok(StateInit::new(code_cell("treasury"), Arc::new(data.build()?)))
}

/// `0xffffffff` followed by the first 256 bits of `body`.
fn bounce_body(body: &Cell) -> CellResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_u32(BOUNCE_OP)?;
    let mut slice = CellSlice::new(body);
    for _ in 0..slice.bits_left().min(BOUNCE_BODY_BITS) {
        builder.store_bit(slice.load_bit()?)?;
    }
    builder.build()
}
