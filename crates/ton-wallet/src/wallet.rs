//! Wrapper for the authorized wallet contract.

use std::sync::Arc;

use tracing::debug;

use ton_cell::{Cell, MsgAddress};
use ton_contract::{
    Contract, ContractProvider, InternalArgs, InternalMessage, SendMode, SendReport, Sender,
    StateInit, TupleReader,
};
use ton_crypto::PUBLIC_KEY_BYTES;

use crate::{AccountAuthState, SignedEnvelope, Signer, UnsignedPayload, WalletError, WalletResult};

/// Deploy-time configuration: only the owner's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletConfig {
    pub public_key: [u8; PUBLIC_KEY_BYTES],
}

impl WalletConfig {
    /// Initial data cell: `seqno = 0` and the key.
    pub fn to_cell(&self) -> WalletResult<Cell> {
        AccountAuthState::new(self.public_key).to_cell()
    }
}

/// Arguments of one authorized send.
#[derive(Debug, Clone)]
pub struct SendMsgArgs {
    pub msg_to_send: InternalMessage,
    pub seqno: u32,
    pub valid_until: u32,
    pub mode: SendMode,
}

/// A wallet that dispatches one internal message per signed external
/// message.
///
/// ```
/// use std::sync::Arc;
/// use ton_cell::Cell;
/// use ton_contract::Contract;
/// use ton_crypto::Ed25519Keypair;
/// use ton_wallet::{AuthorizedWallet, WalletConfig};
///
/// let keypair = Ed25519Keypair::generate();
/// let code = Arc::new(Cell::empty());
/// let wallet = AuthorizedWallet::create_from_config(
///     WalletConfig { public_key: keypair.public_key },
///     code,
///     0,
/// )
/// .unwrap();
/// assert!(wallet.init().is_some());
/// assert_eq!(wallet.address().workchain(), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizedWallet {
    address: MsgAddress,
    init: Option<StateInit>,
}

impl AuthorizedWallet {
    pub fn create_from_address(address: MsgAddress) -> Self {
        AuthorizedWallet {
            address,
            init: None,
        }
    }

    pub fn create_from_config(
        config: WalletConfig,
        code: Arc<Cell>,
        workchain: i32,
    ) -> WalletResult<Self> {
        let init = StateInit::new(code, Arc::new(config.to_cell()?));
        Ok(AuthorizedWallet {
            address: init.address(workchain)?,
            init: Some(init),
        })
    }

    /// Fund and deploy with an empty-bodied internal message.
    pub async fn send_deploy(
        &self,
        provider: &impl ContractProvider,
        via: &impl Sender,
        value: u128,
    ) -> WalletResult<SendReport> {
        let args = InternalArgs::new(value, Cell::empty());
        Ok(provider.internal(via, args).await?)
    }

    /// Build the signed envelope for `args` without sending it.
    pub fn create_envelope(
        &self,
        args: &SendMsgArgs,
        signer: &impl Signer,
    ) -> WalletResult<SignedEnvelope> {
        let payload =
            UnsignedPayload::compose(args.seqno, args.valid_until, args.mode, &args.msg_to_send)?;
        SignedEnvelope::sign(&payload, signer)
    }

    /// Compose, sign and submit one authorized external message.
    pub async fn send_msg(
        &self,
        provider: &impl ContractProvider,
        args: SendMsgArgs,
        signer: &impl Signer,
    ) -> WalletResult<SendReport> {
        let envelope = self.create_envelope(&args, signer)?;
        debug!(
            "Submitting external to {}: seqno={} valid_until={} mode={}",
            self.address,
            args.seqno,
            args.valid_until,
            args.mode.as_u8()
        );
        Ok(provider.external(envelope.to_cell()?).await?)
    }

    pub async fn get_seqno(&self, provider: &impl ContractProvider) -> WalletResult<u32> {
        let mut stack = provider.get("seqno", vec![]).await?;
        let seqno = stack.read_number()?;
        u32::try_from(seqno)
            .map_err(|_| WalletError::InvalidData(format!("seqno {} out of range", seqno)))
    }

    pub async fn get_public_key(
        &self,
        provider: &impl ContractProvider,
    ) -> WalletResult<[u8; PUBLIC_KEY_BYTES]> {
        let stack = provider.get("get_public_key", vec![]).await?;
        read_public_key(stack)
    }
}

impl Contract for AuthorizedWallet {
    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn init(&self) -> Option<&StateInit> {
        self.init.as_ref()
    }
}

fn read_public_key(mut stack: TupleReader) -> WalletResult<[u8; PUBLIC_KEY_BYTES]> {
    let value = stack.read_big_number()?;
    let (sign, bytes) = value.to_bytes_be();
    if sign == num_bigint::Sign::Minus || bytes.len() > PUBLIC_KEY_BYTES {
        return Err(WalletError::InvalidData(format!(
            "public key {} out of range",
            value
        )));
    }
    let mut key = [0u8; PUBLIC_KEY_BYTES];
    key[PUBLIC_KEY_BYTES - bytes.len()..].copy_from_slice(&bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::{BigInt, Sign};
    use ton_contract::{MockProvider, MockSender, TupleItem};

    #[test]
    fn test_address_from_config() {
        let code = Arc::new(Cell::empty());
        let config = |byte| WalletConfig {
            public_key: [byte; 32],
        };
        let a = AuthorizedWallet::create_from_config(config(1), code.clone(), 0).unwrap();
        let b = AuthorizedWallet::create_from_config(config(2), code, 0).unwrap();
        assert_ne!(a.address(), b.address());

        let init = a.init().unwrap();
        assert_eq!(
            AccountAuthState::from_cell(&init.data).unwrap(),
            AccountAuthState::new([1; 32])
        );
        assert_eq!(
            a.address().hash_part(),
            Some(&init.to_cell().unwrap().hash())
        );

        let by_address = AuthorizedWallet::create_from_address(a.address().clone());
        assert!(by_address.init().is_none());
    }

    #[test]
    fn test_read_public_key_pads_leading_zeros() {
        let mut key = [0u8; 32];
        key[31] = 0x7F;
        let stack = TupleReader::new(vec![TupleItem::Int(BigInt::from_bytes_be(Sign::Plus, &key))]);
        assert_eq!(read_public_key(stack).unwrap(), key);

        let negative = TupleReader::new(vec![TupleItem::Int(BigInt::from(-1))]);
        assert!(read_public_key(negative).is_err());
    }

    #[tokio::test]
    async fn test_send_msg_submits_verifiable_envelope() {
        let keypair = ton_crypto::Ed25519Keypair::generate();
        let wallet = AuthorizedWallet::create_from_config(
            WalletConfig {
                public_key: keypair.public_key,
            },
            Arc::new(Cell::empty()),
            0,
        )
        .unwrap();
        let provider = MockProvider::new(wallet.address().clone());

        let args = SendMsgArgs {
            msg_to_send: InternalMessage::new(MsgAddress::internal(0, [9; 32]), 10),
            seqno: 0,
            valid_until: 100,
            mode: SendMode::PAY_GAS_SEPARATELY,
        };
        wallet.send_msg(&provider, args, &keypair).await.unwrap();

        let envelope = provider.last_external().unwrap();
        let auth = crate::verify(&AccountAuthState::new(keypair.public_key), &envelope, 100).unwrap();
        assert_eq!(auth.new_state.seqno, 1);
        assert_eq!(auth.mode, SendMode::PAY_GAS_SEPARATELY);
    }

    #[tokio::test]
    async fn test_getters_read_stack() {
        let mut provider = MockProvider::new(MsgAddress::internal(0, [1; 32]));
        provider.set_get_result("seqno", vec![TupleItem::Int(BigInt::from(4))]);
        provider.set_get_result(
            "get_public_key",
            vec![TupleItem::Int(BigInt::from_bytes_be(Sign::Plus, &[6; 32]))],
        );
        let wallet = AuthorizedWallet::create_from_address(provider.address().clone());

        assert_eq!(wallet.get_seqno(&provider).await.unwrap(), 4);
        assert_eq!(wallet.get_public_key(&provider).await.unwrap(), [6; 32]);
        assert_eq!(provider.get_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_deploy_sends_empty_body() {
        let wallet = AuthorizedWallet::create_from_config(
            WalletConfig {
                public_key: [1; 32],
            },
            Arc::new(Cell::empty()),
            0,
        )
        .unwrap();
        let provider = MockProvider::new(wallet.address().clone());
        let via = MockSender::new(MsgAddress::internal(0, [2; 32]));

        wallet.send_deploy(&provider, &via, 7).await.unwrap();
        let args = provider.last_internal().unwrap();
        assert_eq!(args.value, 7);
        assert!(args.body.is_empty());
    }
}
