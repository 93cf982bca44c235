use ton_cell::MsgAddress;
use ton_contract::{Contract, InternalMessage, SendMode, TransactionMatcher, to_nano};
use ton_crypto::Ed25519Keypair;
use ton_sandbox::{Blockchain, BlockchainConfig, OpenedContract, Treasury, wallet_code};
use ton_wallet::{
    AccountAuthState, AuthorizedWallet, FixedSigner, RecordingSigner, Rejection, SendMsgArgs,
    WalletConfig, default_valid_until,
};

struct Fixture {
    chain: Blockchain,
    deployer: Treasury,
    keypair: Ed25519Keypair,
    wallet: OpenedContract<AuthorizedWallet>,
}

async fn setup() -> Fixture {
    let chain = Blockchain::create(BlockchainConfig::default());
    let deployer = chain.treasury("deployer").await.unwrap();
    let keypair = Ed25519Keypair::generate();

    let config = WalletConfig {
        public_key: keypair.public_key,
    };
    let wallet = AuthorizedWallet::create_from_config(config, wallet_code(), 0).unwrap();
    let wallet = chain.open(wallet);

    let report = wallet
        .send_deploy(wallet.provider(), &deployer, to_nano("2").unwrap())
        .await
        .unwrap();
    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from(deployer.address())
            .to(wallet.address())
            .deploy(true)
            .success(true)
    ));

    Fixture {
        chain,
        deployer,
        keypair,
        wallet,
    }
}

async fn transfer(f: &Fixture, seqno: u32, to: &MsgAddress, value: u128) -> SendMsgArgs {
    SendMsgArgs {
        msg_to_send: InternalMessage::new(to.clone(), value).with_bounce(false),
        seqno,
        valid_until: default_valid_until(f.chain.now().await).unwrap(),
        mode: SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS,
    }
}

async fn stored_state(f: &Fixture) -> AccountAuthState {
    let account = f.chain.account(f.wallet.address()).await.unwrap();
    AccountAuthState::from_cell(account.data().unwrap()).unwrap()
}

#[tokio::test]
async fn test_deploy_stores_key_and_zero_seqno() {
    let f = setup().await;
    let provider = f.wallet.provider();

    assert_eq!(f.wallet.get_seqno(provider).await.unwrap(), 0);
    assert_eq!(
        f.wallet.get_public_key(provider).await.unwrap(),
        f.keypair.public_key
    );
    assert_eq!(f.chain.balance(f.wallet.address()).await, to_nano("2").unwrap());
}

#[tokio::test]
async fn test_accepted_message_dispatches() {
    let f = setup().await;
    let receiver = f.chain.treasury("receiver").await.unwrap();
    let before = receiver.balance().await;

    let value = to_nano("0.5").unwrap();
    let args = transfer(&f, 0, receiver.address(), value).await;
    let report = f
        .wallet
        .send_msg(f.wallet.provider(), args, &f.keypair)
        .await
        .unwrap();

    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from_external()
            .to(f.wallet.address())
            .success(true)
            .out_messages_count(1)
    ));
    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from(f.wallet.address())
            .to(receiver.address())
            .success(true)
    ));
    assert_eq!(receiver.balance().await, before + value);
    assert_eq!(f.wallet.get_seqno(f.wallet.provider()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_wrong_signature_rejected() {
    let f = setup().await;
    let attacker = Ed25519Keypair::generate();
    let before = stored_state(&f).await;

    let args = transfer(&f, 0, f.deployer.address(), 1).await;
    let err = f
        .wallet
        .send_msg(f.wallet.provider(), args, &attacker)
        .await
        .unwrap_err();

    assert_eq!(err.rejection(), Some(Rejection::SignatureInvalid));
    assert_eq!(stored_state(&f).await, before);
}

#[tokio::test]
async fn test_replay_rejected() {
    let f = setup().await;
    let signer = RecordingSigner::new(f.keypair.clone());
    let args = transfer(&f, 0, f.deployer.address(), 1).await;

    f.wallet
        .send_msg(f.wallet.provider(), args.clone(), &signer)
        .await
        .unwrap();
    let replay = signer.replay().unwrap();
    let err = f
        .wallet
        .send_msg(f.wallet.provider(), args, &replay)
        .await
        .unwrap_err();

    assert_eq!(err.rejection(), Some(Rejection::SeqnoMismatch));
    assert_eq!(stored_state(&f).await.seqno, 1);
}

#[tokio::test]
async fn test_expired_rejected() {
    let f = setup().await;
    let args = transfer(&f, 0, f.deployer.address(), 1).await;
    f.chain.set_now(args.valid_until + 1).await;

    let err = f
        .wallet
        .send_msg(f.wallet.provider(), args, &f.keypair)
        .await
        .unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::Expired));
    assert_eq!(stored_state(&f).await.seqno, 0);
}

#[tokio::test]
async fn test_valid_until_boundary_accepted() {
    let f = setup().await;
    let args = transfer(&f, 0, f.deployer.address(), 1).await;
    f.chain.set_now(args.valid_until).await;

    f.wallet
        .send_msg(f.wallet.provider(), args, &f.keypair)
        .await
        .unwrap();
    assert_eq!(stored_state(&f).await.seqno, 1);
}

#[tokio::test]
async fn test_rejection_is_idempotent() {
    let f = setup().await;
    let before = f.chain.account(f.wallet.address()).await.unwrap();

    for _ in 0..3 {
        let args = transfer(&f, 0, f.deployer.address(), 1).await;
        let err = f
            .wallet
            .send_msg(f.wallet.provider(), args, &FixedSigner([0; 64]))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(Rejection::SIGNATURE_INVALID_EXIT));
    }
    assert_eq!(f.chain.account(f.wallet.address()).await.unwrap(), before);
}

#[tokio::test]
async fn test_seqno_advances_by_one() {
    let f = setup().await;
    let receiver = f.chain.treasury("receiver").await.unwrap();

    for seqno in 0..5 {
        let args = transfer(&f, seqno, receiver.address(), 1).await;
        f.wallet
            .send_msg(f.wallet.provider(), args, &f.keypair)
            .await
            .unwrap();
        assert_eq!(f.wallet.get_seqno(f.wallet.provider()).await.unwrap(), seqno + 1);
    }

    let skipped = transfer(&f, 7, receiver.address(), 1).await;
    let err = f
        .wallet
        .send_msg(f.wallet.provider(), skipped, &f.keypair)
        .await
        .unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::SeqnoMismatch));
}

#[tokio::test]
async fn test_insufficient_balance_ignored() {
    let f = setup().await;
    let args = transfer(&f, 0, f.deployer.address(), to_nano("100").unwrap()).await;

    let report = f
        .wallet
        .send_msg(f.wallet.provider(), args, &f.keypair)
        .await
        .unwrap();
    let tx = &report.transactions[0];
    assert!(tx.success);
    assert_eq!(tx.out_messages_count(), 0);
    assert_eq!(stored_state(&f).await.seqno, 1);
}

#[tokio::test]
async fn test_external_to_undeployed_wallet() {
    let chain = Blockchain::create(BlockchainConfig::default());
    let keypair = Ed25519Keypair::generate();
    let contract = AuthorizedWallet::create_from_config(
        WalletConfig {
            public_key: keypair.public_key,
        },
        wallet_code(),
        0,
    )
    .unwrap();

    // By address only: nothing to deploy with.
    let bare = chain.open(AuthorizedWallet::create_from_address(contract.address().clone()));
    let args = SendMsgArgs {
        msg_to_send: InternalMessage::new(contract.address().clone(), 0),
        seqno: 0,
        valid_until: default_valid_until(chain.now().await).unwrap(),
        mode: SendMode::PAY_GAS_SEPARATELY,
    };
    assert!(bare.send_msg(bare.provider(), args.clone(), &keypair).await.is_err());

    // With its StateInit the first external deploys it.
    let wallet = chain.open(contract);
    let report = wallet
        .send_msg(wallet.provider(), args, &keypair)
        .await
        .unwrap();
    assert!(report.transactions[0].deploy);
    assert_eq!(wallet.get_seqno(wallet.provider()).await.unwrap(), 1);
    let account = chain.account(wallet.address()).await.unwrap();
    assert_eq!(account.code(), Some(&wallet_code()));
}
