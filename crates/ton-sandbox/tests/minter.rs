use std::sync::Arc;

use ton_cell::{Cell, MsgAddress};
use ton_contract::{Contract, TransactionMatcher, to_nano};
use ton_jetton::{
    CallToArgs, JettonWallet, MintArgs, Minter, MinterConfig, MinterData, OP_CALL_TO, OP_MINT,
    UpgradeArgs, jetton_wallet_address,
};
use ton_sandbox::{
    ACTION_NOT_ENOUGH_BALANCE, Blockchain, BlockchainConfig, ERR_NOT_ADMIN, OpenedContract,
    Treasury, jetton_wallet_code, minter_code,
};

struct Fixture {
    chain: Blockchain,
    admin: Treasury,
    minter: OpenedContract<Minter>,
}

async fn setup() -> Fixture {
    let chain = Blockchain::create(BlockchainConfig::default());
    let admin = chain.treasury("admin").await.unwrap();

    let config = MinterConfig {
        admin_address: admin.address().clone(),
        jetton_wallet_code: jetton_wallet_code(),
    };
    let minter = Minter::create_from_config(&config, minter_code(), 0).unwrap();
    let minter = chain.open(minter);

    let report = minter
        .send_deploy(minter.provider(), &admin, to_nano("0.05").unwrap())
        .await
        .unwrap();
    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from(admin.address())
            .to(minter.address())
            .deploy(true)
            .success(true)
    ));

    Fixture {
        chain,
        admin,
        minter,
    }
}

fn holder() -> MsgAddress {
    MsgAddress::internal(0, rand::random())
}

#[tokio::test]
async fn test_deploy_data() {
    let f = setup().await;
    let provider = f.minter.provider();

    assert_eq!(f.minter.get_total_supply(provider).await.unwrap(), 0);
    assert_eq!(
        f.minter.get_admin_address(provider).await.unwrap(),
        *f.admin.address()
    );
    assert_eq!(
        f.minter.get_wallet_code(provider).await.unwrap(),
        jetton_wallet_code()
    );
    assert!(f.minter.get_jetton_data(provider).await.unwrap().mintable);
}

#[tokio::test]
async fn test_mint() {
    let f = setup().await;
    let to = holder();

    let report = f
        .minter
        .send_mint(
            f.minter.provider(),
            &f.admin,
            MintArgs {
                to_address: to.clone(),
                jetton_amount: 100,
                amount: to_nano("0.05").unwrap(),
                value: to_nano("0.1").unwrap(),
            },
        )
        .await
        .unwrap();

    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from(f.admin.address())
            .to(f.minter.address())
            .op(OP_MINT)
            .success(true)
            .out_messages_count(1)
    ));
    assert_eq!(
        f.minter.get_total_supply(f.minter.provider()).await.unwrap(),
        100
    );

    let wallet = JettonWallet::for_owner(&to, f.minter.address(), jetton_wallet_code(), 0).unwrap();
    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from(f.minter.address())
            .to(wallet.address())
            .deploy(true)
    ));
    assert_eq!(
        f.chain.balance(wallet.address()).await,
        to_nano("0.05").unwrap()
    );
}

#[tokio::test]
async fn test_get_wallet_address() {
    let f = setup().await;
    let owner = holder();

    let from_chain = f
        .minter
        .get_wallet_address(f.minter.provider(), &owner)
        .await
        .unwrap();
    let local = jetton_wallet_address(&owner, f.minter.address(), jetton_wallet_code(), 0).unwrap();
    assert_eq!(from_chain, local);
}

#[tokio::test]
async fn test_call_to() {
    let f = setup().await;
    let to = holder();
    let burn = JettonWallet::create_burn_body(0, 1, f.admin.address(), None).unwrap();

    let report = f
        .minter
        .send_call_to(
            f.minter.provider(),
            &f.admin,
            CallToArgs {
                to_address: to,
                amount: to_nano("2").unwrap(),
                master_msg: burn,
                value: to_nano("2.5").unwrap(),
            },
        )
        .await
        .unwrap();

    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from(f.admin.address())
            .to(f.minter.address())
            .op(OP_CALL_TO)
            .success(true)
            .out_messages_count(1)
    ));
}

#[tokio::test]
async fn test_call_to_without_funds() {
    let f = setup().await;
    let burn = JettonWallet::create_burn_body(0, 1, f.admin.address(), None).unwrap();

    let report = f
        .minter
        .send_call_to(
            f.minter.provider(),
            &f.admin,
            CallToArgs {
                to_address: holder(),
                amount: to_nano("2").unwrap(),
                master_msg: burn,
                value: to_nano("0.5").unwrap(),
            },
        )
        .await
        .unwrap();

    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .from(f.admin.address())
            .to(f.minter.address())
            .op(OP_CALL_TO)
            .success(false)
            .aborted(true)
            .action_result_code(ACTION_NOT_ENOUGH_BALANCE)
    ));
}

#[tokio::test]
async fn test_mint_from_stranger() {
    let f = setup().await;
    let stranger = f.chain.treasury("stranger").await.unwrap();

    let report = f
        .minter
        .send_mint(
            f.minter.provider(),
            &stranger,
            MintArgs {
                to_address: holder(),
                jetton_amount: 100,
                amount: to_nano("0.05").unwrap(),
                value: to_nano("0.1").unwrap(),
            },
        )
        .await
        .unwrap();

    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .to(f.minter.address())
            .success(false)
            .exit_code(ERR_NOT_ADMIN)
    ));
    assert_eq!(
        f.minter.get_total_supply(f.minter.provider()).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_upgrade() {
    let f = setup().await;
    let new_data = MinterData {
        total_supply: 0,
        admin_address: f.admin.address().clone(),
        transfer_admin_address: holder(),
        jetton_wallet_code: jetton_wallet_code(),
    }
    .to_cell()
    .unwrap();
    let new_code = Cell::empty();

    let report = f
        .minter
        .send_upgrade_minter(
            f.minter.provider(),
            &f.admin,
            UpgradeArgs {
                new_data: new_data.clone(),
                new_code: new_code.clone(),
                value: to_nano("0.05").unwrap(),
            },
        )
        .await
        .unwrap();
    assert!(report.has_transaction(
        &TransactionMatcher::new()
            .to(f.minter.address())
            .success(true)
    ));

    let account = f.chain.account(f.minter.address()).await.unwrap();
    assert_eq!(account.code(), Some(&Arc::new(new_code)));
    assert_eq!(account.data(), Some(&Arc::new(new_data)));
}
