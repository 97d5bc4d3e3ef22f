//! Wallet events racing against stages that are waiting on the wallet.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use lib_core::{ConnectError, Phase, Trigger};

#[tokio::test]
async fn test_stale_grant_is_discarded_for_switched_account() {
    let wallet = MockWallet::present();
    wallet.set_request(Ok(vec![ACCOUNT_ABC]));
    let release_request = wallet.gate_request();
    let chain = MockChain::on(RINKEBY);
    let handle = handle(&wallet, &chain);

    let accounts = Rc::new(RefCell::new(Vec::new()));
    let seen = accounts.clone();
    handle.subscribe(move |s| seen.borrow_mut().push(s.account)).await;

    let load = handle.dispatch(Trigger::Load);
    let switch = async {
        wallet.set_authorized(Ok(vec![ACCOUNT_DEF]));
        handle.dispatch(Trigger::AccountsChanged(vec![ACCOUNT_DEF])).await
    };
    let release = async move {
        release_request.send(()).unwrap();
    };
    let (loaded, switched, ()) = futures::join!(load, switch, release);

    // Load gives up on the outdated grant; the account event finishes the job.
    assert_eq!(loaded, Phase::PendingAuthorization);
    assert_eq!(switched, Phase::ContractBound);
    assert_eq!(handle.snapshot().await.account, ACCOUNT_DEF);
    assert!(!accounts.borrow().contains(&ACCOUNT_ABC));
    assert_eq!(wallet.request_calls.get(), 1);
    assert_eq!(wallet.authorized_calls.get(), 1);
}

#[tokio::test]
async fn test_stale_attachment_is_discarded_after_chain_switch() {
    let wallet = MockWallet::present();
    wallet.set_authorized(Ok(vec![ACCOUNT_ABC]));
    let chain = MockChain::on(RINKEBY);
    let release_attach = chain.gate_attach();
    let handle = handle(&wallet, &chain);

    let phases = Rc::new(RefCell::new(Vec::new()));
    let seen = phases.clone();
    handle.subscribe(move |s| seen.borrow_mut().push(s.phase)).await;

    let load = handle.dispatch(Trigger::Load);
    let switch = async {
        chain.chain_id.set(MAINNET);
        handle.dispatch(Trigger::ChainChanged(MAINNET)).await
    };
    let release = async move {
        release_attach.send(()).unwrap();
    };
    let (loaded, switched, ()) = futures::join!(load, switch, release);

    assert_eq!(loaded, Phase::Authorized);
    assert_eq!(switched, Phase::ProviderReady);
    assert!(!phases.borrow().contains(&Phase::ContractBound));

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.network.map(|n| n.chain_id), Some(MAINNET));
    assert_eq!(handle.read_value().await, Err(ConnectError::ContractNotBound));
    assert_eq!(chain.attach_calls.get(), 2);
}

#[tokio::test]
async fn test_revoke_during_attach_never_binds() {
    let wallet = MockWallet::present();
    wallet.set_authorized(Ok(vec![ACCOUNT_ABC]));
    let chain = MockChain::on(RINKEBY);
    let release_attach = chain.gate_attach();
    let handle = handle(&wallet, &chain);

    let phases = Rc::new(RefCell::new(Vec::new()));
    let seen = phases.clone();
    handle.subscribe(move |s| seen.borrow_mut().push(s.phase)).await;

    let load = handle.dispatch(Trigger::Load);
    let revoke = async {
        wallet.set_authorized(Ok(vec![]));
        handle.dispatch(Trigger::AccountsChanged(vec![])).await
    };
    let release = async move {
        release_attach.send(()).unwrap();
    };
    let (loaded, revoked, ()) = futures::join!(load, revoke, release);

    assert_eq!(loaded, Phase::Authorized);
    assert_eq!(revoked, Phase::Unauthorized);
    assert!(!phases.borrow().contains(&Phase::ProviderReady));
    assert!(!phases.borrow().contains(&Phase::ContractBound));
    assert_eq!(chain.attach_calls.get(), 1);
    assert_eq!(wallet.request_calls.get(), 1);

    let snapshot = handle.snapshot().await;
    assert!(!snapshot.authorized);
    assert_eq!(handle.read_value().await, Err(ConnectError::ContractNotBound));
}

#[tokio::test]
async fn test_rejection_is_recorded_despite_chain_switch() {
    let wallet = MockWallet::present();
    let release_request = wallet.gate_request();
    let chain = MockChain::on(RINKEBY);
    let handle = handle(&wallet, &chain);

    let load = handle.dispatch(Trigger::Load);
    let switch = async {
        chain.chain_id.set(MAINNET);
        handle.dispatch(Trigger::ChainChanged(MAINNET)).await
    };
    let release = async move {
        release_request.send(()).unwrap();
    };
    let (loaded, switched, ()) = futures::join!(load, switch, release);

    assert_eq!(loaded, Phase::Unauthorized);
    assert_eq!(switched, Phase::Unauthorized);
    assert_eq!(wallet.request_calls.get(), 1);
    assert_eq!(chain.attach_calls.get(), 0);
}

#[tokio::test]
async fn test_handle_serializes_contract_actions() {
    let wallet = MockWallet::present();
    wallet.set_authorized(Ok(vec![ACCOUNT_ABC]));
    let chain = MockChain::on(RINKEBY);
    let handle = handle(&wallet, &chain);

    assert_eq!(handle.read_value().await, Err(ConnectError::ContractNotBound));

    let advanced_from = handle.epoch().current();
    handle.dispatch(Trigger::Load).await;
    assert_eq!(handle.epoch().current(), advanced_from);

    let (written, read) = futures::join!(handle.write_value("9"), handle.read_value());
    assert!(written.is_ok());
    assert_eq!(read.unwrap(), "0");

    handle.dispatch(Trigger::ChainChanged(RINKEBY)).await;
    assert_eq!(handle.epoch().current(), advanced_from + 1);
    chain.ledger.confirm_all();
    assert_eq!(handle.read_value().await.unwrap(), "9");
}
