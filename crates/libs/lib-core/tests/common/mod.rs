//! Scripted capability implementations for controller tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use alloy_primitives::{address, Address, Bytes, TxHash, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use futures::channel::oneshot;
use lib_core::capability::{ChainClient, ProviderHandle, SignerHandle, WalletProvider};
use lib_core::contract::SimpleStorage;
use lib_core::{ConnectError, ConnectionController, ConnectionHandle, DeploymentConfig, Result};
use shared::dto::network::NetworkInfo;

pub const ACCOUNT_ABC: Address = address!("abc0000000000000000000000000000000000abc");
pub const ACCOUNT_DEF: Address = address!("def0000000000000000000000000000000000def");
pub const CONTRACT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
pub const RINKEBY: u64 = 4;
pub const MAINNET: u64 = 1;

pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

pub fn config() -> DeploymentConfig {
    DeploymentConfig::new(CONTRACT, RINKEBY)
}

async fn pass_gate(gate: &RefCell<Option<oneshot::Receiver<()>>>) {
    let pending = gate.borrow_mut().take();
    if let Some(rx) = pending {
        let _ = rx.await;
    }
}

// region:    --- Wallet

pub struct MockWallet {
    present: bool,
    authorized: RefCell<Result<Vec<Address>>>,
    request: RefCell<Result<Vec<Address>>>,
    request_gate: RefCell<Option<oneshot::Receiver<()>>>,
    pub authorized_calls: Cell<usize>,
    pub request_calls: Cell<usize>,
}

impl MockWallet {
    fn new(present: bool) -> Rc<Self> {
        Rc::new(Self {
            present,
            authorized: RefCell::new(Ok(vec![])),
            request: RefCell::new(Err(ConnectError::UserRejected)),
            request_gate: RefCell::new(None),
            authorized_calls: Cell::new(0),
            request_calls: Cell::new(0),
        })
    }

    pub fn absent() -> Rc<Self> {
        Self::new(false)
    }

    /// Present wallet with no authorized account that rejects requests.
    pub fn present() -> Rc<Self> {
        Self::new(true)
    }

    pub fn set_authorized(&self, accounts: Result<Vec<Address>>) {
        *self.authorized.borrow_mut() = accounts;
    }

    pub fn set_request(&self, accounts: Result<Vec<Address>>) {
        *self.request.borrow_mut() = accounts;
    }

    /// Hold the next `request_accounts` call until the returned sender fires.
    pub fn gate_request(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.request_gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    fn is_present(&self) -> bool {
        self.present
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>> {
        self.authorized_calls.set(self.authorized_calls.get() + 1);
        self.authorized.borrow().clone()
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.request_calls.set(self.request_calls.get() + 1);
        let answer = self.request.borrow().clone();
        pass_gate(&self.request_gate).await;
        answer
    }
}

// endregion: --- Wallet

// region:    --- Chain

/// On-chain side of the mock: the contract slot and submitted transactions.
#[derive(Default)]
pub struct Ledger {
    pub stored: Cell<U256>,
    pub submitted: RefCell<Vec<U256>>,
    pub fail_calls: Cell<bool>,
    pub reject_sends: Cell<bool>,
}

impl Ledger {
    /// Mine every submitted transaction.
    pub fn confirm_all(&self) {
        if let Some(last) = self.submitted.borrow().last() {
            self.stored.set(*last);
        }
    }
}

pub struct MockChain {
    pub chain_id: Cell<u64>,
    pub balance: Cell<U256>,
    pub fail_attach: Cell<bool>,
    pub attach_calls: Cell<usize>,
    attach_gate: RefCell<Option<oneshot::Receiver<()>>>,
    pub ledger: Rc<Ledger>,
}

impl MockChain {
    pub fn on(chain_id: u64) -> Rc<Self> {
        Rc::new(Self {
            chain_id: Cell::new(chain_id),
            balance: Cell::new(U256::from(ONE_ETHER * 3 / 2)),
            fail_attach: Cell::new(false),
            attach_calls: Cell::new(0),
            attach_gate: RefCell::new(None),
            ledger: Rc::new(Ledger::default()),
        })
    }

    /// Hold the next `attach` call until the returned sender fires.
    pub fn gate_attach(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.attach_gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl ChainClient for MockChain {
    async fn attach(&self) -> Result<Rc<dyn ProviderHandle>> {
        self.attach_calls.set(self.attach_calls.get() + 1);
        // The provider is tied to whatever network was active when attaching began.
        let chain_id = self.chain_id.get();
        pass_gate(&self.attach_gate).await;

        if self.fail_attach.get() {
            return Err(ConnectError::Rpc("could not detect network".to_string()));
        }

        Ok(Rc::new(MockProvider {
            chain_id,
            balance: self.balance.get(),
            ledger: self.ledger.clone(),
        }))
    }
}

pub struct MockProvider {
    chain_id: u64,
    balance: U256,
    ledger: Rc<Ledger>,
}

#[async_trait(?Send)]
impl ProviderHandle for MockProvider {
    fn signer(&self) -> Result<Rc<dyn SignerHandle>> {
        Ok(Rc::new(MockSigner {
            ledger: self.ledger.clone(),
        }))
    }

    async fn network(&self) -> Result<NetworkInfo> {
        Ok(NetworkInfo::from_chain_id(self.chain_id))
    }

    async fn balance(&self, _account: Address) -> Result<U256> {
        Ok(self.balance)
    }
}

pub struct MockSigner {
    ledger: Rc<Ledger>,
}

#[async_trait(?Send)]
impl SignerHandle for MockSigner {
    async fn address(&self) -> Result<Address> {
        Ok(ACCOUNT_ABC)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        assert_eq!(to, CONTRACT);
        if self.ledger.fail_calls.get() {
            return Err(ConnectError::Rpc("header not found".to_string()));
        }
        assert_eq!(&data[..], SimpleStorage::getCall {}.abi_encode().as_slice());
        Ok(self.ledger.stored.get().abi_encode().into())
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        assert_eq!(to, CONTRACT);
        if self.ledger.reject_sends.get() {
            return Err(ConnectError::UserRejected);
        }
        let call = SimpleStorage::setCall::abi_decode(&data)?;
        let mut submitted = self.ledger.submitted.borrow_mut();
        submitted.push(call.x);
        Ok(TxHash::with_last_byte(submitted.len() as u8))
    }
}

// endregion: --- Chain

pub fn controller(wallet: &Rc<MockWallet>, chain: &Rc<MockChain>) -> ConnectionController {
    ConnectionController::new(config(), wallet.clone(), chain.clone())
}

pub fn handle(wallet: &Rc<MockWallet>, chain: &Rc<MockChain>) -> ConnectionHandle {
    ConnectionHandle::new(controller(wallet, chain))
}
