//! Injected Ethereum Wallet via wasm-bindgen
//!
//! Implements the `lib_core` capability traits over the EIP-1193 provider that
//! browser wallets (MetaMask and compatibles) inject as `window.ethereum`.

use std::rc::Rc;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use js_sys::Reflect;
use lib_core::capability::{ChainClient, ProviderHandle, SignerHandle, WalletProvider};
use lib_core::{ConnectError, ConnectionHandle, Result, Trigger};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::dto::network::NetworkInfo;
use wasm_bindgen::prelude::*;

use super::rpc::{self, TransactionRequest};

// ============================================================================
// JAVASCRIPT INTEROP
// ============================================================================

#[wasm_bindgen(inline_js = "
export function hasInjectedWallet() {
    return typeof window !== 'undefined' && typeof window.ethereum !== 'undefined';
}

export async function ethereumRequest(method, params) {
    if (!window.ethereum) {
        throw { code: -1, message: 'No injected wallet' };
    }
    return await window.ethereum.request({ method: method, params: params });
}

export function onEthereumEvent(event, callback) {
    if (window.ethereum && typeof window.ethereum.on === 'function') {
        window.ethereum.on(event, callback);
    }
}
")]
extern "C" {
    /// Whether `window.ethereum` exists
    fn hasInjectedWallet() -> bool;

    /// `window.ethereum.request({ method, params })`
    #[wasm_bindgen(catch)]
    async fn ethereumRequest(method: &str, params: JsValue) -> std::result::Result<JsValue, JsValue>;

    /// `window.ethereum.on(event, callback)`
    fn onEthereumEvent(event: &str, callback: &Closure<dyn FnMut(JsValue)>);
}

/// Pull `code` and `message` off a thrown provider error.
fn provider_error(err: JsValue) -> ConnectError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|v| v as i64);
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|v| v.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err));

    rpc::classify_error(code, message)
}

async fn request<P, T>(method: &str, params: &P) -> Result<T>
where
    P: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let params = serde_wasm_bindgen::to_value(params)
        .map_err(|e| ConnectError::Decoding(format!("{} params: {}", method, e)))?;

    let response = ethereumRequest(method, params).await.map_err(|err| {
        let err = provider_error(err);
        log::debug!("{} failed: {}", method, err);
        err
    })?;

    serde_wasm_bindgen::from_value(response)
        .map_err(|e| ConnectError::Decoding(format!("{} response: {}", method, e)))
}

async fn accounts(method: &str) -> Result<Vec<Address>> {
    let raw: Vec<String> = request(method, &()).await?;
    rpc::parse_accounts(&raw)
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Account access through `window.ethereum`.
pub struct InjectedWallet;

#[async_trait(?Send)]
impl WalletProvider for InjectedWallet {
    fn is_present(&self) -> bool {
        hasInjectedWallet()
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>> {
        accounts(rpc::ETH_ACCOUNTS).await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        accounts(rpc::ETH_REQUEST_ACCOUNTS).await
    }
}

/// Chain access through the same injected provider.
pub struct InjectedClient;

#[async_trait(?Send)]
impl ChainClient for InjectedClient {
    async fn attach(&self) -> Result<Rc<dyn ProviderHandle>> {
        if !hasInjectedWallet() {
            return Err(ConnectError::NoWalletDetected);
        }
        Ok(Rc::new(InjectedProvider))
    }
}

pub struct InjectedProvider;

#[async_trait(?Send)]
impl ProviderHandle for InjectedProvider {
    fn signer(&self) -> Result<Rc<dyn SignerHandle>> {
        Ok(Rc::new(InjectedSigner))
    }

    async fn network(&self) -> Result<NetworkInfo> {
        let chain_id: String = request(rpc::ETH_CHAIN_ID, &()).await?;
        Ok(NetworkInfo::from_chain_id(rpc::parse_chain_id(&chain_id)?))
    }

    async fn balance(&self, account: Address) -> Result<U256> {
        let wei: String = request(rpc::ETH_GET_BALANCE, &(account, rpc::LATEST_BLOCK)).await?;
        rpc::parse_quantity(&wei)
    }
}

/// Signs with whichever account the wallet currently exposes.
pub struct InjectedSigner;

#[async_trait(?Send)]
impl SignerHandle for InjectedSigner {
    async fn address(&self) -> Result<Address> {
        accounts(rpc::ETH_ACCOUNTS)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ConnectError::Rpc("wallet exposes no account".to_string()))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest { from: None, to, data };
        let raw: String = request(rpc::ETH_CALL, &(tx, rpc::LATEST_BLOCK)).await?;
        rpc::parse_data(&raw)
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        let from = self.address().await?;
        let tx = TransactionRequest {
            from: Some(from),
            to,
            data,
        };
        let raw: String = request(rpc::ETH_SEND_TRANSACTION, &[tx]).await?;
        rpc::parse_tx_hash(&raw)
    }
}

// ============================================================================
// WALLET EVENTS
// ============================================================================

/// Forward `accountsChanged` and `chainChanged` to `handle`.
///
/// The listeners live as long as the page.
pub fn forward_wallet_events(handle: &ConnectionHandle) {
    if !hasInjectedWallet() {
        return;
    }

    let accounts_handle = handle.clone();
    let on_accounts = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        let raw: Vec<String> = serde_wasm_bindgen::from_value(value).unwrap_or_default();
        let accounts = match rpc::parse_accounts(&raw) {
            Ok(accounts) => accounts,
            Err(e) => {
                log::warn!("Ignoring malformed accountsChanged payload: {}", e);
                return;
            }
        };
        let handle = accounts_handle.clone();
        wasm_bindgen_futures::spawn_local(async move {
            handle.dispatch(Trigger::AccountsChanged(accounts)).await;
        });
    });

    let chain_handle = handle.clone();
    let on_chain = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        let chain_id = match value.as_string().map(|v| rpc::parse_chain_id(&v)) {
            Some(Ok(chain_id)) => chain_id,
            _ => {
                log::warn!("Ignoring malformed chainChanged payload: {:?}", value);
                return;
            }
        };
        let handle = chain_handle.clone();
        wasm_bindgen_futures::spawn_local(async move {
            handle.dispatch(Trigger::ChainChanged(chain_id)).await;
        });
    });

    onEthereumEvent(rpc::ACCOUNTS_CHANGED, &on_accounts);
    onEthereumEvent(rpc::CHAIN_CHANGED, &on_chain);
    on_accounts.forget();
    on_chain.forget();
}
