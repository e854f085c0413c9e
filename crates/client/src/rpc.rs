//! Wallet reached over JSON-RPC.
//!
//! Speaks the same requests a dapp sends to an injected browser wallet
//! (`eth_requestAccounts`, `wallet_switchEthereumChain`, ...) to an HTTP
//! endpoint such as a wallet bridge or a development node with unlocked
//! accounts. HTTP cannot push notifications, so account and chain changes are
//! detected by polling (see [`RpcWallet::watch`]).

use crate::wallet::{Subscription, WalletError, WalletEvent, WalletProvider};
use alloy_primitives::{Address, U64};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use config::{ChainParams, NativeCurrency};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 16;

/// A wallet that answers EIP-1193 requests over HTTP.
///
/// # Example
///
/// ```ignore
/// let wallet = RpcWallet::new("http://localhost:8545");
/// let accounts = wallet.request_accounts().await?;
/// let _watcher = wallet.watch(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct RpcWallet {
    inner: Arc<RpcInner>,
}

#[derive(Debug)]
struct RpcInner {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    events: broadcast::Sender<WalletEvent>,
    observed: Mutex<Observed>,
}

/// Last account list and chain seen, used to detect changes.
#[derive(Debug, Default)]
struct Observed {
    accounts: Option<Vec<Address>>,
    chain_id: Option<u64>,
}

impl RpcWallet {
    /// Creates a wallet client for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Creates a wallet client with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(RpcInner {
                client,
                url: url.into(),
                next_id: AtomicU64::new(1),
                events,
                observed: Mutex::new(Observed::default()),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Accounts already authorized, without prompting.
    pub async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request("eth_accounts", json!([])).await
    }

    async fn current_chain_id(&self) -> Result<u64, WalletError> {
        let chain_id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(chain_id.to::<u64>())
    }

    /// Query the wallet once and emit an event for anything that changed
    /// since the last observation.
    pub async fn poll(&self) -> Result<Vec<WalletEvent>, WalletError> {
        let accounts = self.accounts().await?;
        let chain_id = self.current_chain_id().await?;

        let mut observed = self.inner.observed.lock().await;
        let mut changes = Vec::new();

        if observed
            .accounts
            .as_ref()
            .is_some_and(|previous| *previous != accounts)
        {
            changes.push(WalletEvent::AccountsChanged(accounts.clone()));
        }
        observed.accounts = Some(accounts);

        if observed
            .chain_id
            .is_some_and(|previous| previous != chain_id)
        {
            changes.push(WalletEvent::ChainChanged(chain_id));
        }
        observed.chain_id = Some(chain_id);
        drop(observed);

        for event in &changes {
            debug!(?event, "Wallet state changed");
            let _ = self.inner.events.send(event.clone());
        }

        Ok(changes)
    }

    /// Poll the wallet every `every` until the returned subscription is dropped.
    pub fn watch(&self, every: Duration) -> Subscription {
        let wallet = self.clone();
        Subscription::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                if let Err(e) = wallet.poll().await {
                    warn!(url = %wallet.url(), error = %e, "Failed to poll wallet");
                }
            }
        })
    }

    /// Send one JSON-RPC request to the wallet.
    async fn request<P, R>(&self, method: &'static str, params: P) -> Result<R, WalletError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let response = self
            .inner
            .client
            .post(&self.inner.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(WalletError::Transport(format!(
                "wallet returned {status}: {body}"
            )));
        }

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| WalletError::InvalidResponse(e.to_string()))?;

        rpc_response.into_result()
    }
}

impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let accounts: Vec<Address> = self.request("eth_requestAccounts", json!([])).await?;
        self.inner.observed.lock().await.accounts = Some(accounts.clone());
        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let chain_id = self.current_chain_id().await?;
        self.inner.observed.lock().await.chain_id = Some(chain_id);
        Ok(chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let params = json!([{ "chainId": format!("{chain_id:#x}") }]);
        let _: serde_json::Value = self.request("wallet_switchEthereumChain", params).await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainParams) -> Result<(), WalletError> {
        let params = [AddChainParameter::from(chain)];
        let _: serde_json::Value = self.request("wallet_addEthereumChain", params).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.inner.events.subscribe()
    }

    async fn signer_provider(&self, account: Address) -> Result<DynProvider, WalletError> {
        let authorized = self
            .inner
            .observed
            .lock()
            .await
            .accounts
            .as_ref()
            .is_some_and(|accounts| accounts.contains(&account));
        if !authorized {
            return Err(WalletError::NoSigner);
        }

        let url = self
            .inner
            .url
            .parse()
            .map_err(|e| WalletError::Transport(format!("Invalid wallet URL: {}", e)))?;

        // No wallet filler: transactions go out as `eth_sendTransaction` and
        // the endpoint signs them for `from`.
        Ok(ProviderBuilder::new().connect_http(url).erased())
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn into_result<R: DeserializeOwned>(self) -> Result<R, WalletError> {
        if let Some(error) = self.error {
            return Err(WalletError::rpc(error.code, error.message));
        }

        serde_json::from_value(self.result).map_err(|e| WalletError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// EIP-3085 `wallet_addEthereumChain` parameter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddChainParameter<'a> {
    chain_id: String,
    chain_name: &'a str,
    native_currency: &'a NativeCurrency,
    rpc_urls: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    block_explorer_urls: &'a [String],
}

impl<'a> From<&'a ChainParams> for AddChainParameter<'a> {
    fn from(chain: &'a ChainParams) -> Self {
        Self {
            chain_id: format!("{:#x}", chain.chain_id),
            chain_name: &chain.chain_name,
            native_currency: &chain.native_currency,
            rpc_urls: &chain.rpc_urls,
            block_explorer_urls: &chain.block_explorer_urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::UNRECOGNIZED_CHAIN;

    fn response(body: &str) -> JsonRpcResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_add_chain_parameter_shape() {
        let chain = ChainParams::sepolia();
        let value = serde_json::to_value(AddChainParameter::from(&chain)).unwrap();

        assert_eq!(value["chainId"], "0xaa36a7");
        assert_eq!(value["chainName"], "Sepolia");
        assert_eq!(value["nativeCurrency"]["symbol"], "ETH");
        assert_eq!(value["nativeCurrency"]["decimals"], 18);
        assert_eq!(value["rpcUrls"][0], chain.rpc_urls[0]);
        assert_eq!(value["blockExplorerUrls"][0], "https://sepolia.etherscan.io");
    }

    #[test]
    fn test_add_chain_parameter_omits_empty_explorers() {
        let chain = ChainParams::custom(31337, "http://localhost:8545");
        let value = serde_json::to_value(AddChainParameter::from(&chain)).unwrap();

        assert_eq!(value["chainId"], "0x7a69");
        assert!(value.get("blockExplorerUrls").is_none());
    }

    #[test]
    fn test_response_result() {
        let chain_id: U64 =
            response(r#"{"jsonrpc":"2.0","id":1,"result":"0xaa36a7"}"#).into_result().unwrap();
        assert_eq!(chain_id.to::<u64>(), 11155111);

        let accounts: Vec<Address> = response(
            r#"{"jsonrpc":"2.0","id":2,"result":["0x0101010101010101010101010101010101010101"]}"#,
        )
        .into_result()
        .unwrap();
        assert_eq!(accounts, vec![Address::repeat_byte(1)]);
    }

    #[test]
    fn test_response_null_result() {
        let value: serde_json::Value = response(r#"{"jsonrpc":"2.0","id":3,"result":null}"#)
            .into_result()
            .unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_response_error() {
        let err = response(
            r#"{"jsonrpc":"2.0","id":4,"error":{"code":4902,"message":"Unrecognized chain ID"}}"#,
        )
        .into_result::<serde_json::Value>()
        .unwrap_err();

        assert_eq!(err.code(), Some(UNRECOGNIZED_CHAIN));
        assert!(err.is_unrecognized_chain());
    }

    #[tokio::test]
    async fn test_signer_requires_requested_accounts() {
        let wallet = RpcWallet::new("http://127.0.0.1:1");
        assert_eq!(
            wallet.signer_provider(Address::repeat_byte(1)).await.err(),
            Some(WalletError::NoSigner)
        );
    }

    #[tokio::test]
    async fn test_unreachable_wallet() {
        let wallet = RpcWallet::new("http://127.0.0.1:1");
        let err = wallet.chain_id().await.unwrap_err();
        assert!(matches!(err, WalletError::Transport(_)));
    }
}
