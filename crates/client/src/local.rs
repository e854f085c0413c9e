//! Wallet backed by a local private key.
//!
//! Behaves like a browser wallet extension holding one account: access must be
//! requested before signing, it only switches to chains it knows, and it
//! notifies subscribers when the chain changes or access is revoked.

use crate::wallet::{WalletError, WalletEvent, WalletProvider, INVALID_PARAMS, UNRECOGNIZED_CHAIN};
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use config::ChainParams;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

const EVENT_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct LocalWallet {
    inner: Arc<LocalInner>,
}

struct LocalInner {
    signer: PrivateKeySigner,
    state: RwLock<LocalState>,
    events: broadcast::Sender<WalletEvent>,
}

struct LocalState {
    /// Known chains and the RPC endpoint used to submit on each
    chains: HashMap<u64, String>,
    active: u64,
    authorized: bool,
}

impl LocalWallet {
    /// Create a wallet from a hex private key, starting on `chain_id`.
    pub fn new(
        private_key: &str,
        chain_id: u64,
        rpc_url: impl Into<String>,
    ) -> Result<Self, WalletError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("{}", e)))?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = LocalState {
            chains: HashMap::from([(chain_id, rpc_url.into())]),
            active: chain_id,
            authorized: false,
        };

        Ok(Self {
            inner: Arc::new(LocalInner {
                signer,
                state: RwLock::new(state),
                events,
            }),
        })
    }

    /// Address of the held key.
    pub fn address(&self) -> Address {
        self.inner.signer.address()
    }

    /// Withdraw account access, as a user disconnecting the site would.
    pub async fn revoke(&self) {
        self.inner.state.write().await.authorized = false;
        self.emit(WalletEvent::AccountsChanged(vec![]));
        info!(account = %self.address(), "Wallet access revoked");
    }

    fn emit(&self, event: WalletEvent) {
        // Nobody listening is fine.
        let _ = self.inner.events.send(event);
    }
}

impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.inner.state.write().await.authorized = true;
        Ok(vec![self.address()])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.inner.state.read().await.active)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut state = self.inner.state.write().await;
        if !state.chains.contains_key(&chain_id) {
            return Err(WalletError::rpc(
                UNRECOGNIZED_CHAIN,
                format!("Unrecognized chain ID {chain_id:#x}"),
            ));
        }

        if state.active == chain_id {
            return Ok(());
        }

        state.active = chain_id;
        drop(state);

        debug!(chain_id, "Local wallet switched chain");
        self.emit(WalletEvent::ChainChanged(chain_id));
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainParams) -> Result<(), WalletError> {
        let rpc_url = chain
            .rpc_url()
            .ok_or_else(|| WalletError::rpc(INVALID_PARAMS, "Chain definition has no RPC URL"))?;

        self.inner
            .state
            .write()
            .await
            .chains
            .insert(chain.chain_id, rpc_url.to_string());

        debug!(chain_id = chain.chain_id, name = %chain.chain_name, "Local wallet added chain");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.inner.events.subscribe()
    }

    async fn signer_provider(&self, account: Address) -> Result<DynProvider, WalletError> {
        let state = self.inner.state.read().await;
        if !state.authorized || account != self.address() {
            return Err(WalletError::NoSigner);
        }

        let rpc_url = state
            .chains
            .get(&state.active)
            .ok_or_else(|| WalletError::InvalidResponse("active chain has no endpoint".into()))?;
        let url = rpc_url
            .parse()
            .map_err(|e| WalletError::Transport(format!("Invalid RPC URL: {}", e)))?;

        let wallet = EthereumWallet::from(self.inner.signer.clone());
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(provider.erased())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Well-known development key (anvil account 0).
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn wallet() -> LocalWallet {
        LocalWallet::new(TEST_KEY, 31337, "http://localhost:8545").unwrap()
    }

    #[test]
    fn test_invalid_key() {
        let result = LocalWallet::new("not a key", 1, "http://localhost:8545");
        assert!(matches!(result, Err(WalletError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_request_accounts() {
        let wallet = wallet();
        let accounts = wallet.request_accounts().await.unwrap();

        assert_eq!(
            accounts,
            vec!["0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()]
        );
        assert_eq!(wallet.chain_id().await.unwrap(), 31337);
    }

    #[tokio::test]
    async fn test_switch_unknown_chain() {
        let wallet = wallet();
        let err = wallet.switch_chain(11155111).await.unwrap_err();

        assert!(err.is_unrecognized_chain());
        assert_eq!(wallet.chain_id().await.unwrap(), 31337);
    }

    #[tokio::test]
    async fn test_add_then_switch_emits_chain_changed() {
        let wallet = wallet();
        let mut events = wallet.subscribe();

        wallet.add_chain(&ChainParams::sepolia()).await.unwrap();
        wallet.switch_chain(11155111).await.unwrap();

        assert_eq!(wallet.chain_id().await.unwrap(), 11155111);
        assert_eq!(events.recv().await.unwrap(), WalletEvent::ChainChanged(11155111));
    }

    #[tokio::test]
    async fn test_add_chain_requires_rpc_url() {
        let mut chain = ChainParams::sepolia();
        chain.rpc_urls.clear();

        let err = wallet().add_chain(&chain).await.unwrap_err();
        assert_eq!(err.code(), Some(INVALID_PARAMS));
    }

    #[tokio::test]
    async fn test_signer_requires_authorization() {
        let wallet = wallet();
        let account = wallet.address();

        assert_eq!(
            wallet.signer_provider(account).await.err(),
            Some(WalletError::NoSigner)
        );

        wallet.request_accounts().await.unwrap();
        assert!(wallet.signer_provider(account).await.is_ok());
        assert_eq!(
            wallet.signer_provider(Address::repeat_byte(9)).await.err(),
            Some(WalletError::NoSigner)
        );
    }

    #[tokio::test]
    async fn test_revoke_clears_access() {
        let wallet = wallet();
        let mut events = wallet.subscribe();
        wallet.request_accounts().await.unwrap();

        wallet.revoke().await;

        assert_eq!(events.recv().await.unwrap(), WalletEvent::AccountsChanged(vec![]));
        assert_eq!(
            wallet.signer_provider(wallet.address()).await.err(),
            Some(WalletError::NoSigner)
        );
    }
}
