//! Runtime choice between the wallet kinds.

use crate::{
    local::LocalWallet,
    rpc::RpcWallet,
    wallet::{WalletError, WalletEvent, WalletProvider},
};
use alloy_primitives::Address;
use alloy_provider::DynProvider;
use config::ChainParams;
use tokio::sync::broadcast;

/// The wallet selected by configuration.
#[derive(Clone)]
pub enum InjectedWallet {
    Local(LocalWallet),
    Rpc(RpcWallet),
}

impl From<LocalWallet> for InjectedWallet {
    fn from(wallet: LocalWallet) -> Self {
        Self::Local(wallet)
    }
}

impl From<RpcWallet> for InjectedWallet {
    fn from(wallet: RpcWallet) -> Self {
        Self::Rpc(wallet)
    }
}

impl WalletProvider for InjectedWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        match self {
            Self::Local(wallet) => wallet.request_accounts().await,
            Self::Rpc(wallet) => wallet.request_accounts().await,
        }
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        match self {
            Self::Local(wallet) => wallet.chain_id().await,
            Self::Rpc(wallet) => wallet.chain_id().await,
        }
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        match self {
            Self::Local(wallet) => wallet.switch_chain(chain_id).await,
            Self::Rpc(wallet) => wallet.switch_chain(chain_id).await,
        }
    }

    async fn add_chain(&self, chain: &ChainParams) -> Result<(), WalletError> {
        match self {
            Self::Local(wallet) => wallet.add_chain(chain).await,
            Self::Rpc(wallet) => wallet.add_chain(chain).await,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        match self {
            Self::Local(wallet) => wallet.subscribe(),
            Self::Rpc(wallet) => wallet.subscribe(),
        }
    }

    async fn signer_provider(&self, account: Address) -> Result<DynProvider, WalletError> {
        match self {
            Self::Local(wallet) => wallet.signer_provider(account).await,
            Self::Rpc(wallet) => wallet.signer_provider(account).await,
        }
    }
}
