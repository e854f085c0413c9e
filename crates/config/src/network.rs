//! Chain configuration for the dashboard.
//!
//! Provides the expected chain's parameters: the id the wallet must be on, the
//! definition handed to the wallet when it does not know the chain yet, and
//! the block explorer used to link transactions.

use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

/// Chain id of the public Sepolia test network.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// Native currency of a chain, as wallets expect it in `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    /// Ether-denominated currency with the given display name.
    pub fn ether(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// Parameters of the chain the dashboard expects the wallet to be on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Chain ID
    pub chain_id: u64,
    /// Human-readable chain name
    pub chain_name: String,
    /// Native currency definition
    pub native_currency: NativeCurrency,
    /// Public RPC endpoints, first one preferred
    pub rpc_urls: Vec<String>,
    /// Block explorer base URLs, first one used for links
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl ChainParams {
    /// Ethereum Sepolia testnet configuration.
    pub fn sepolia() -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            chain_name: "Sepolia".to_string(),
            native_currency: NativeCurrency::ether("Sepolia Ether"),
            rpc_urls: vec!["https://ethereum-sepolia-rpc.publicnode.com".to_string()],
            // https://sepolia.etherscan.io
            block_explorer_urls: vec!["https://sepolia.etherscan.io".to_string()],
        }
    }

    /// Minimal definition for a chain only known by id and RPC endpoint.
    pub fn custom(chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            chain_name: format!("Chain {chain_id}"),
            native_currency: NativeCurrency::ether("Ether"),
            rpc_urls: vec![rpc_url.into()],
            block_explorer_urls: Vec::new(),
        }
    }

    /// Preferred RPC endpoint.
    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }

    /// Explorer base URL without a trailing slash.
    pub fn explorer_url(&self) -> Option<&str> {
        self.block_explorer_urls
            .first()
            .map(|url| url.trim_end_matches('/'))
    }

    /// Explorer link for a transaction, when the chain has an explorer.
    pub fn tx_url(&self, tx_hash: &TxHash) -> Option<String> {
        self.explorer_url()
            .map(|explorer| format!("{explorer}/tx/{tx_hash}"))
    }
}
