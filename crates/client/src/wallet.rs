//! The wallet surface the dashboard consumes.
//!
//! Mirrors the EIP-1193 provider convention used by browser wallets: requests
//! answered asynchronously, notifications pushed for account and chain
//! changes, and a signer bound to an authorized account.

use alloy_primitives::Address;
use alloy_provider::DynProvider;
use config::ChainParams;
use std::future::Future;
use thiserror::Error;
use tokio::{sync::broadcast, task::JoinHandle};

/// EIP-1193 code for a request the user rejected.
pub const USER_REJECTED: i64 = 4001;

/// EIP-3326 code returned by `wallet_switchEthereumChain` for unknown chains.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// JSON-RPC code for invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet is available to connect to
    #[error("No wallet found. Configure a wallet endpoint or a private key to connect.")]
    NoWallet,

    /// A write was requested without an authorized account
    #[error("No connected account to sign with")]
    NoSigner,

    /// The wallet answered the request with an error
    #[error("Wallet rejected request ({code}): {message}")]
    Rpc { code: i64, message: String },

    /// The wallet could not be reached
    #[error("Wallet transport error: {0}")]
    Transport(String),

    /// The wallet answered with something unexpected
    #[error("Invalid wallet response: {0}")]
    InvalidResponse(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

impl WalletError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Error code reported by the wallet, if any.
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the wallet does not know the requested chain.
    pub const fn is_unrecognized_chain(&self) -> bool {
        matches!(self.code(), Some(UNRECOGNIZED_CHAIN))
    }
}

/// Notification pushed by a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of authorized accounts changed; empty when access was revoked
    AccountsChanged(Vec<Address>),
    /// The wallet moved to another chain
    ChainChanged(u64),
}

/// Current wallet connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
}

impl Session {
    pub const fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// Fold a wallet notification into the session.
    pub fn apply(&mut self, event: &WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => self.account = accounts.first().copied(),
            WalletEvent::ChainChanged(chain_id) => self.chain_id = Some(*chain_id),
        }
    }
}

/// A background listener that stops when dropped.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Run `task` until it finishes or the subscription is dropped.
    pub fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(task),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A wallet the dashboard can connect to.
pub trait WalletProvider: Clone + Send + Sync + 'static {
    /// Ask for account access. The first entry is the active account.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, WalletError>> + Send;

    /// Chain the wallet is currently on.
    fn chain_id(&self) -> impl Future<Output = Result<u64, WalletError>> + Send;

    /// Ask the wallet to move to `chain_id`.
    ///
    /// Fails with code [`UNRECOGNIZED_CHAIN`] when the wallet does not know it.
    fn switch_chain(&self, chain_id: u64) -> impl Future<Output = Result<(), WalletError>> + Send;

    /// Teach the wallet a chain definition.
    fn add_chain(&self, chain: &ChainParams) -> impl Future<Output = Result<(), WalletError>> + Send;

    /// Receive account and chain notifications.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// A provider that submits transactions signed for `account`.
    ///
    /// Fails with [`WalletError::NoSigner`] when `account` is not authorized.
    fn signer_provider(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<DynProvider, WalletError>> + Send;
}
