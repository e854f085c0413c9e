//! Errors surfaced by the dashboard.
//!
//! Every variant renders as the human-readable status line the user sees; no
//! error code is shown on its own.

use alloy_primitives::TxHash;
use amount::AmountError;
use client::WalletError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// No wallet to connect to
    #[error("No wallet found. Configure a wallet endpoint (WALLET_URL) or a private key (PRIVATE_KEY) to connect.")]
    NoWallet,

    /// A write needs a connected account
    #[error("Connect a wallet account first")]
    NoSigner,

    /// Wallet is on another chain than the dashboard expects
    #[error("Wrong network: connected to {}, expected chain {expected}. Switch networks to continue.", chain_label(.actual))]
    ChainMismatch { expected: u64, actual: Option<u64> },

    /// Amount input could not be converted exactly
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// Recipient input is not an address
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// A required form field is empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Only the contract owner may mint
    #[error("Only the token owner can mint")]
    NotOwner,

    /// Decimals or owner are not known yet
    #[error("Token details are not loaded yet")]
    MetadataUnavailable,

    /// The wallet, the network or the contract refused
    #[error("{message}")]
    RemoteRejection { code: Option<i64>, message: String },

    /// Mined but reverted
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),
}

fn chain_label(chain_id: &Option<u64>) -> String {
    chain_id.map_or_else(|| "an unknown chain".to_string(), |id| format!("chain {id}"))
}

impl DashboardError {
    /// Wrap a provider or contract failure, keeping the wallet's error code
    /// when there is one.
    pub fn remote(error: &eyre::Report) -> Self {
        if let Some(wallet) = error.downcast_ref::<WalletError>() {
            return wallet.clone().into();
        }

        Self::RemoteRejection {
            code: None,
            message: error.to_string(),
        }
    }
}

impl From<WalletError> for DashboardError {
    fn from(error: WalletError) -> Self {
        match error {
            WalletError::NoWallet => Self::NoWallet,
            WalletError::NoSigner => Self::NoSigner,
            WalletError::Rpc { code, message } => Self::RemoteRejection {
                code: Some(code),
                message,
            },
            other => Self::RemoteRejection {
                code: None,
                message: other.to_string(),
            },
        }
    }
}
