mod connection;
mod injected;
mod local;
mod rpc;
mod wallet;

use alloy_provider::{DynProvider, Provider, ProviderBuilder};
pub use connection::ConnectionManager;
pub use injected::InjectedWallet;
pub use local::LocalWallet;
pub use rpc::RpcWallet;
use thiserror::Error;
pub use wallet::{
    Session, Subscription, WalletError, WalletEvent, WalletProvider, INVALID_PARAMS,
    UNRECOGNIZED_CHAIN, USER_REJECTED,
};

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),
}

/// Convenience function to create an ethereum rpc provider from url.
///
/// Used for view calls only; it never signs.
pub async fn create_provider(rpc_url: &str) -> Result<DynProvider, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider.erased())
}
