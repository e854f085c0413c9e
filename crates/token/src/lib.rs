//! Client handles for the dashboard token contract.
//!
//! Two handles point at the same deployed contract:
//! - a read handle ([`TokenReader`]) bound to a plain provider, usable with no
//!   connected account
//! - a write handle ([`TokenWriter`]) bound to the connected account's signer,
//!   built through a [`SignerFactory`] and memoized by [`SignerCache`]

pub mod cache;
pub mod contract;

use alloy_primitives::{Address, TxHash, U256};
use std::future::Future;

pub use cache::{SignerCache, SignerKey};
pub use contract::{TokenContract, TokenSigner, WalletSigners};

/// Descriptive facts about the token, constant for a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: Option<U256>,
    /// False when the transaction was included but reverted
    pub success: bool,
}

/// View calls on the token contract.
pub trait TokenReader: Send + Sync {
    /// Chain the read provider is connected to.
    fn chain_id(&self) -> impl Future<Output = eyre::Result<u64>> + Send;

    fn name(&self) -> impl Future<Output = eyre::Result<String>> + Send;

    fn symbol(&self) -> impl Future<Output = eyre::Result<String>> + Send;

    fn decimals(&self) -> impl Future<Output = eyre::Result<u8>> + Send;

    fn total_supply(&self) -> impl Future<Output = eyre::Result<U256>> + Send;

    fn balance_of(&self, account: Address) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Address allowed to mint.
    fn owner(&self) -> impl Future<Output = eyre::Result<Address>> + Send;
}

/// Name, symbol and decimals fetched concurrently.
pub async fn fetch_metadata<R: TokenReader>(reader: &R) -> eyre::Result<TokenMetadata> {
    let (name, symbol, decimals) =
        tokio::try_join!(reader.name(), reader.symbol(), reader.decimals())?;

    Ok(TokenMetadata {
        name,
        symbol,
        decimals,
    })
}

/// A transaction accepted by the wallet but not yet mined.
pub trait PendingWrite: Send {
    /// Hash known as soon as the transaction is submitted.
    fn tx_hash(&self) -> TxHash;

    /// Wait for inclusion in one block.
    fn confirm(self) -> impl Future<Output = eyre::Result<Confirmation>> + Send;
}

/// State-changing calls, signed by one account.
pub trait TokenWriter: Send + Sync {
    type Pending: PendingWrite;

    /// Account the writer signs for.
    fn account(&self) -> Address;

    fn transfer(
        &self,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = eyre::Result<Self::Pending>> + Send;

    fn mint(
        &self,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = eyre::Result<Self::Pending>> + Send;

    fn burn(&self, amount: U256) -> impl Future<Output = eyre::Result<Self::Pending>> + Send;
}

/// Builds write handles for an account.
pub trait SignerFactory: Send + Sync {
    type Writer: TokenWriter;

    fn create(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<Self::Writer, client::WalletError>> + Send;
}
