//! Alloy-backed read and write handles.

use crate::{Confirmation, PendingWrite, SignerFactory, TokenReader, TokenWriter};
use alloy_network::Ethereum;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider};
use binding::token::IToken;
use client::{WalletError, WalletProvider};
use tracing::debug;

/// Read handle: view calls through a plain provider.
#[derive(Debug, Clone)]
pub struct TokenContract<P> {
    address: Address,
    provider: P,
}

impl<P> TokenContract<P>
where
    P: Provider + Clone,
{
    pub const fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }

    pub const fn address(&self) -> Address {
        self.address
    }
}

impl<P> TokenReader for TokenContract<P>
where
    P: Provider + Clone,
{
    async fn chain_id(&self) -> eyre::Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn name(&self) -> eyre::Result<String> {
        let contract = IToken::new(self.address, &self.provider);
        Ok(contract.name().call().await?)
    }

    async fn symbol(&self) -> eyre::Result<String> {
        let contract = IToken::new(self.address, &self.provider);
        Ok(contract.symbol().call().await?)
    }

    async fn decimals(&self) -> eyre::Result<u8> {
        let contract = IToken::new(self.address, &self.provider);
        Ok(contract.decimals().call().await?)
    }

    async fn total_supply(&self) -> eyre::Result<U256> {
        let contract = IToken::new(self.address, &self.provider);
        Ok(contract.totalSupply().call().await?)
    }

    async fn balance_of(&self, account: Address) -> eyre::Result<U256> {
        debug!("Querying token {} balance: address={}", self.address, account);

        let contract = IToken::new(self.address, &self.provider);
        Ok(contract.balanceOf(account).call().await?)
    }

    async fn owner(&self) -> eyre::Result<Address> {
        let contract = IToken::new(self.address, &self.provider);
        Ok(contract.owner().call().await?)
    }
}

/// Write handle: state-changing calls sent from one account.
#[derive(Debug, Clone)]
pub struct TokenSigner<P> {
    address: Address,
    account: Address,
    provider: P,
}

impl<P> TokenSigner<P>
where
    P: Provider + Clone,
{
    pub const fn new(address: Address, account: Address, provider: P) -> Self {
        Self {
            address,
            account,
            provider,
        }
    }
}

impl<P> TokenWriter for TokenSigner<P>
where
    P: Provider + Clone,
{
    type Pending = PendingTransactionBuilder<Ethereum>;

    fn account(&self) -> Address {
        self.account
    }

    async fn transfer(&self, to: Address, amount: U256) -> eyre::Result<Self::Pending> {
        let contract = IToken::new(self.address, &self.provider);
        let pending = contract
            .transfer(to, amount)
            .from(self.account)
            .send()
            .await?;

        debug!(tx_hash = %pending.tx_hash(), %to, %amount, "Transfer submitted");
        Ok(pending)
    }

    async fn mint(&self, to: Address, amount: U256) -> eyre::Result<Self::Pending> {
        let contract = IToken::new(self.address, &self.provider);
        let pending = contract.mint(to, amount).from(self.account).send().await?;

        debug!(tx_hash = %pending.tx_hash(), %to, %amount, "Mint submitted");
        Ok(pending)
    }

    async fn burn(&self, amount: U256) -> eyre::Result<Self::Pending> {
        let contract = IToken::new(self.address, &self.provider);
        let pending = contract.burn(amount).from(self.account).send().await?;

        debug!(tx_hash = %pending.tx_hash(), %amount, "Burn submitted");
        Ok(pending)
    }
}

impl PendingWrite for PendingTransactionBuilder<Ethereum> {
    fn tx_hash(&self) -> TxHash {
        *Self::tx_hash(self)
    }

    async fn confirm(self) -> eyre::Result<Confirmation> {
        let receipt = self.with_required_confirmations(1).get_receipt().await?;

        Ok(Confirmation {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
            success: receipt.status(),
        })
    }
}

/// Builds write handles from the wallet's signer for an account.
#[derive(Clone)]
pub struct WalletSigners<W> {
    wallet: Option<W>,
    token: Address,
}

impl<W> WalletSigners<W>
where
    W: WalletProvider,
{
    pub const fn new(wallet: Option<W>, token: Address) -> Self {
        Self { wallet, token }
    }
}

impl<W> SignerFactory for WalletSigners<W>
where
    W: WalletProvider,
{
    type Writer = TokenSigner<DynProvider>;

    async fn create(&self, account: Address) -> Result<Self::Writer, WalletError> {
        let wallet = self.wallet.as_ref().ok_or(WalletError::NoWallet)?;
        let provider = wallet.signer_provider(account).await?;

        Ok(TokenSigner::new(self.token, account, provider))
    }
}
