//! Wallet connection management.
//!
//! Connects to the configured wallet, exposes its notifications and moves it
//! onto the chain the dashboard expects.

use crate::wallet::{Session, WalletError, WalletEvent, WalletProvider};
use config::ChainParams;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Owns the (optional) wallet and the chain it should be on.
pub struct ConnectionManager<W> {
    wallet: Option<W>,
    target: ChainParams,
}

impl<W> ConnectionManager<W>
where
    W: WalletProvider,
{
    pub const fn new(wallet: Option<W>, target: ChainParams) -> Self {
        Self { wallet, target }
    }

    pub const fn wallet(&self) -> Option<&W> {
        self.wallet.as_ref()
    }

    fn require_wallet(&self) -> Result<&W, WalletError> {
        self.wallet.as_ref().ok_or(WalletError::NoWallet)
    }

    /// Request account access and read the wallet's chain.
    pub async fn connect(&self) -> Result<Session, WalletError> {
        let wallet = self.require_wallet()?;

        let accounts = wallet.request_accounts().await?;
        let chain_id = wallet.chain_id().await?;

        let session = Session {
            account: accounts.first().copied(),
            chain_id: Some(chain_id),
        };

        match session.account {
            Some(account) => info!(%account, chain_id, "Wallet connected"),
            None => warn!(chain_id, "Wallet connected without any authorized account"),
        }

        Ok(session)
    }

    /// Account and chain notifications from the wallet.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<WalletEvent>, WalletError> {
        Ok(self.require_wallet()?.subscribe())
    }

    /// Move the wallet to the expected chain, teaching it the chain first if
    /// it does not recognize it.
    pub async fn switch_to_expected_chain(&self) -> Result<(), WalletError> {
        let wallet = self.require_wallet()?;
        let chain_id = self.target.chain_id;

        match wallet.switch_chain(chain_id).await {
            Ok(()) => {}
            Err(e) if e.is_unrecognized_chain() => {
                info!(chain_id, name = %self.target.chain_name, "Wallet does not know chain, adding it");
                wallet.add_chain(&self.target).await?;
                wallet.switch_chain(chain_id).await?;
            }
            Err(e) => return Err(e),
        }

        info!(chain_id, "Wallet switched to expected chain");
        Ok(())
    }
}
