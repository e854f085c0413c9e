//! Reads that populate the dashboard state.

use crate::state::{Balance, DashboardState};
use alloy_primitives::{Address, U256};
use token::{fetch_metadata, TokenMetadata, TokenReader};
use tracing::debug;

/// Everything one full read of the contract produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub metadata: TokenMetadata,
    pub owner: Address,
    pub total_supply: U256,
    pub balance: Option<Balance>,
}

impl Snapshot {
    pub fn apply(self, state: &mut DashboardState) {
        state.metadata = Some(self.metadata);
        state.owner = Some(self.owner);
        state.total_supply = Some(self.total_supply);
        if self.balance.is_some() {
            state.balance = self.balance;
        }
    }
}

/// Supply and, for a connected account, its balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub total_supply: U256,
    pub balance: Option<Balance>,
}

impl Balances {
    pub fn apply(self, state: &mut DashboardState) {
        state.total_supply = Some(self.total_supply);
        if self.balance.is_some() {
            state.balance = self.balance;
        }
    }
}

/// Read metadata, then supply and owner, then the account balance.
pub async fn fetch_snapshot<R: TokenReader>(
    reader: &R,
    account: Option<Address>,
) -> eyre::Result<Snapshot> {
    let metadata = fetch_metadata(reader).await?;
    let (total_supply, owner) = tokio::try_join!(reader.total_supply(), reader.owner())?;
    let balance = fetch_balance(reader, account).await?;

    debug!(
        name = %metadata.name,
        symbol = %metadata.symbol,
        decimals = metadata.decimals,
        %owner,
        %total_supply,
        "Fetched token snapshot"
    );

    Ok(Snapshot {
        metadata,
        owner,
        total_supply,
        balance,
    })
}

/// Read only what a write can change.
pub async fn fetch_balances<R: TokenReader>(
    reader: &R,
    account: Option<Address>,
) -> eyre::Result<Balances> {
    let (total_supply, balance) =
        tokio::try_join!(reader.total_supply(), fetch_balance(reader, account))?;

    Ok(Balances {
        total_supply,
        balance,
    })
}

async fn fetch_balance<R: TokenReader>(
    reader: &R,
    account: Option<Address>,
) -> eyre::Result<Option<Balance>> {
    let Some(holder) = account else {
        return Ok(None);
    };

    let amount = reader.balance_of(holder).await?;
    Ok(Some(Balance { holder, amount }))
}
