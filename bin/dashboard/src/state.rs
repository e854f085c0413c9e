//! Dashboard state and the store that owns it.
//!
//! The store is the single place the displayed state lives. Only the
//! [`crate::Dashboard`] writes to it; any number of readers can take snapshots
//! or wait for changes.

use crate::action::PendingAction;
use alloy_primitives::{Address, U256};
use amount::format_amount;
use client::Session;
use token::TokenMetadata;
use tokio::sync::watch;

/// Token holding of one account, at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    /// The address holding the balance
    pub holder: Address,
    /// The raw balance amount
    pub amount: U256,
}

/// Everything the dashboard displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub session: Session,
    pub metadata: Option<TokenMetadata>,
    pub owner: Option<Address>,
    pub total_supply: Option<U256>,
    pub balance: Option<Balance>,
    /// Most recent write action
    pub action: Option<PendingAction>,
    /// Outcome of the last connection or network request
    pub notice: Option<String>,
}

impl DashboardState {
    pub fn decimals(&self) -> Option<u8> {
        self.metadata.as_ref().map(|metadata| metadata.decimals)
    }

    /// Balance of the connected account; a balance fetched for a previous
    /// account is ignored.
    pub fn current_balance(&self) -> Option<U256> {
        let account = self.session.account?;
        self.balance
            .filter(|balance| balance.holder == account)
            .map(|balance| balance.amount)
    }

    pub fn is_owner(&self) -> bool {
        matches!((self.session.account, self.owner), (Some(account), Some(owner)) if account == owner)
    }

    /// Formatted view of the token, using one decimals value for every amount.
    pub fn view(&self) -> Option<TokenView> {
        let metadata = self.metadata.as_ref()?;
        let decimals = metadata.decimals;

        Some(TokenView {
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            decimals,
            owner: self.owner,
            total_supply: self.total_supply.map(|raw| format_amount(raw, decimals)),
            balance: self.current_balance().map(|raw| format_amount(raw, decimals)),
        })
    }

    /// Which write controls are usable against `expected_chain_id`.
    pub fn controls(&self, expected_chain_id: u64) -> Controls {
        let connected = self.session.is_connected();
        let chain_mismatch = (connected && self.session.chain_id != Some(expected_chain_id))
            .then_some(ChainMismatch {
                expected: expected_chain_id,
                actual: self.session.chain_id,
            });
        let can_write = connected && chain_mismatch.is_none();

        Controls {
            connected,
            chain_mismatch,
            can_write,
            can_mint: can_write && self.is_owner(),
        }
    }
}

/// Display strings for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenView {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub owner: Option<Address>,
    pub total_supply: Option<String>,
    pub balance: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMismatch {
    pub expected: u64,
    pub actual: Option<u64>,
}

/// Enablement of the write controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub connected: bool,
    /// Set when connected to another chain; remedied by switching networks
    pub chain_mismatch: Option<ChainMismatch>,
    /// Transfer and burn
    pub can_write: bool,
    pub can_mint: bool,
}

/// Single-writer, multi-reader container for [`DashboardState`].
#[derive(Debug)]
pub struct Store {
    tx: watch::Sender<DashboardState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(DashboardState::default());
        Self { tx }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every update.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    pub(crate) fn update(&self, modify: impl FnOnce(&mut DashboardState)) {
        self.tx.send_modify(modify);
    }

    /// Like [`Store::update`], but readers are only notified when `modify`
    /// returns true.
    pub(crate) fn update_if(&self, modify: impl FnOnce(&mut DashboardState) -> bool) -> bool {
        self.tx.send_if_modified(modify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const SEPOLIA: u64 = 11155111;

    fn metadata(decimals: u8) -> TokenMetadata {
        TokenMetadata {
            name: "Dashboard Token".to_string(),
            symbol: "DASH".to_string(),
            decimals,
        }
    }

    fn connected(account: Address, chain_id: u64) -> DashboardState {
        DashboardState {
            session: Session {
                account: Some(account),
                chain_id: Some(chain_id),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_view_formats_exactly() {
        let state = DashboardState {
            metadata: Some(metadata(18)),
            total_supply: Some(U256::from_str("1000000000000000000000").unwrap()),
            ..connected(Address::repeat_byte(1), SEPOLIA)
        };

        let view = state.view().unwrap();
        assert_eq!(view.total_supply.as_deref(), Some("1000.0"));
        assert_eq!(view.symbol, "DASH");
    }

    #[test]
    fn test_view_requires_metadata() {
        let state = DashboardState {
            total_supply: Some(U256::from(1)),
            ..Default::default()
        };
        assert!(state.view().is_none());
    }

    #[test]
    fn test_balance_of_previous_account_is_hidden() {
        let mut state = connected(Address::repeat_byte(1), SEPOLIA);
        state.metadata = Some(metadata(0));
        state.balance = Some(Balance {
            holder: Address::repeat_byte(2),
            amount: U256::from(5),
        });

        assert_eq!(state.current_balance(), None);
        assert_eq!(state.view().unwrap().balance, None);

        state.session.account = Some(Address::repeat_byte(2));
        assert_eq!(state.view().unwrap().balance.as_deref(), Some("5.0"));
    }

    #[test]
    fn test_controls_disconnected() {
        let controls = DashboardState::default().controls(SEPOLIA);

        assert!(!controls.connected);
        assert!(!controls.can_write);
        assert!(!controls.can_mint);
        assert!(controls.chain_mismatch.is_none());
    }

    #[test]
    fn test_controls_wrong_chain() {
        let mut state = connected(Address::repeat_byte(1), 1);
        state.owner = Some(Address::repeat_byte(1));

        let controls = state.controls(SEPOLIA);
        assert!(!controls.can_write);
        assert!(!controls.can_mint);
        assert_eq!(
            controls.chain_mismatch,
            Some(ChainMismatch {
                expected: SEPOLIA,
                actual: Some(1),
            })
        );
    }

    #[test]
    fn test_mint_enabled_only_for_owner_regardless_of_case() {
        let lower = Address::from_str("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        let upper = Address::from_str("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD").unwrap();

        let mut state = connected(lower, SEPOLIA);
        state.owner = Some(upper);
        let controls = state.controls(SEPOLIA);
        assert!(controls.can_write);
        assert!(controls.can_mint);

        state.owner = Some(Address::repeat_byte(7));
        let controls = state.controls(SEPOLIA);
        assert!(controls.can_write);
        assert!(!controls.can_mint);

        state.owner = None;
        assert!(!state.controls(SEPOLIA).can_mint);
    }

    #[tokio::test]
    async fn test_store_notifies_readers() {
        let store = Store::new();
        let mut rx = store.subscribe();

        store.update(|state| state.notice = Some("hello".to_string()));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().notice.as_deref(), Some("hello"));
        assert_eq!(store.snapshot().notice.as_deref(), Some("hello"));
    }
}
