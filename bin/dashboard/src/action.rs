//! Write actions: transfer, mint and burn.
//!
//! An action goes `Submitting → Submitted → Confirmed`, or ends in `Failed`
//! from `Submitting` or `Submitted`. The hash is always shown in `Submitted`
//! before confirmation, since mining can take arbitrarily long.

use crate::{error::DashboardError, state::DashboardState};
use alloy_primitives::{Address, TxHash, U256};
use amount::parse_amount;
use config::ChainParams;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Transfer,
    Mint,
    Burn,
}

impl ActionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Mint => "mint",
            Self::Burn => "burn",
        }
    }

    const fn title(&self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Mint => "Mint",
            Self::Burn => "Burn",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPhase {
    Submitting,
    Submitted {
        tx_hash: TxHash,
    },
    Confirmed {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
    Failed {
        tx_hash: Option<TxHash>,
        reason: String,
    },
}

impl ActionPhase {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Failed { .. })
    }

    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Submitting => None,
            Self::Submitted { tx_hash } | Self::Confirmed { tx_hash, .. } => Some(*tx_hash),
            Self::Failed { tx_hash, .. } => *tx_hash,
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub const fn can_advance_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Submitting, Self::Submitted { .. })
                | (Self::Submitting, Self::Failed { .. })
                | (Self::Submitted { .. }, Self::Confirmed { .. })
                | (Self::Submitted { .. }, Self::Failed { .. })
        )
    }
}

/// An in-flight or just finished write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub phase: ActionPhase,
}

impl PendingAction {
    pub const fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            phase: ActionPhase::Submitting,
        }
    }

    /// Move to `next` if the transition is allowed. Returns false otherwise
    /// and leaves the action untouched.
    pub fn advance(&mut self, next: ActionPhase) -> bool {
        if !self.phase.can_advance_to(&next) {
            return false;
        }
        self.phase = next;
        true
    }

    /// Fail the action, keeping the hash if it was already submitted.
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        let tx_hash = self.phase.tx_hash();
        self.advance(ActionPhase::Failed {
            tx_hash,
            reason: reason.into(),
        })
    }

    /// Status line, linking the transaction on the chain's explorer.
    pub fn status_text(&self, chain: &ChainParams) -> String {
        let title = self.kind.title();
        let reference = |tx_hash: &TxHash| match chain.tx_url(tx_hash) {
            Some(url) => format!("{tx_hash} ({url})"),
            None => tx_hash.to_string(),
        };

        match &self.phase {
            ActionPhase::Submitting => format!("{title}: waiting for wallet..."),
            ActionPhase::Submitted { tx_hash } => {
                format!("{title} sent: {}", reference(tx_hash))
            }
            ActionPhase::Confirmed { tx_hash, .. } => {
                format!("{title} confirmed: {}", reference(tx_hash))
            }
            ActionPhase::Failed { reason, .. } => format!("{title} failed: {reason}"),
        }
    }
}

/// Raw form input for a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Transfer { to: String, amount: String },
    Mint { to: String, amount: String },
    Burn { amount: String },
}

impl ActionRequest {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Transfer { .. } => ActionKind::Transfer,
            Self::Mint { .. } => ActionKind::Mint,
            Self::Burn { .. } => ActionKind::Burn,
        }
    }
}

/// A request that passed every local check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedCall {
    Transfer { to: Address, amount: U256 },
    Mint { to: Address, amount: U256 },
    Burn { amount: U256 },
}

/// Check a request against the current state without touching the network.
///
/// The contract enforces its own rules; these checks only keep requests that
/// would certainly fail from reaching the wallet.
pub fn validate(
    request: &ActionRequest,
    state: &DashboardState,
    expected_chain_id: u64,
) -> Result<(Address, ValidatedCall), DashboardError> {
    let (to, amount) = match request {
        ActionRequest::Transfer { to, amount } | ActionRequest::Mint { to, amount } => {
            (Some(required("Recipient", to)?), required("Amount", amount)?)
        }
        ActionRequest::Burn { amount } => (None, required("Amount", amount)?),
    };

    let account = state.session.account.ok_or(DashboardError::NoSigner)?;
    if state.session.chain_id != Some(expected_chain_id) {
        return Err(DashboardError::ChainMismatch {
            expected: expected_chain_id,
            actual: state.session.chain_id,
        });
    }

    let decimals = state.decimals().ok_or(DashboardError::MetadataUnavailable)?;

    if request.kind() == ActionKind::Mint {
        let owner = state.owner.ok_or(DashboardError::MetadataUnavailable)?;
        if owner != account {
            return Err(DashboardError::NotOwner);
        }
    }

    let to = to
        .map(|to| {
            to.parse::<Address>()
                .map_err(|_| DashboardError::InvalidAddress(to.to_string()))
        })
        .transpose()?;
    let amount = parse_amount(amount, decimals)?;

    let call = match (request.kind(), to) {
        (ActionKind::Transfer, Some(to)) => ValidatedCall::Transfer { to, amount },
        (ActionKind::Mint, Some(to)) => ValidatedCall::Mint { to, amount },
        _ => ValidatedCall::Burn { amount },
    };

    Ok((account, call))
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DashboardError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DashboardError::MissingField(field));
    }
    Ok(value)
}
