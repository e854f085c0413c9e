//! Plain text rendering of the dashboard state.

use crate::{error::DashboardError, state::DashboardState};
use config::ChainParams;
use std::fmt::Write;

/// Render the state as the lines a terminal user sees.
pub fn render(state: &DashboardState, chain: &ChainParams) -> String {
    let mut out = String::new();
    let controls = state.controls(chain.chain_id);

    match state.session.account {
        Some(account) => {
            let network = state
                .session
                .chain_id
                .map_or_else(|| "unknown".to_string(), |id| id.to_string());
            let _ = writeln!(out, "Account:      {account} (chain {network})");
        }
        None => {
            let _ = writeln!(out, "Account:      not connected");
        }
    }

    if let Some(mismatch) = controls.chain_mismatch {
        let error = DashboardError::ChainMismatch {
            expected: mismatch.expected,
            actual: mismatch.actual,
        };
        let _ = writeln!(out, "Network:      {error} (run `switch-chain`)");
    }

    match state.view() {
        Some(view) => {
            let _ = writeln!(out, "Token:        {} ({})", view.name, view.symbol);
            let _ = writeln!(out, "Decimals:     {}", view.decimals);
            if let Some(owner) = view.owner {
                let _ = writeln!(out, "Owner:        {owner}");
            }
            if let Some(supply) = view.total_supply {
                let _ = writeln!(out, "Total supply: {supply} {}", view.symbol);
            }
            if let Some(balance) = view.balance {
                let _ = writeln!(out, "Balance:      {balance} {}", view.symbol);
            }
        }
        None => {
            let _ = writeln!(out, "Token:        loading...");
        }
    }

    if controls.connected {
        let mut actions = Vec::new();
        if controls.can_write {
            actions.extend(["transfer", "burn"]);
        }
        if controls.can_mint {
            actions.push("mint");
        }
        let available = if actions.is_empty() {
            "none".to_string()
        } else {
            actions.join(", ")
        };
        let _ = writeln!(out, "Actions:      {available}");
    }

    if let Some(action) = &state.action {
        let _ = writeln!(out, "Status:       {}", action.status_text(chain));
    }
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "Notice:       {notice}");
    }

    out
}
