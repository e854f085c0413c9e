//! Prometheus metrics for the dashboard.
//!
//! All metrics are aggregated in the [`Metrics`] struct; recording is a no-op
//! until a recorder is installed (see [`install_prometheus_exporter`]).

use crate::action::ActionKind;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Sync metrics
        describe_counter!(
            "dashboard_syncs_total",
            "Total number of state synchronizations by kind and outcome"
        );
        describe_histogram!(
            "dashboard_sync_duration_seconds",
            "Duration of each state synchronization in seconds"
        );

        // Action metrics
        describe_counter!(
            "dashboard_actions_submitted_total",
            "Total write actions accepted by the wallet, by action"
        );
        describe_counter!(
            "dashboard_actions_confirmed_total",
            "Total write actions mined successfully, by action"
        );
        describe_counter!(
            "dashboard_actions_failed_total",
            "Total write actions that failed, by action"
        );
        describe_histogram!(
            "dashboard_confirmation_seconds",
            "Time from submission to confirmation in seconds"
        );

        // Wallet metrics
        describe_counter!(
            "dashboard_wallet_events_total",
            "Total account and chain notifications received from the wallet"
        );
        describe_gauge!(
            "dashboard_wallet_connected",
            "1 when an account is connected, 0 otherwise"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Sync metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a completed sync; `kind` is `full` or `balances`.
    pub fn record_sync(&self, kind: &'static str, success: bool, duration: Duration) {
        let outcome = if success { "success" } else { "failure" };
        counter!("dashboard_syncs_total", "kind" => kind, "outcome" => outcome).increment(1);
        histogram!("dashboard_sync_duration_seconds", "kind" => kind)
            .record(duration.as_secs_f64());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Action metrics
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn record_action_submitted(&self, kind: ActionKind) {
        counter!("dashboard_actions_submitted_total", "action" => kind.as_str()).increment(1);
    }

    /// Record a mined action and how long it waited for its block.
    pub fn record_action_confirmed(&self, kind: ActionKind, waited: Duration) {
        counter!("dashboard_actions_confirmed_total", "action" => kind.as_str()).increment(1);
        histogram!("dashboard_confirmation_seconds", "action" => kind.as_str())
            .record(waited.as_secs_f64());
    }

    pub fn record_action_failed(&self, kind: ActionKind) {
        counter!("dashboard_actions_failed_total", "action" => kind.as_str()).increment(1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Wallet metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a wallet notification; `event` is `accounts` or `chain`.
    pub fn record_wallet_event(&self, event: &'static str) {
        counter!("dashboard_wallet_events_total", "event" => event).increment(1);
    }

    pub fn set_connected(&self, connected: bool) {
        gauge!("dashboard_wallet_connected").set(if connected { 1.0 } else { 0.0 });
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
