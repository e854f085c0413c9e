//! Token dashboard: wallet connection, token state and write actions.
//!
//! [`Dashboard`] is the single writer of the displayed [`DashboardState`]. It
//! reads the token through a [`TokenReader`], talks to the wallet through a
//! [`ConnectionManager`], and signs writes with handles memoized by a
//! [`SignerCache`].

pub mod action;
pub mod config;
pub mod error;
pub mod metrics;
pub mod render;
pub mod state;
pub mod sync;

use crate::{
    action::{validate, ActionKind, ActionPhase, ActionRequest, PendingAction, ValidatedCall},
    config::DashboardConfig,
    error::DashboardError,
    metrics::Metrics,
    state::{Controls, DashboardState, Store},
    sync::{fetch_balances, fetch_snapshot},
};
use client::{ConnectionManager, Session, Subscription, WalletEvent, WalletProvider};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};
use token::{PendingWrite, SignerCache, SignerFactory, SignerKey, TokenReader, TokenWriter};
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{debug, info, warn};

type Pending<F> = <<F as SignerFactory>::Writer as TokenWriter>::Pending;

pub struct Dashboard<W, R, F: SignerFactory> {
    config: DashboardConfig,
    connection: ConnectionManager<W>,
    reader: R,
    signers: SignerCache<F>,
    store: Store,
    /// Number of the most recent action; only it may publish its phase
    generation: AtomicU64,
    metrics: Metrics,
}

impl<W, R, F> Dashboard<W, R, F>
where
    W: WalletProvider,
    R: TokenReader,
    F: SignerFactory,
{
    pub fn new(config: DashboardConfig, wallet: Option<W>, reader: R, signers: F) -> Self {
        let connection = ConnectionManager::new(wallet, config.chain.clone());

        Self {
            config,
            connection,
            reader,
            signers: SignerCache::new(signers),
            store: Store::new(),
            generation: AtomicU64::new(0),
            metrics: Metrics::new(),
        }
    }

    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn snapshot(&self) -> DashboardState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.store.subscribe()
    }

    pub fn controls(&self) -> Controls {
        self.store.snapshot().controls(self.config.expected_chain_id())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Wallet
    // ─────────────────────────────────────────────────────────────────────────────

    /// Request account access, then load the token state for the account.
    pub async fn connect(&self) -> Result<Session, DashboardError> {
        let session = match self.connection.connect().await {
            Ok(session) => session,
            Err(e) => {
                let error = DashboardError::from(e);
                warn!(%error, "Failed to connect wallet");
                self.store.update(|state| state.notice = Some(error.to_string()));
                return Err(error);
            }
        };

        if session.account.is_none() {
            self.signers.clear().await;
        }
        self.store.update(|state| {
            state.session = session;
            state.notice = None;
        });
        self.metrics.set_connected(session.is_connected());

        self.sync().await;
        Ok(session)
    }

    /// Move the wallet to the expected chain. Failures end up in the notice.
    pub async fn switch_to_expected_chain(&self) -> Result<(), DashboardError> {
        if let Err(e) = self.connection.switch_to_expected_chain().await {
            let error = DashboardError::from(e);
            warn!(%error, chain_id = self.config.expected_chain_id(), "Failed to switch chain");
            self.store.update(|state| state.notice = Some(error.to_string()));
            return Err(error);
        }

        self.store.update(|state| state.notice = None);
        self.sync().await;
        Ok(())
    }

    /// Switch chains, then reconnect so the account is picked up as well.
    pub async fn switch_and_connect(&self) -> Result<Session, DashboardError> {
        self.switch_to_expected_chain().await?;
        self.connect().await
    }

    /// Follow wallet notifications until the subscription is dropped: every
    /// account or chain change updates the session and resynchronizes.
    pub fn listen(self: &Arc<Self>) -> Result<Subscription, DashboardError>
    where
        R: 'static,
        F: 'static,
    {
        let mut events = self.connection.subscribe()?;
        let dashboard = Arc::clone(self);

        Ok(Subscription::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => dashboard.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed wallet notifications, resynchronizing");
                        dashboard.sync().await;
                    }
                    Err(RecvError::Closed) => {
                        debug!("Wallet notification channel closed");
                        break;
                    }
                }
            }
        }))
    }

    async fn handle_event(&self, event: WalletEvent) {
        let label = match &event {
            WalletEvent::AccountsChanged(_) => "accounts",
            WalletEvent::ChainChanged(_) => "chain",
        };
        self.metrics.record_wallet_event(label);
        info!(?event, "Wallet notification");

        let mut session = Session::default();
        self.store.update(|state| {
            state.session.apply(&event);
            session = state.session;
        });
        self.metrics.set_connected(session.is_connected());

        if session.account.is_none() {
            self.signers.clear().await;
        }

        self.sync().await;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────────

    async fn current_chain_id(&self) -> eyre::Result<u64> {
        match self.connection.wallet() {
            Some(wallet) => Ok(wallet.chain_id().await?),
            None => self.reader.chain_id().await,
        }
    }

    /// Reload chain, metadata, owner, supply and balance.
    ///
    /// Returns false and leaves the state untouched if any read fails.
    pub async fn sync(&self) -> bool {
        let started = Instant::now();
        let result = self.try_sync().await;
        self.metrics
            .record_sync("full", result.is_ok(), started.elapsed());

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to synchronize token state");
                false
            }
        }
    }

    async fn try_sync(&self) -> eyre::Result<()> {
        let chain_id = self.current_chain_id().await?;
        let account = self.store.snapshot().session.account;
        let snapshot = fetch_snapshot(&self.reader, account).await?;

        self.store.update(|state| {
            state.session.chain_id = Some(chain_id);
            snapshot.apply(state);
        });

        debug!(chain_id, ?account, "Token state synchronized");
        Ok(())
    }

    /// Reload total supply and the connected account's balance.
    pub async fn refresh_balances(&self) -> bool {
        let started = Instant::now();
        let account = self.store.snapshot().session.account;
        let result = fetch_balances(&self.reader, account).await;
        self.metrics
            .record_sync("balances", result.is_ok(), started.elapsed());

        match result {
            Ok(balances) => {
                self.store.update(|state| balances.apply(state));
                true
            }
            Err(e) => {
                warn!(error = %e, ?account, "Failed to refresh balances");
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn transfer(&self, to: &str, amount: &str) -> Result<PendingAction, DashboardError> {
        self.execute(ActionRequest::Transfer {
            to: to.to_string(),
            amount: amount.to_string(),
        })
        .await
    }

    pub async fn mint(&self, to: &str, amount: &str) -> Result<PendingAction, DashboardError> {
        self.execute(ActionRequest::Mint {
            to: to.to_string(),
            amount: amount.to_string(),
        })
        .await
    }

    pub async fn burn(&self, amount: &str) -> Result<PendingAction, DashboardError> {
        self.execute(ActionRequest::Burn {
            amount: amount.to_string(),
        })
        .await
    }

    /// Validate, submit and confirm one write.
    ///
    /// A request rejected locally returns `Err` without touching the network.
    /// Anything that goes wrong afterwards is reported in the returned
    /// action's [`ActionPhase::Failed`].
    pub async fn execute(&self, request: ActionRequest) -> Result<PendingAction, DashboardError> {
        let kind = request.kind();
        let state = self.store.snapshot();

        let (account, call) =
            match validate(&request, &state, self.config.expected_chain_id()) {
                Ok(validated) => validated,
                Err(error) => {
                    info!(action = %kind, %error, "Action rejected");
                    self.store.update(|state| state.notice = Some(error.to_string()));
                    return Err(error);
                }
            };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut action = PendingAction::new(kind);
        self.publish(generation, &action);

        let key = SignerKey {
            chain_id: state.session.chain_id,
            account,
        };
        let pending = match self.submit(key, call).await {
            Ok(pending) => pending,
            Err(error) => return Ok(self.fail(generation, action, error)),
        };

        let tx_hash = pending.tx_hash();
        action.advance(ActionPhase::Submitted { tx_hash });
        self.metrics.record_action_submitted(kind);
        info!(action = %kind, %tx_hash, %account, "Transaction sent");
        self.publish(generation, &action);

        let submitted_at = Instant::now();
        let confirmation = match pending.confirm().await {
            Ok(confirmation) if confirmation.success => confirmation,
            Ok(_) => return Ok(self.fail(generation, action, DashboardError::Reverted(tx_hash))),
            Err(e) => return Ok(self.fail(generation, action, DashboardError::remote(&e))),
        };
        self.metrics
            .record_action_confirmed(kind, submitted_at.elapsed());

        // A superseded action still refreshes; its balances are current too.
        self.refresh_balances().await;

        action.advance(ActionPhase::Confirmed {
            tx_hash,
            block_number: confirmation.block_number,
        });
        info!(
            action = %kind,
            %tx_hash,
            block_number = ?confirmation.block_number,
            gas_used = ?confirmation.gas_used,
            "Transaction confirmed"
        );
        self.publish(generation, &action);

        Ok(action)
    }

    async fn submit(
        &self,
        key: SignerKey,
        call: ValidatedCall,
    ) -> Result<Pending<F>, DashboardError> {
        let writer = self.signers.get(key).await?;

        let submitted = match call {
            ValidatedCall::Transfer { to, amount } => writer.transfer(to, amount).await,
            ValidatedCall::Mint { to, amount } => writer.mint(to, amount).await,
            ValidatedCall::Burn { amount } => writer.burn(amount).await,
        };

        submitted.map_err(|e| DashboardError::remote(&e))
    }

    fn fail(&self, generation: u64, mut action: PendingAction, error: DashboardError) -> PendingAction {
        warn!(
            action = %action.kind,
            tx_hash = ?action.phase.tx_hash(),
            %error,
            "Action failed"
        );
        self.metrics.record_action_failed(action.kind);

        action.fail(error.to_string());
        self.publish(generation, &action);
        action
    }

    /// Store the action's phase unless a newer action has started since.
    fn publish(&self, generation: u64, action: &PendingAction) {
        let published = self.store.update_if(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            state.action = Some(action.clone());
            state.notice = None;
            true
        });

        if !published {
            debug!(action = %action.kind, generation, "Superseded action, status not shown");
        }
    }

    /// Status line of the latest action.
    pub fn status_text(&self) -> Option<String> {
        self.store
            .snapshot()
            .action
            .map(|action| action.status_text(&self.config.chain))
    }

    /// Kind of the action currently waiting on the wallet or on a block.
    pub fn in_flight(&self) -> Option<ActionKind> {
        self.store
            .snapshot()
            .action
            .filter(|action| !action.phase.is_terminal())
            .map(|action| action.kind)
    }
}
