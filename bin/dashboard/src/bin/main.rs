//! Terminal front end for the token dashboard.
//!
//! - `show`: token details, read without a wallet
//! - `connect`: request account access and show the account's view
//! - `switch-chain`: move the wallet to the expected chain
//! - `transfer`, `mint`, `burn`: submit a write and wait for its block
//! - `watch`: follow wallet notifications and redraw on every change

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use client::{InjectedWallet, LocalWallet, RpcWallet, Subscription, WalletProvider};
use dashboard::{
    action::{ActionPhase, ActionRequest},
    config::{Config, ConfigError, DashboardConfig},
    metrics::install_prometheus_exporter,
    render::render,
    Dashboard,
};
use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};
use token::{SignerFactory, TokenContract, TokenReader, WalletSigners};
use tracing::{error, info, warn};

const WALLET_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "View and operate an ERC20 token through a wallet")]
struct Cli {
    /// Path to the configuration file; optional
    #[arg(short, long, default_value = "dashboard.toml")]
    config: PathBuf,

    /// Deployed token contract address
    #[arg(long, env = "TOKEN_ADDRESS")]
    token_address: Option<Address>,

    /// Chain the token lives on
    #[arg(long, env = "EXPECTED_CHAIN_ID")]
    chain_id: Option<u64>,

    /// RPC endpoint used for reads
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// JSON-RPC wallet endpoint; takes precedence over a private key
    #[arg(long, env = "WALLET_URL")]
    wallet_url: Option<String>,

    /// Private key for a local wallet (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show token details
    Show,

    /// Connect the wallet and show the account's balance
    Connect,

    /// Switch the wallet to the expected chain, adding it if unknown
    SwitchChain,

    /// Transfer tokens from the connected account
    Transfer {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },

    /// Mint tokens (owner only)
    Mint {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },

    /// Burn tokens from the connected account
    Burn {
        #[arg(long)]
        amount: String,
    },

    /// Follow wallet changes until interrupted
    Watch,
}

impl Cli {
    /// File settings with flags and environment on top.
    fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = if self.config.exists() {
            Config::from_file(&self.config)?
        } else {
            info!(path = %self.config.display(), "No config file, using flags and environment");
            Config::default()
        };

        if self.token_address.is_some() {
            config.contract_address = self.token_address;
        }
        if self.chain_id.is_some() {
            config.chain_id = self.chain_id;
        }
        if self.rpc_url.is_some() {
            config.rpc_url = self.rpc_url.clone();
        }
        if self.wallet_url.is_some() {
            config.wallet_url = self.wallet_url.clone();
        }

        Ok(config)
    }
}

/// Pick the wallet: a JSON-RPC endpoint, else a local key, else none.
fn select_wallet(
    config: &DashboardConfig,
    private_key: Option<&str>,
) -> eyre::Result<(Option<InjectedWallet>, Option<RpcWallet>)> {
    if let Some(url) = &config.wallet_url {
        let wallet = RpcWallet::new(url.clone());
        info!(url = %wallet.url(), "Using JSON-RPC wallet");
        return Ok((Some(wallet.clone().into()), Some(wallet)));
    }

    if let Some(key) = private_key {
        let wallet = LocalWallet::new(key, config.expected_chain_id(), config.rpc_url.clone())?;
        info!(account = %wallet.address(), "Using local key wallet");
        return Ok((Some(wallet.into()), None));
    }

    warn!("No wallet configured, read-only mode");
    Ok((None, None))
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.load_config()?.validate() {
        Ok(config) => config,
        Err(e @ (ConfigError::MissingContractAddress | ConfigError::MissingRpcUrl { .. })) => {
            error!("{e}");
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    info!("Loaded config:");
    info!("  Token: {}", config.contract_address);
    info!(
        "  Chain: {} ({})",
        config.chain.chain_name,
        config.expected_chain_id()
    );
    info!("  RPC URL: {}", config.rpc_url);

    if let Some(port) = cli.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Serving Prometheus metrics");
    }

    let provider = client::create_provider(&config.rpc_url).await?;
    let reader = TokenContract::new(config.contract_address, provider);
    let (wallet, rpc_wallet) = select_wallet(&config, cli.private_key.as_deref())?;
    let signers = WalletSigners::new(wallet.clone(), config.contract_address);
    let dashboard = Arc::new(Dashboard::new(config, wallet, reader, signers));

    let succeeded = match cli.command {
        Command::Show => {
            let synced = dashboard.sync().await;
            print_state(&dashboard);
            synced
        }
        Command::Connect => {
            let connected = dashboard.connect().await.is_ok();
            print_state(&dashboard);
            connected
        }
        Command::SwitchChain => {
            let switched = dashboard.switch_and_connect().await.is_ok();
            print_state(&dashboard);
            switched
        }
        Command::Transfer { to, amount } => {
            run_action(&dashboard, ActionRequest::Transfer { to, amount }).await
        }
        Command::Mint { to, amount } => {
            run_action(&dashboard, ActionRequest::Mint { to, amount }).await
        }
        Command::Burn { amount } => run_action(&dashboard, ActionRequest::Burn { amount }).await,
        Command::Watch => {
            watch(&dashboard, rpc_wallet).await;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_state<W, R, F>(dashboard: &Dashboard<W, R, F>)
where
    W: WalletProvider,
    R: TokenReader,
    F: SignerFactory,
{
    print!("{}", render(&dashboard.snapshot(), &dashboard.config().chain));
}

async fn run_action<W, R, F>(dashboard: &Dashboard<W, R, F>, request: ActionRequest) -> bool
where
    W: WalletProvider,
    R: TokenReader,
    F: SignerFactory,
{
    if dashboard.connect().await.is_err() {
        print_state(dashboard);
        return false;
    }

    let kind = request.kind();
    info!(action = %kind, "Submitting");

    let result = dashboard.execute(request).await;
    print_state(dashboard);

    matches!(
        result,
        Ok(action) if matches!(action.phase, ActionPhase::Confirmed { .. })
    )
}

async fn watch<W, R, F>(dashboard: &Arc<Dashboard<W, R, F>>, rpc_wallet: Option<RpcWallet>)
where
    W: WalletProvider,
    R: TokenReader + 'static,
    F: SignerFactory + 'static,
{
    if dashboard.connect().await.is_err() {
        dashboard.sync().await;
    }

    let _listener: Option<Subscription> = match dashboard.listen() {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            warn!(error = %e, "Not following wallet notifications");
            None
        }
    };
    // HTTP wallets cannot push, so poll them for changes.
    let _poller = rpc_wallet.map(|wallet| wallet.watch(WALLET_POLL_INTERVAL));

    let mut updates = dashboard.subscribe();
    print_state(dashboard);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                println!();
                print!("{}", render(&state, &dashboard.config().chain));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }
}
