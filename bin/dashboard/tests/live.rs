//! Reads against a deployed token.
//!
//! Run with `TOKEN_ADDRESS` (and optionally `RPC_URL`) set:
//! `cargo test -p dashboard --test live -- --ignored`

use crate::setup::load_live_config;
use client::LocalWallet;
use dashboard::{render::render, Dashboard};
use token::{fetch_metadata, TokenContract, TokenReader, WalletSigners};


#[tokio::test]
#[ignore = "requires a deployed token and network access"]
async fn test_read_token_metadata() {
    let config = load_live_config();
    let provider = client::create_provider(&config.rpc_url)
        .await
        .expect("Failed to create provider");
    let token = TokenContract::new(config.contract_address, provider);

    let metadata = fetch_metadata(&token).await.unwrap();
    let supply = token.total_supply().await.unwrap();
    let owner = token.owner().await.unwrap();

    println!("Token: {} ({})", metadata.name, metadata.symbol);
    println!("Decimals: {}", metadata.decimals);
    println!("Total supply: {}", amount::format_amount(supply, metadata.decimals));
    println!("Owner: {owner}");

    assert_eq!(token.chain_id().await.unwrap(), config.expected_chain_id());
}

#[tokio::test]
#[ignore = "requires a deployed token and network access"]
async fn test_read_only_dashboard() {
    let config = load_live_config();
    let provider = client::create_provider(&config.rpc_url)
        .await
        .expect("Failed to create provider");
    let reader = TokenContract::new(config.contract_address, provider);
    let signers = WalletSigners::<LocalWallet>::new(None, config.contract_address);
    let dashboard = Dashboard::new(config.clone(), None::<LocalWallet>, reader, signers);

    assert!(dashboard.sync().await);

    let state = dashboard.snapshot();
    println!("{}", render(&state, &config.chain));
    assert!(state.view().is_some());
}
