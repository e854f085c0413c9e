//! Configuration types for the token dashboard.
//!
//! This crate provides:
//! - The expected chain's parameters (Sepolia by default)
//! - The chain definition handed to wallets that do not know the chain
//! - Block explorer links for submitted transactions

pub mod network;

pub use network::{ChainParams, NativeCurrency, SEPOLIA_CHAIN_ID};
