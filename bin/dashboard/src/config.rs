use alloy_primitives::Address;
use config::{ChainParams, SEPOLIA_CHAIN_ID};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The one setting the dashboard cannot run without
    #[error("No token contract address configured. Set TOKEN_ADDRESS or `contract_address` in the config file to the deployed token.")]
    MissingContractAddress,

    /// Chain other than Sepolia with no endpoint to read from or offer to wallets
    #[error("No RPC endpoint configured for chain {chain_id}. Set RPC_URL, `rpc_url` or `[chain] rpc_urls` in the config file.")]
    MissingRpcUrl { chain_id: u64 },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Dashboard configuration as written in the file. Every field is optional;
/// command line and environment values are merged on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Deployed token contract
    pub contract_address: Option<Address>,

    /// Chain the contract lives on; Sepolia when unset
    pub chain_id: Option<u64>,

    /// Read RPC endpoint url; the chain's first RPC url when unset
    pub rpc_url: Option<String>,

    /// JSON-RPC wallet endpoint url
    pub wallet_url: Option<String>,

    /// Full chain definition, offered to wallets that do not know the chain
    pub chain: Option<ChainParams>,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub contract_address: Address,
    /// Expected chain, with everything needed to add it to a wallet
    pub chain: ChainParams,
    pub rpc_url: String,
    pub wallet_url: Option<String>,
}

impl DashboardConfig {
    pub const fn expected_chain_id(&self) -> u64 {
        self.chain.chain_id
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the expected chain and check required settings.
    pub fn validate(self) -> Result<DashboardConfig, ConfigError> {
        let contract_address = self
            .contract_address
            .ok_or(ConfigError::MissingContractAddress)?;

        let chain_id = self
            .chain_id
            .or_else(|| self.chain.as_ref().map(|chain| chain.chain_id))
            .unwrap_or(SEPOLIA_CHAIN_ID);

        let mut chain = match self.chain {
            Some(chain) if chain.chain_id == chain_id => chain,
            _ if chain_id == SEPOLIA_CHAIN_ID => ChainParams::sepolia(),
            _ => ChainParams::custom(chain_id, self.rpc_url.clone().unwrap_or_default()),
        };
        chain.rpc_urls.retain(|url| !url.is_empty());

        let rpc_url = match self.rpc_url {
            Some(url) => url,
            None => chain.rpc_url().unwrap_or_default().to_string(),
        };
        if rpc_url.is_empty() {
            return Err(ConfigError::MissingRpcUrl { chain_id });
        }
        if chain.rpc_urls.is_empty() {
            chain.rpc_urls.push(rpc_url.clone());
        }

        Ok(DashboardConfig {
            contract_address,
            chain,
            rpc_url,
            wallet_url: self.wallet_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[test]
    fn test_missing_contract_address() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::MissingContractAddress)
        ));
    }

    #[test]
    fn test_defaults_to_sepolia() {
        let config = Config {
            contract_address: Some(TOKEN.parse().unwrap()),
            ..Default::default()
        };

        let resolved = config.validate().unwrap();
        assert_eq!(resolved.expected_chain_id(), 11155111);
        assert_eq!(resolved.chain, ChainParams::sepolia());
        assert_eq!(Some(resolved.rpc_url.as_str()), ChainParams::sepolia().rpc_url());
        assert_eq!(resolved.wallet_url, None);
    }

    #[test]
    fn test_custom_chain_uses_rpc_url() {
        let config: Config = toml::from_str(&format!(
            r#"
            contract_address = "{TOKEN}"
            chain_id = 31337
            rpc_url = "http://localhost:8545"
            "#
        ))
        .unwrap();

        let resolved = config.validate().unwrap();
        assert_eq!(resolved.expected_chain_id(), 31337);
        assert_eq!(resolved.rpc_url, "http://localhost:8545");
        assert_eq!(resolved.chain.rpc_url(), Some("http://localhost:8545"));
    }

    #[test]
    fn test_custom_chain_without_rpc_url() {
        let config = Config {
            contract_address: Some(TOKEN.parse().unwrap()),
            chain_id: Some(1),
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRpcUrl { chain_id: 1 }));
        assert!(err.to_string().contains("RPC_URL"));
    }

    #[test]
    fn test_chain_table_without_rpc_urls() {
        let config: Config = toml::from_str(&format!(
            r#"
            contract_address = "{TOKEN}"

            [chain]
            chain_id = 17000
            chain_name = "Holesky"
            rpc_urls = [""]

            [chain.native_currency]
            name = "Holesky Ether"
            symbol = "ETH"
            decimals = 18
            "#
        ))
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRpcUrl { chain_id: 17000 })
        ));
    }

    #[test]
    fn test_chain_table() {
        let config: Config = toml::from_str(&format!(
            r#"
            contract_address = "{TOKEN}"
            wallet_url = "http://localhost:8550"

            [chain]
            chain_id = 17000
            chain_name = "Holesky"
            rpc_urls = ["https://holesky.example"]
            block_explorer_urls = ["https://holesky.etherscan.io"]

            [chain.native_currency]
            name = "Holesky Ether"
            symbol = "ETH"
            decimals = 18
            "#
        ))
        .unwrap();

        let resolved = config.validate().unwrap();
        assert_eq!(resolved.expected_chain_id(), 17000);
        assert_eq!(resolved.chain.chain_name, "Holesky");
        assert_eq!(resolved.rpc_url, "https://holesky.example");
        assert_eq!(resolved.wallet_url.as_deref(), Some("http://localhost:8550"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = Config::from_file("/nonexistent/dashboard.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
