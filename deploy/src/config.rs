use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub const SOLIDITY_VERSION: &str = "0.8.17";

pub const BASE_GOERLI: &str = "base-goerli";
pub const BASE_GOERLI_RPC_URL: &str = "https://goerli.base.org";
pub const BASE_GOERLI_GAS_PRICE: u64 = 1_000_000_000;
pub const BASE_GOERLI_CHAIN_ID: u64 = 84531;
pub const BASESCAN_GOERLI_API_URL: &str = "https://api-goerli.basescan.org/api";
pub const BASESCAN_GOERLI_BROWSER_URL: &str = "https://goerli.basescan.org";

pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
pub const EXPLORER_API_KEY_VAR: &str = "BASE_API_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("network {0:?} is not configured")]
    UnknownNetwork(String),

    #[error("no explorer is configured for network {0:?}")]
    NoExplorer(String),
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    #[serde(skip)]
    signing_key: Option<String>,
    pub gas_price_wei: u64,
}

impl NetworkConfig {
    pub fn new(
        name: impl Into<String>,
        rpc_url: impl Into<String>,
        signing_key: Option<String>,
        gas_price_wei: u64,
    ) -> Self {
        Self {
            name: name.into(),
            rpc_url: rpc_url.into(),
            signing_key: signing_key.filter(|key| !key.is_empty()),
            gas_price_wei,
        }
    }

    pub fn signing_key(&self) -> Result<&str, ConfigError> {
        self.signing_key
            .as_deref()
            .ok_or(ConfigError::MissingEnv(PRIVATE_KEY_VAR))
    }
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("name", &self.name)
            .field("rpc_url", &self.rpc_url)
            .field("signing_key", &redacted(&self.signing_key))
            .field("gas_price_wei", &self.gas_price_wei)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ExplorerConfig {
    pub network_name: String,
    #[serde(skip)]
    api_key: Option<String>,
    pub chain_id: u64,
    pub api_url: String,
    pub browser_url: String,
}

impl ExplorerConfig {
    pub fn new(
        network_name: impl Into<String>,
        api_key: Option<String>,
        chain_id: u64,
        api_url: impl Into<String>,
        browser_url: impl Into<String>,
    ) -> Self {
        Self {
            network_name: network_name.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
            chain_id,
            api_url: api_url.into(),
            browser_url: browser_url.into(),
        }
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingEnv(EXPLORER_API_KEY_VAR))
    }

    /// Page on the explorer showing the verified source of `address`.
    pub fn code_url(&self, address: &str) -> String {
        format!(
            "{}/address/{}#code",
            self.browser_url.trim_end_matches('/'),
            address
        )
    }
}

impl fmt::Debug for ExplorerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerConfig")
            .field("network_name", &self.network_name)
            .field("api_key", &redacted(&self.api_key))
            .field("chain_id", &self.chain_id)
            .field("api_url", &self.api_url)
            .field("browser_url", &self.browser_url)
            .finish()
    }
}

fn redacted(secret: &Option<String>) -> &'static str {
    match secret {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

/// Everything the deploy and verify commands need, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    pub solidity: String,
    pub default_network: String,
    pub networks: Vec<NetworkConfig>,
    pub explorers: Vec<ExplorerConfig>,
}

impl ProjectConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            solidity: SOLIDITY_VERSION.to_string(),
            default_network: BASE_GOERLI.to_string(),
            networks: vec![NetworkConfig::new(
                BASE_GOERLI,
                BASE_GOERLI_RPC_URL,
                lookup(PRIVATE_KEY_VAR),
                BASE_GOERLI_GAS_PRICE,
            )],
            explorers: vec![ExplorerConfig::new(
                BASE_GOERLI,
                lookup(EXPLORER_API_KEY_VAR),
                BASE_GOERLI_CHAIN_ID,
                BASESCAN_GOERLI_API_URL,
                BASESCAN_GOERLI_BROWSER_URL,
            )],
        }
    }

    pub fn network(&self, name: &str) -> Result<&NetworkConfig, ConfigError> {
        self.networks
            .iter()
            .find(|network| network.name == name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    pub fn explorer(&self, network_name: &str) -> Result<&ExplorerConfig, ConfigError> {
        self.explorers
            .iter()
            .find(|explorer| explorer.network_name == network_name)
            .ok_or_else(|| ConfigError::NoExplorer(network_name.to_string()))
    }
}
