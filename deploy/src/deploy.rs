use std::{fmt, sync::Arc, time::Duration};

use ethers::{
    contract::{ContractError, ContractFactory},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider, ProviderError},
    signers::{LocalWallet, Signer},
    types::{H160, H256, U256, U64},
};
use thiserror::Error;

use crate::{
    artifacts::{Artifact, ArtifactError, Artifacts},
    config::{ConfigError, NetworkConfig, ProjectConfig},
    utils,
};

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("invalid rpc url {0}")]
    InvalidRpcUrl(String),

    #[error("rpc request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("deployment failed: {0}")]
    Contract(#[source] ContractError<Client>),

    #[error("deployment transaction {transaction_hash:?} reverted")]
    Reverted { transaction_hash: H256 },

    #[error("deployment transaction was dropped or produced no contract")]
    NotDeployed,

    #[error("deployment not confirmed after {after:?}")]
    ConfirmationTimeout { after: Duration },
}

impl From<ContractError<Client>> for DeployError {
    fn from(err: ContractError<Client>) -> Self {
        match err {
            ContractError::ContractNotDeployed => DeployError::NotDeployed,
            err => DeployError::Contract(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub confirmations: usize,
    /// `None` waits for confirmation forever.
    pub timeout: Option<Duration>,
    /// How often pending transactions are polled, provider default if unset.
    pub poll_interval: Option<Duration>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: None,
            poll_interval: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract_name: String,
    pub address: H160,
    pub transaction_hash: H256,
    pub block_number: Option<U64>,
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} deployed to {}",
            self.contract_name,
            utils::checksum(&self.address)
        )
    }
}

pub struct Deploy {
    client: Arc<Client>,
    gas_price: U256,
    options: DeployOptions,
}

impl Deploy {
    pub async fn new(network: &NetworkConfig, options: DeployOptions) -> Result<Self, DeployError> {
        let wallet = utils::parse_wallet(network.signing_key()?)?;
        let mut provider = Provider::<Http>::try_from(network.rpc_url.as_str())
            .map_err(|err| DeployError::InvalidRpcUrl(format!("{}: {err}", network.rpc_url)))?;
        if let Some(interval) = options.poll_interval {
            provider = provider.interval(interval);
        }

        let chain_id = provider.get_chainid().await?.as_u64();
        log::info!(
            "connected to {} (chain id {}) as {:?}",
            network.name,
            chain_id,
            wallet.address()
        );

        let client = Arc::new(SignerMiddleware::new(
            provider,
            wallet.with_chain_id(chain_id),
        ));

        Ok(Self {
            client,
            gas_price: U256::from(network.gas_price_wei),
            options,
        })
    }

    pub async fn deploy(&self, artifact: &Artifact) -> Result<Deployment, DeployError> {
        let factory = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        );

        // a fixed gas price means a legacy transaction
        let mut deployer = factory
            .deploy(())?
            .legacy()
            .confirmations(self.options.confirmations);
        deployer.tx.set_gas_price(self.gas_price);

        log::info!(
            "deploying {} with gas price {} wei, waiting for {} confirmation(s)",
            artifact.contract_name,
            self.gas_price,
            self.options.confirmations
        );

        let pending = deployer.send_with_receipt();
        let (contract, receipt) = match self.options.timeout {
            Some(after) => tokio::time::timeout(after, pending)
                .await
                .map_err(|_| DeployError::ConfirmationTimeout { after })??,
            None => pending.await?,
        };
        log::info!(
            "transaction hash:{:?} block:{:?}",
            receipt.transaction_hash,
            receipt.block_number
        );

        if receipt.status == Some(U64::zero()) {
            return Err(DeployError::Reverted {
                transaction_hash: receipt.transaction_hash,
            });
        }

        Ok(Deployment {
            contract_name: artifact.contract_name.clone(),
            address: contract.address(),
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}

/// Validates the signing key, resolves the artifact, then deploys it.
///
/// Nothing touches the network until the configuration and the artifact
/// have both been checked.
pub async fn run_deploy(
    config: &ProjectConfig,
    network: &str,
    artifacts: &Artifacts,
    contract: &str,
    options: DeployOptions,
) -> Result<Deployment, DeployError> {
    let network = config.network(network)?;
    network.signing_key()?;

    let artifact = artifacts.find(contract)?;

    let deploy = Deploy::new(network, options).await?;
    deploy.deploy(&artifact).await
}
