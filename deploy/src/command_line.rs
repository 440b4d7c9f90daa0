use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use ethers::types::H160;

use crate::{
    artifacts::Artifacts,
    config::{ExplorerConfig, ProjectConfig},
    deploy::{run_deploy, DeployOptions},
    verify::verify_contract,
};

/// Deploys the SmartPay contract and verifies it on the block explorer.
#[derive(Debug, Parser)]
#[clap(name = "smartpay-deploy", version)]
pub struct CommandLine {
    /// Network to use, defaults to base-goerli
    #[clap(short, long, env = "DEPLOY_NETWORK")]
    network: Option<String>,

    /// Hardhat build output directory
    #[clap(long, default_value = "artifacts")]
    artifacts: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy a compiled contract and print its address
    Deploy {
        #[clap(short, long, default_value = "SmartPay")]
        contract: String,

        #[clap(long, default_value_t = 1)]
        confirmations: usize,

        /// Give up waiting for confirmation after this many seconds
        #[clap(long)]
        timeout: Option<u64>,

        /// Verify the source on the explorer once deployed
        #[clap(long)]
        verify: bool,
    },

    /// Verify an already deployed contract on the explorer
    Verify {
        #[clap(short, long)]
        address: H160,

        #[clap(short, long, default_value = "SmartPay")]
        contract: String,
    },

    /// Print the resolved configuration, secrets redacted
    Config,
}

const VERIFY_POLL_INTERVAL: Duration = Duration::from_secs(3);

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let config = ProjectConfig::from_env();
        let network = self
            .network
            .unwrap_or_else(|| config.default_network.clone());
        let artifacts = Artifacts::new(self.artifacts);

        match self.command {
            Command::Deploy {
                contract,
                confirmations,
                timeout,
                verify,
            } => {
                let explorer = if verify {
                    Some(verification_target(&config, &network, &artifacts, &contract)?)
                } else {
                    None
                };

                let options = DeployOptions {
                    confirmations,
                    timeout: timeout.map(Duration::from_secs),
                    ..DeployOptions::default()
                };
                let deployment = run_deploy(&config, &network, &artifacts, &contract, options).await?;
                println!("{}", deployment);

                if let Some(explorer) = explorer {
                    let url = verify_contract(
                        explorer,
                        &artifacts,
                        &contract,
                        deployment.address,
                        VERIFY_POLL_INTERVAL,
                    )
                    .await?;
                    println!("verified at {}", url);
                }
            }
            Command::Verify { address, contract } => {
                let explorer = config.explorer(&network)?;
                let url = verify_contract(
                    explorer,
                    &artifacts,
                    &contract,
                    address,
                    VERIFY_POLL_INTERVAL,
                )
                .await?;
                println!("verified at {}", url);
            }
            Command::Config => {
                config.network(&network)?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
        Ok(())
    }
}

/// Everything `deploy --verify` needs after the deployment, checked up front
/// so a deployed contract is never left unverifiable.
fn verification_target<'a>(
    config: &'a ProjectConfig,
    network: &str,
    artifacts: &Artifacts,
    contract: &str,
) -> Result<&'a ExplorerConfig> {
    config.network(network)?.signing_key()?;
    let explorer = config.explorer(network)?;
    explorer.api_key()?;
    artifacts.build_info(&artifacts.find(contract)?)?;
    Ok(explorer)
}
