use std::time::Duration;

use ethers::{
    etherscan::{
        errors::EtherscanError,
        verify::{CodeFormat, VerifyContract},
        Client,
    },
    types::H160,
};
use thiserror::Error;

use crate::{
    artifacts::{ArtifactError, Artifacts},
    config::{ConfigError, ExplorerConfig},
    utils,
};

const PENDING: &str = "Pending in queue";
const VERIFIED: &str = "Pass - Verified";

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("build info error: {0}")]
    BuildInfo(#[from] serde_json::Error),

    #[error("explorer request failed: {0}")]
    Explorer(#[from] EtherscanError),

    #[error("explorer rejected verification: {0}")]
    Rejected(String),
}

fn already_verified(result: &str) -> bool {
    result.to_lowercase().contains("already verified")
}

/// Submits the standard JSON input that produced `contract` and waits for
/// the explorer to accept it. Returns the page showing the verified code.
pub async fn verify_contract(
    explorer: &ExplorerConfig,
    artifacts: &Artifacts,
    contract: &str,
    address: H160,
    poll_interval: Duration,
) -> Result<String, VerifyError> {
    let api_key = explorer.api_key()?;
    let artifact = artifacts.find(contract)?;
    let build_info = artifacts.build_info(&artifact)?;

    let client = Client::builder()
        .with_api_key(api_key)
        .with_api_url(explorer.api_url.as_str())?
        .with_url(explorer.browser_url.as_str())?
        .build()?;

    let request = VerifyContract::new(
        address,
        artifact.fully_qualified_name(),
        serde_json::to_string(&build_info.input)?,
        format!("v{}", build_info.solc_long_version),
    )
    .code_format(CodeFormat::StandardJsonInput);

    let url = explorer.code_url(&utils::checksum(&address));

    log::info!(
        "submitting {} at {:?} to {}",
        artifact.fully_qualified_name(),
        address,
        explorer.api_url
    );
    let guid = match client.submit_contract_verification(&request).await {
        Ok(response) if response.status == "1" => response.result,
        Ok(response) if already_verified(&response.result) => {
            log::info!("{:?} is already verified", address);
            return Ok(url);
        }
        Ok(response) => return Err(VerifyError::Rejected(response.result)),
        Err(err) if already_verified(&err.to_string()) => {
            log::info!("{:?} is already verified", address);
            return Ok(url);
        }
        Err(err) => return Err(err.into()),
    };
    log::info!("verification guid:{}", guid);

    loop {
        tokio::time::sleep(poll_interval).await;
        let response = match client.check_contract_verification_status(&guid).await {
            Ok(response) => response,
            Err(err) if already_verified(&err.to_string()) => return Ok(url),
            Err(err) => return Err(err.into()),
        };
        match response.result.as_str() {
            PENDING => log::debug!("verification {} pending", guid),
            VERIFIED => return Ok(url),
            result if already_verified(result) => return Ok(url),
            result => return Err(VerifyError::Rejected(result.to_string())),
        }
    }
}
