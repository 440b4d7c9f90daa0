use ethers::{
    signers::LocalWallet,
    types::H160,
    utils::{hex, to_checksum},
};

use crate::deploy::DeployError;

pub fn strip_0x(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

pub fn parse_wallet(sk: &str) -> Result<LocalWallet, DeployError> {
    // the key itself must never end up in an error message
    let bytes = hex::decode(strip_0x(sk.trim()))
        .map_err(|err| DeployError::InvalidSigningKey(err.to_string()))?;
    if bytes.len() != 32 {
        return Err(DeployError::InvalidSigningKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    LocalWallet::from_bytes(&bytes).map_err(|err| DeployError::InvalidSigningKey(err.to_string()))
}

pub fn checksum(address: &H160) -> String {
    to_checksum(address, None)
}
