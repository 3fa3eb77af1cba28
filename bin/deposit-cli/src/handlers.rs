pub(crate) mod deposit;
pub(crate) mod send;

use alloy::{primitives::B256, signers::local::PrivateKeySigner};
use rollup_deposit_bridge_client::chain::ChainClient;
use rollup_deposit_orchestrator::errors::DepositError;
use rollup_deposit_primitives::types::LedgerEndpoint;

/// Connects to the ledger named `ledger` in messages.
///
/// An unreachable node, a malformed URL or a chain id mismatch means the command was set up
/// wrong, so every failure here is a configuration error.
pub(crate) async fn connect(
    endpoint: LedgerEndpoint,
    signer: PrivateKeySigner,
    ledger: &str,
) -> Result<ChainClient, DepositError> {
    ChainClient::connect(endpoint, signer)
        .await
        .map_err(|e| DepositError::Configuration(format!("cannot connect to {ledger}: {e}")))
}

/// Parses a hex private key, with or without a `0x` prefix.
pub(crate) fn parse_private_key(hex_key: &str) -> Result<PrivateKeySigner, DepositError> {
    let trimmed = hex_key.trim();
    let bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| DepositError::Configuration(format!("private key is not hex: {e}")))?;
    let key = B256::try_from(bytes.as_slice()).map_err(|_| {
        DepositError::Configuration(format!(
            "private key must be 32 bytes, got {}",
            bytes.len()
        ))
    })?;

    PrivateKeySigner::from_bytes(&key)
        .map_err(|e| DepositError::Configuration(format!("invalid private key: {e}")))
}

/// Parses a whole number of units of the native asset.
pub(crate) fn parse_whole_units(amount: &str) -> Result<u64, DepositError> {
    amount.trim().parse::<u64>().map_err(|e| {
        DepositError::Configuration(format!("amount must be a whole number, got {amount:?}: {e}"))
    })
}
