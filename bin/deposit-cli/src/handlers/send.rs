use alloy::primitives::utils::parse_ether;
use anyhow::Result;
use rollup_deposit_orchestrator::errors::DepositError;
use rollup_deposit_primitives::types::LedgerEndpoint;

use super::{connect, parse_private_key};
use crate::cli::SendArgs;

pub(crate) async fn handle_send(args: SendArgs) -> Result<()> {
    let signer = parse_private_key(&args.private_key)?;
    let amount = parse_ether(&args.amount).map_err(|e| {
        DepositError::Configuration(format!("invalid amount {:?}: {e}", args.amount))
    })?;

    let client = connect(
        LedgerEndpoint::new(args.node_url, args.chain_id),
        signer,
        "node",
    )
    .await?;

    let tx_hash = client.transfer_native(args.to, amount).await?;
    println!("{tx_hash}");

    Ok(())
}
