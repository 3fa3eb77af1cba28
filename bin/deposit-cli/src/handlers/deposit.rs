use std::sync::Arc;

use anyhow::{Context, Result};
use rollup_deposit_bridge_client::bridge::OpBridgeClient;
use rollup_deposit_orchestrator::{orchestrator::DepositOrchestrator, report::Reporter};
use rollup_deposit_primitives::{
    types::{DepositRequest, LedgerEndpoint},
    units::whole_units_to_wei,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{connect, parse_private_key, parse_whole_units};
use crate::{
    cli::DepositArgs,
    config::{parse_toml, Config},
    registry::load_registry,
};

pub(crate) async fn handle_deposit(args: DepositArgs) -> Result<()> {
    let units = parse_whole_units(&args.amount)?;
    let signer = parse_private_key(&args.private_key)?;
    let config = match &args.config {
        Some(path) => parse_toml::<Config>(path)?,
        None => Config::default(),
    };
    let registry = load_registry(&args.addresses_dir)?;

    let account = signer.address();
    let source = connect(
        LedgerEndpoint::new(args.l1_url, args.l1_chain_id),
        signer.clone(),
        "L1",
    )
    .await?;
    let destination = connect(
        LedgerEndpoint::new(args.l2_url, args.l2_chain_id),
        signer,
        "L2",
    )
    .await?;

    let client = OpBridgeClient::new(source, destination, registry, config.bridge);
    let (checkpoints_tx, mut checkpoints_rx) = mpsc::unbounded_channel();
    let orchestrator = DepositOrchestrator::new(Arc::new(client), config.policy)
        .with_checkpoint_sender(checkpoints_tx);

    let printer = tokio::spawn(async move {
        while let Some(checkpoint) = checkpoints_rx.recv().await {
            println!("{}", Reporter::checkpoint(&checkpoint));
        }
    });

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling deposit");
                cancel.cancel();
            }
        })
    };

    info!(action = "depositing", %units, %account);
    let request = DepositRequest::to_self(whole_units_to_wei(units), account);
    let report = orchestrator.run(request, cancel).await;
    interrupt.abort();

    // Dropping the orchestrator closes the checkpoint stream so the printer drains and exits.
    drop(orchestrator);
    printer.await.context("checkpoint printer")?;

    info!(event = "deposit finished", polls = %report.polls, elapsed = %Reporter::seconds(report.elapsed));
    Ok(report.outcome?)
}
