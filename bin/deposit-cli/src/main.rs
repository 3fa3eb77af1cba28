//! CLI that deposits the native asset into an OP-stack rollup and follows the deposit until it
//! is relayed.

mod cli;
mod config;
mod constants;
mod handlers;
mod registry;

use std::process::ExitCode;

use clap::Parser;
use rollup_deposit_common::logging::{self, LoggerConfig};
use rollup_deposit_orchestrator::{errors::DepositError, report::Reporter};

use crate::handlers::{deposit, send};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(LoggerConfig::from_env("deposit-cli"));

    let cli = cli::Cli::parse();
    let result = match cli.command {
        cli::Commands::Deposit(args) => deposit::handle_deposit(args).await,
        cli::Commands::Send(args) => send::handle_send(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<DepositError>() {
                Some(deposit_error) => eprintln!("{}", Reporter::failure(deposit_error)),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
