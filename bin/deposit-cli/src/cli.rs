use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{crate_version, Parser, Subcommand};

use crate::constants::{
    DEFAULT_ADDRESSES_DIR, DEFAULT_DEPOSIT_UNITS, DEFAULT_L1_CHAIN_ID, DEFAULT_L1_URL,
    DEFAULT_L2_CHAIN_ID, DEFAULT_L2_URL,
};

#[derive(Parser, Debug)]
#[command(
    name = "deposit-cli",
    about = "Deposit the native asset into an OP-stack rollup and follow it until it is relayed",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    Deposit(DepositArgs),

    Send(SendArgs),
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Deposit to the same account on L2 and wait until the message is relayed")]
pub(crate) struct DepositArgs {
    #[arg(env = "DEPOSIT_PRIVATE_KEY", help = "hex private key of the depositing account")]
    pub(crate) private_key: String,

    // Kept as text so a non-numeric amount is reported as a configuration error.
    #[arg(
        default_value_t = DEFAULT_DEPOSIT_UNITS.to_string(),
        help = "whole units of the native asset to deposit"
    )]
    pub(crate) amount: String,

    #[arg(default_value = DEFAULT_L1_URL, help = "rpc url of the L1 node")]
    pub(crate) l1_url: String,

    #[arg(default_value = DEFAULT_L2_URL, help = "rpc url of the L2 node")]
    pub(crate) l2_url: String,

    #[arg(
        long,
        default_value = DEFAULT_ADDRESSES_DIR,
        help = "directory holding the <Contract>_address files written at deployment"
    )]
    pub(crate) addresses_dir: PathBuf,

    #[arg(long, short = 'c', help = "optional TOML file with client and policy settings")]
    pub(crate) config: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_L1_CHAIN_ID, help = "chain id of the L1 node")]
    pub(crate) l1_chain_id: u64,

    #[arg(long, default_value_t = DEFAULT_L2_CHAIN_ID, help = "chain id of the L2 node")]
    pub(crate) l2_chain_id: u64,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Send a plain native-asset transfer on one ledger")]
pub(crate) struct SendArgs {
    #[arg(help = "rpc url of the node")]
    pub(crate) node_url: String,

    #[arg(help = "chain id the node must report")]
    pub(crate) chain_id: u64,

    #[arg(help = "hex private key of the sender")]
    pub(crate) private_key: String,

    #[arg(help = "recipient address")]
    pub(crate) to: Address,

    #[arg(help = "decimal amount of whole units to send, e.g. 0.5")]
    pub(crate) amount: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deposit_defaults() {
        let cli = Cli::try_parse_from(["deposit-cli", "deposit", KEY]).unwrap();
        let Commands::Deposit(args) = cli.command else {
            panic!("expected deposit");
        };

        assert_eq!(args.private_key, KEY);
        assert_eq!(args.amount, "1");
        assert_eq!(args.l1_url, DEFAULT_L1_URL);
        assert_eq!(args.l2_url, DEFAULT_L2_URL);
        assert_eq!(args.addresses_dir, PathBuf::from(DEFAULT_ADDRESSES_DIR));
        assert_eq!(args.l1_chain_id, 2023);
        assert_eq!(args.l2_chain_id, 2320);
        assert!(args.config.is_none());
    }

    #[test]
    fn deposit_positionals_override_defaults() {
        let cli = Cli::try_parse_from([
            "deposit-cli",
            "deposit",
            KEY,
            "3",
            "http://l1:8545",
            "http://l2:9545",
            "--addresses-dir",
            "/tmp/addresses",
            "--l2-chain-id",
            "901",
        ])
        .unwrap();
        let Commands::Deposit(args) = cli.command else {
            panic!("expected deposit");
        };

        assert_eq!(args.amount, "3");
        assert_eq!(args.l1_url, "http://l1:8545");
        assert_eq!(args.l2_url, "http://l2:9545");
        assert_eq!(args.addresses_dir, PathBuf::from("/tmp/addresses"));
        assert_eq!(args.l2_chain_id, 901);
    }

    #[test]
    fn send_requires_every_positional() {
        let cli = Cli::try_parse_from([
            "deposit-cli",
            "send",
            "http://localhost:8545",
            "2023",
            KEY,
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "0.5",
        ])
        .unwrap();
        let Commands::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.chain_id, 2023);
        assert_eq!(args.amount, "0.5");

        assert!(Cli::try_parse_from(["deposit-cli", "send", "http://localhost:8545"]).is_err());
        assert!(Cli::try_parse_from([
            "deposit-cli",
            "send",
            "http://localhost:8545",
            "2023",
            KEY,
            "not-an-address",
            "1",
        ])
        .is_err());
    }
}
