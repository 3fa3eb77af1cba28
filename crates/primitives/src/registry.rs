//! The registry of source-ledger contract addresses used by the deposit flow.
//!
//! Deployments publish one address per contract. Some of them are left as the zero address
//! because the contract does not exist in that deployment (e.g. the pre-bedrock
//! `StateCommitmentChain`). The registry stores those as [`None`] so that callers never compare
//! against a magic constant themselves.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The logical name of a contract known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractName {
    /// The legacy `Lib_AddressManager`.
    AddressManager,

    /// The proxy of the `L1CrossDomainMessenger`.
    L1CrossDomainMessenger,

    /// The proxy of the `L1StandardBridge`, the entrypoint of native-asset deposits.
    L1StandardBridge,

    /// The `OptimismPortal`, which emits the `TransactionDeposited` event for every deposit.
    OptimismPortal,

    /// The proxy of the `L2OutputOracle`.
    L2OutputOracle,

    /// Pre-bedrock contract, not deployed on bedrock chains.
    StateCommitmentChain,

    /// Pre-bedrock contract, not deployed on bedrock chains.
    CanonicalTransactionChain,

    /// Pre-bedrock contract, not deployed on bedrock chains.
    BondManager,
}

impl ContractName {
    /// Every known contract name.
    pub const ALL: [ContractName; 8] = [
        ContractName::AddressManager,
        ContractName::L1CrossDomainMessenger,
        ContractName::L1StandardBridge,
        ContractName::OptimismPortal,
        ContractName::L2OutputOracle,
        ContractName::StateCommitmentChain,
        ContractName::CanonicalTransactionChain,
        ContractName::BondManager,
    ];

    /// The canonical name of the contract.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContractName::AddressManager => "AddressManager",
            ContractName::L1CrossDomainMessenger => "L1CrossDomainMessenger",
            ContractName::L1StandardBridge => "L1StandardBridge",
            ContractName::OptimismPortal => "OptimismPortal",
            ContractName::L2OutputOracle => "L2OutputOracle",
            ContractName::StateCommitmentChain => "StateCommitmentChain",
            ContractName::CanonicalTransactionChain => "CanonicalTransactionChain",
            ContractName::BondManager => "BondManager",
        }
    }

    /// The name of the file the deployment scripts write this contract's address to, if the
    /// deployment publishes one.
    pub const fn address_file(&self) -> Option<&'static str> {
        match self {
            ContractName::AddressManager => Some("AddressManager_address"),
            ContractName::L1CrossDomainMessenger => Some("L1CrossDomainMessengerProxy_address"),
            ContractName::L1StandardBridge => Some("L1StandardBridgeProxy_address"),
            ContractName::OptimismPortal => Some("OptimismPortal_address"),
            ContractName::L2OutputOracle => Some("L2OutputOracleProxy_address"),
            ContractName::StateCommitmentChain
            | ContractName::CanonicalTransactionChain
            | ContractName::BondManager => None,
        }
    }
}

impl Display for ContractName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown contract name: {s}"))
    }
}

/// Error returned when a registry entry is dereferenced but holds a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("contract {0} is not deployed (placeholder address)")]
pub struct MissingContract(pub ContractName);

/// Maps [`ContractName`]s to their source-ledger addresses.
///
/// Every known name has an entry; entries that are not deployed hold [`None`]. The registry is
/// populated once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRegistry(BTreeMap<ContractName, Option<Address>>);

impl Default for ContractRegistry {
    fn default() -> Self {
        Self(ContractName::ALL.into_iter().map(|name| (name, None)).collect())
    }
}

impl ContractRegistry {
    /// Creates a registry in which every contract is a placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address of `name` and returns the updated registry.
    ///
    /// Useful for a builder pattern with dotchaining.
    pub fn with_address(mut self, name: ContractName, address: Address) -> Self {
        self.insert(name, address);
        self
    }

    /// Sets the address of `name`. A zero address records a placeholder.
    pub fn insert(&mut self, name: ContractName, address: Address) {
        let entry = (!address.is_zero()).then_some(address);
        self.0.insert(name, entry);
    }

    /// Returns the address of `name`, or [`None`] if it is a placeholder.
    pub fn get(&self, name: ContractName) -> Option<Address> {
        self.0.get(&name).copied().flatten()
    }

    /// Returns the address of `name` for use in a live call.
    pub fn require(&self, name: ContractName) -> Result<Address, MissingContract> {
        self.get(name).ok_or(MissingContract(name))
    }

    /// Iterates over all entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (ContractName, Option<Address>)> + '_ {
        self.0.iter().map(|(name, address)| (*name, *address))
    }
}
