//! Loads the contract registry from the address files written at deployment.

use std::{fs, path::Path};

use alloy::primitives::Address;
use rollup_deposit_orchestrator::errors::DepositError;
use rollup_deposit_primitives::registry::{ContractName, ContractRegistry};
use tracing::{debug, info};

/// Reads one address per published contract from `dir`.
///
/// Contracts without an address file stay placeholders. A zero address in a file is also a
/// placeholder; a missing or unreadable file is a configuration error.
pub(crate) fn load_registry(dir: &Path) -> Result<ContractRegistry, DepositError> {
    let mut registry = ContractRegistry::new();

    for name in ContractName::ALL {
        let Some(file) = name.address_file() else {
            continue;
        };
        let path = dir.join(file);

        let raw = fs::read_to_string(&path).map_err(|e| {
            DepositError::Configuration(format!(
                "cannot read the address of {name} from {}: {e}",
                path.display()
            ))
        })?;
        let address = raw.trim().parse::<Address>().map_err(|e| {
            DepositError::Configuration(format!(
                "invalid address of {name} in {}: {e}",
                path.display()
            ))
        })?;

        debug!(%name, %address, "loaded contract address");
        registry.insert(name, address);
    }

    let placeholders = registry
        .iter()
        .filter(|(_, address)| address.is_none())
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>();
    info!(event = "contract registry loaded", dir = %dir.display(), ?placeholders);

    Ok(registry)
}
