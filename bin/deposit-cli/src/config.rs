//! TOML configuration of the deposit command.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rollup_deposit_bridge_client::config::BridgeClientConfig;
use rollup_deposit_orchestrator::policy::DepositPolicy;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, trace};

/// Settings of the bridge client at the top level, the orchestrator policy under `[policy]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    #[serde(flatten)]
    pub(crate) bridge: BridgeClientConfig,

    pub(crate) policy: DepositPolicy,
}

pub(crate) fn parse_toml<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read TOML file {}", path.display()))?;
    trace!(?raw, "read file");

    let parsed = toml::from_str::<T>(&raw)
        .with_context(|| format!("failed to parse TOML file {}", path.display()))?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}
