//! Serde-backed configuration: the per-network address map and orchestration limits.
//!
//! Addresses stay strings here; the resolver's registry validates them so that a malformed
//! address surfaces as a `ConfigurationError` naming the network and field.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::contracts::constants::{
    CELO_CHAIN_ID, DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRMATION_TIMEOUT_SECS,
    DEFAULT_RETIREMENT_GAS_LIMIT, DEFAULT_SWAP_GAS_LIMIT,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworksConfig {
    pub networks: BTreeMap<String, NetworkEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub chain_id: u64,
    pub pool: String,
    pub helper: String,
    /// Defaults to `pool`.
    #[serde(default)]
    pub allowance_token: Option<String>,
    #[serde(default)]
    pub swapper: Option<String>,
    #[serde(default)]
    pub projects: BTreeMap<String, String>,
    #[serde(default)]
    pub rpc_url: Option<String>,
}

impl NetworksConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Deployment the retirement helper ships with.
    pub fn builtin() -> Self {
        let celo = NetworkEntry {
            chain_id: CELO_CHAIN_ID,
            pool: "0x02De4766C272abc10Bc88c220D214A26960a7e92".to_string(),
            helper: "0xBd07A6D47d83b4fc9C8996B0ab0bEBEfda429b2C".to_string(),
            allowance_token: None,
            swapper: None,
            projects: BTreeMap::from([(
                "TCO2-VCS-1529-2012".to_string(),
                "0x96E58418524c01edc7c72dAdDe5FD5C1c82ea89F".to_string(),
            )]),
            rpc_url: Some("https://rpc.ankr.com/celo".to_string()),
        };
        Self {
            networks: BTreeMap::from([("celo".to_string(), celo)]),
        }
    }
}

/// Limits applied to every orchestration run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub confirmation_timeout_secs: u64,
    pub retirement_gas_limit: u64,
    pub swap_gas_limit: u64,
    /// Blocks to wait for after inclusion before a receipt counts as confirmed.
    pub confirmations: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            retirement_gas_limit: DEFAULT_RETIREMENT_GAS_LIMIT,
            swap_gas_limit: DEFAULT_SWAP_GAS_LIMIT,
            confirmations: DEFAULT_CONFIRMATIONS,
        }
    }
}

impl OrchestratorConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_entry_optional_fields_default() {
        let config = NetworksConfig::from_json(
            r#"{
                "networks": {
                    "alfajores": {
                        "chain_id": 44787,
                        "pool": "0x1111111111111111111111111111111111111111",
                        "helper": "0x2222222222222222222222222222222222222222"
                    }
                }
            }"#,
        )
        .unwrap();
        let entry = &config.networks["alfajores"];
        assert_eq!(entry.chain_id, 44787);
        assert!(entry.allowance_token.is_none());
        assert!(entry.projects.is_empty());
    }

    #[test]
    fn test_orchestrator_config_partial_override() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{ "confirmation_timeout_secs": 30 }"#).unwrap();
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(30));
        assert_eq!(config.retirement_gas_limit, DEFAULT_RETIREMENT_GAS_LIMIT);
    }
}
