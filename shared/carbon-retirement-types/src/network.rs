use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Validated contract addresses for one network.
///
/// All addresses belong to `chain_id`; `NetworkProfile`s are only handed out by the resolver's
/// registry, which rejects mismatched combinations at load time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Registry key (eg, `celo`).
    pub name: String,
    pub chain_id: u64,
    /// Pool token (eg, NCT) redeemed for project credit tokens.
    pub pool: Address,
    /// Retirement helper contract; the spender of the pool-token allowance.
    pub helper: Address,
    /// Token the allowance is granted on. Always equal to `pool`.
    pub allowance_token: Address,
    /// Optional swap helper for acquiring pool tokens.
    pub swapper: Option<Address>,
    /// Known project credit tokens (eg, TCO2) keyed by label.
    pub projects: BTreeMap<String, Address>,
    /// Default RPC endpoint, if configured.
    pub rpc_url: Option<String>,
}

impl NetworkProfile {
    /// Every contract address of this profile, labelled.
    pub fn contracts(&self) -> Vec<(&'static str, Address)> {
        let mut out = vec![
            ("pool", self.pool),
            ("helper", self.helper),
            ("allowance_token", self.allowance_token),
        ];
        if let Some(swapper) = self.swapper {
            out.push(("swapper", swapper));
        }
        out.extend(self.projects.values().map(|token| ("project", *token)));
        out
    }
}
