//! Defaults mirrored from the deployed retirement flow.

/// Celo mainnet, where the retirement helper is deployed.
pub const CELO_CHAIN_ID: u64 = 42220;

// Gas ceilings are explicit upper bounds, never estimates: estimation is unreliable on the
// networks the helper runs on and an under-provisioned retirement fails silently.
pub const DEFAULT_RETIREMENT_GAS_LIMIT: u64 = 50_000_000;
pub const DEFAULT_SWAP_GAS_LIMIT: u64 = 5_000_000;

pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_CONFIRMATIONS: usize = 1;
