use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Snapshot of an on-chain ERC-20 allowance.
///
/// Only valid for the moment it was read: allowances are mutable by other parties and are
/// re-queried on every orchestration run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    pub owner: Address,
    pub spender: Address,
    pub token: Address,
    pub amount: U256,
}

impl Allowance {
    pub fn covers(&self, required: U256) -> bool {
        self.amount >= required
    }

    /// Amount still missing to reach `required`.
    pub fn shortfall(&self, required: U256) -> U256 {
        required.saturating_sub(self.amount)
    }
}
