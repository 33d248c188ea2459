use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Invalid or unknown network, address or amount input.
///
/// Raised before any transaction is submitted; never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),
    #[error("network `{network}`: invalid {field} address `{value}`")]
    InvalidAddress {
        network: String,
        field: String,
        value: String,
    },
    #[error("network `{network}`: {field} must not be the zero address")]
    ZeroAddress { network: String, field: String },
    #[error(
        "network `{network}`: allowance token {allowance_token} differs from pool {pool}; \
         the helper draws the pool token"
    )]
    AllowanceTokenMismatch {
        network: String,
        pool: Address,
        allowance_token: Address,
    },
    #[error("address {address} is configured on chain {expected} and chain {found}")]
    CrossChainAddress {
        address: Address,
        expected: u64,
        found: u64,
    },
    #[error("chain id {chain_id} is configured for both `{first}` and `{second}`")]
    DuplicateChainId {
        chain_id: u64,
        first: String,
        second: String,
    },
    #[error("connected chain id {actual} does not match network `{network}` (chain {expected})")]
    ChainMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
    #[error("request pool {request} does not match network pool {network}")]
    PoolMismatch { request: Address, network: Address },
    #[error("network `{0}` has no swap helper configured")]
    MissingSwapper(String),
    #[error("unknown project `{0}`")]
    UnknownProject(String),
    #[error("retirement request has no projects")]
    EmptyRequest,
    #[error("{tokens} project tokens but {amounts} amounts")]
    LengthMismatch { tokens: usize, amounts: usize },
    #[error("amount for project {index} must be positive")]
    NonPositiveAmount { index: usize },
    #[error("invalid amount `{value}`: {reason}")]
    InvalidAmount { value: String, reason: String },
    #[error("total amount overflows uint256 (partial sum {partial})")]
    AmountOverflow { partial: U256 },
    #[error("could not read token decimals: {0}")]
    Decimals(String),
}
