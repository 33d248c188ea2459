//! Execution capability injected into the resolver and the orchestrators.
//!
//! Reads need only a [`ChainReader`]; anything that submits a transaction takes a
//! [`ChainSigner`]. Nothing in this crate reaches for ambient wallet or provider state.

pub mod rpc;

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::errors::ExecutionError;

pub use rpc::{EthersReader, EthersSigner};

/// A state-changing contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub calldata: Bytes,
    /// Explicit gas ceiling. `None` leaves the limit to the provider's estimate.
    pub gas_limit: Option<u64>,
}

/// Final outcome of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed {
        block_number: Option<u64>,
    },
    Reverted {
        block_number: Option<u64>,
        /// Decoded revert reason, when the chain provides one.
        reason: Option<String>,
    },
}

/// Read-only chain access.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ExecutionError>;

    /// `eth_call` against the latest block.
    async fn read(&self, to: Address, calldata: Bytes) -> Result<Bytes, ExecutionError>;
}

/// Transaction-submitting chain access, bound to one account.
#[async_trait]
pub trait ChainSigner: ChainReader {
    /// The account every submitted transaction is sent from.
    fn address(&self) -> Address;

    /// Submit and return as soon as the node accepted the transaction.
    async fn submit(&self, call: ContractCall) -> Result<B256, ExecutionError>;

    /// Wait until `hash` is mined. Unbounded; callers apply their own timeout.
    async fn wait(&self, hash: B256) -> Result<Confirmation, ExecutionError>;
}
