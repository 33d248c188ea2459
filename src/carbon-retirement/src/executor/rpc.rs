//! JSON-RPC execution capability backed by ethers.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, MiddlewareError, PendingTransaction, Provider},
    signers::LocalWallet,
    types::{
        transaction::eip2718::TypedTransaction, BlockId, BlockNumber, Bytes as RpcBytes,
        TransactionRequest, H160, H256, U64,
    },
};

use super::{ChainReader, ChainSigner, Confirmation, ContractCall};
use crate::errors::ExecutionError;

/// Read-only provider; sufficient for allowance, decimals and chain id queries.
#[derive(Clone, Debug)]
pub struct EthersReader {
    provider: Provider<Http>,
}

impl EthersReader {
    pub fn connect(rpc_url: &str) -> Result<Self, ExecutionError> {
        Ok(Self {
            provider: http_provider(rpc_url)?,
        })
    }
}

#[async_trait]
impl ChainReader for EthersReader {
    async fn chain_id(&self) -> Result<u64, ExecutionError> {
        let id = self.provider.get_chainid().await.map_err(transport)?;
        Ok(id.as_u64())
    }

    async fn read(&self, to: Address, calldata: Bytes) -> Result<Bytes, ExecutionError> {
        eth_call(&self.provider, to, calldata).await
    }
}

/// Local private-key signer on top of an HTTP provider.
#[derive(Debug)]
pub struct EthersSigner {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
    confirmations: usize,
}

impl EthersSigner {
    /// Connect and bind the wallet to the provider's chain id.
    pub async fn connect(
        rpc_url: &str,
        private_key: &str,
        confirmations: usize,
        poll_interval: Option<Duration>,
    ) -> Result<Self, ExecutionError> {
        let mut provider = http_provider(rpc_url)?;
        if let Some(interval) = poll_interval {
            provider = provider.interval(interval);
        }
        let key = private_key.trim();
        let wallet: LocalWallet = key
            .strip_prefix("0x")
            .unwrap_or(key)
            .parse()
            .map_err(|e: ethers::signers::WalletError| ExecutionError::Signer(e.to_string()))?;
        let client = SignerMiddleware::new_with_provider_chain(provider, wallet)
            .await
            .map_err(|e| ExecutionError::Signer(e.to_string()))?;
        Ok(Self {
            client,
            confirmations: confirmations.max(1),
        })
    }

    /// Replay a mined transaction against its parent block to recover the revert reason.
    async fn revert_reason(&self, hash: H256, block: Option<U64>) -> Option<String> {
        let tx = self.client.get_transaction(hash).await.ok()??;
        let mut replay = TransactionRequest::new()
            .from(tx.from)
            .data(tx.input)
            .value(tx.value)
            .gas(tx.gas);
        if let Some(to) = tx.to {
            replay = replay.to(to);
        }
        let replay: TypedTransaction = replay.into();
        let at = block.map(replay_block);

        match self.client.provider().call(&replay, at).await {
            Ok(_) => None,
            Err(err) => {
                let response = err.as_error_response()?;
                response
                    .as_revert_data()
                    .and_then(|data| alloy_sol_types::decode_revert_reason(&data))
                    .or_else(|| Some(response.message.clone()))
            }
        }
    }
}

/// The parent of the block a transaction was mined in, i.e. the state it executed against.
fn replay_block(mined_in: U64) -> BlockId {
    BlockId::Number(BlockNumber::Number(mined_in.saturating_sub(U64::one())))
}

#[async_trait]
impl ChainReader for EthersSigner {
    async fn chain_id(&self) -> Result<u64, ExecutionError> {
        let id = self.client.get_chainid().await.map_err(transport)?;
        Ok(id.as_u64())
    }

    async fn read(&self, to: Address, calldata: Bytes) -> Result<Bytes, ExecutionError> {
        eth_call(self.client.provider(), to, calldata).await
    }
}

#[async_trait]
impl ChainSigner for EthersSigner {
    fn address(&self) -> Address {
        from_h160(self.client.address())
    }

    async fn submit(&self, call: ContractCall) -> Result<B256, ExecutionError> {
        let mut request = TransactionRequest::new()
            .from(self.client.address())
            .to(to_h160(call.to))
            .data(RpcBytes::from(call.calldata.to_vec()));
        if let Some(gas_limit) = call.gas_limit {
            request = request.gas(gas_limit);
        }
        let pending = self
            .client
            .send_transaction(request, None)
            .await
            .map_err(transport)?;
        Ok(from_h256(*pending))
    }

    async fn wait(&self, hash: B256) -> Result<Confirmation, ExecutionError> {
        let tx_hash = to_h256(hash);
        let receipt = PendingTransaction::new(tx_hash, self.client.provider())
            .confirmations(self.confirmations)
            .await
            .map_err(transport)?
            .ok_or(ExecutionError::Dropped(hash))?;

        let block_number = receipt.block_number.map(|b| b.as_u64());
        if receipt.status == Some(U64::one()) {
            return Ok(Confirmation::Confirmed { block_number });
        }
        let reason = self.revert_reason(tx_hash, receipt.block_number).await;
        Ok(Confirmation::Reverted {
            block_number,
            reason,
        })
    }
}

async fn eth_call<M: Middleware>(
    client: &M,
    to: Address,
    calldata: Bytes,
) -> Result<Bytes, ExecutionError> {
    let request: TypedTransaction = TransactionRequest::new()
        .to(to_h160(to))
        .data(RpcBytes::from(calldata.to_vec()))
        .into();
    let out = client.call(&request, None).await.map_err(transport)?;
    Ok(Bytes::from(out.to_vec()))
}

fn http_provider(rpc_url: &str) -> Result<Provider<Http>, ExecutionError> {
    Provider::<Http>::try_from(rpc_url)
        .map_err(|e| ExecutionError::Transport(format!("invalid rpc url `{rpc_url}`: {e}")))
}

fn transport<E: std::fmt::Display>(err: E) -> ExecutionError {
    ExecutionError::Transport(err.to_string())
}

fn to_h160(address: Address) -> H160 {
    H160::from_slice(address.as_slice())
}

fn from_h160(address: H160) -> Address {
    Address::from_slice(address.as_bytes())
}

fn to_h256(hash: B256) -> H256 {
    H256::from_slice(hash.as_slice())
}

fn from_h256(hash: H256) -> B256 {
    B256::from_slice(hash.as_bytes())
}
