//! Pool-token acquisition through the network's swap helper.
//!
//! Same two-step shape as retirement: the input token is approved for the swapper, then a
//! single `swapExactInputSingle(tokenIn, pool, amountIn)` is submitted once the approval is mined.

use std::sync::Arc;

use carbon_retirement_types::{NetworkProfile, SwapRequest, TransactionRecord, TxStage};
use tracing::instrument;

use crate::{
    allowance::AllowanceManager,
    config::OrchestratorConfig,
    contracts::calls,
    errors::{ConfigurationError, OrchestrationError, SwapError},
    executor::{ChainSigner, ContractCall},
    resolver::verify_chain,
    transaction::{submit_and_confirm, RecordObserver},
};

pub struct SwapOrchestrator {
    signer: Arc<dyn ChainSigner>,
    config: OrchestratorConfig,
    allowances: AllowanceManager,
}

impl SwapOrchestrator {
    pub fn new(signer: Arc<dyn ChainSigner>, config: OrchestratorConfig) -> Self {
        let allowances = AllowanceManager::new(config.confirmation_timeout());
        Self {
            signer,
            config,
            allowances,
        }
    }

    pub async fn swap(
        &self,
        request: &SwapRequest,
        network: &NetworkProfile,
    ) -> Result<TransactionRecord, OrchestrationError> {
        self.swap_observed(request, network, &mut |_: &TransactionRecord| {})
            .await
    }

    #[instrument(target = "retirement", skip_all, fields(network = %network.name))]
    pub async fn swap_observed(
        &self,
        request: &SwapRequest,
        network: &NetworkProfile,
        observer: RecordObserver<'_>,
    ) -> Result<TransactionRecord, OrchestrationError> {
        let swapper = network
            .swapper
            .ok_or_else(|| ConfigurationError::MissingSwapper(network.name.clone()))?;
        verify_chain(self.signer.as_ref(), network).await?;

        self.allowances
            .ensure_allowance_observed(
                self.signer.as_ref(),
                swapper,
                request.token_in,
                request.amount_in,
                &mut *observer,
            )
            .await?;

        let call = ContractCall {
            to: swapper,
            calldata: calls::swap_exact_input_single(
                request.token_in,
                network.pool,
                request.amount_in,
            ),
            gas_limit: Some(self.config.swap_gas_limit),
        };
        let record = submit_and_confirm(
            self.signer.as_ref(),
            call,
            TxStage::Swap,
            self.config.confirmation_timeout(),
            observer,
        )
        .await
        .map_err(SwapError::from)?;
        Ok(record)
    }
}
