//! Retirement orchestration: allowance first, then `retireSpecificProject`.
//!
//! Each step waits for on-chain confirmation before the next dependent call is submitted.
//! Concurrent runs for the same owner against the same helper race on the allowance and must be
//! serialized by the caller; the orchestrator keeps no mutable state between runs.

use std::sync::Arc;

use carbon_retirement_types::{NetworkProfile, RetirementRequest, TransactionRecord, TxStage};
use tracing::{info, instrument};

use crate::{
    allowance::AllowanceManager,
    config::OrchestratorConfig,
    contracts::calls,
    errors::{ConfigurationError, OrchestrationError, RetirementError},
    executor::{ChainSigner, ContractCall},
    resolver::verify_chain,
    transaction::{submit_and_confirm, RecordObserver},
};

pub struct RetirementOrchestrator {
    signer: Arc<dyn ChainSigner>,
    config: OrchestratorConfig,
    allowances: AllowanceManager,
}

impl RetirementOrchestrator {
    pub fn new(signer: Arc<dyn ChainSigner>, config: OrchestratorConfig) -> Self {
        let allowances = AllowanceManager::new(config.confirmation_timeout());
        Self {
            signer,
            config,
            allowances,
        }
    }

    /// Retire `request` on `network`, returning the confirmed retirement record.
    pub async fn retire(
        &self,
        request: &RetirementRequest,
        network: &NetworkProfile,
    ) -> Result<TransactionRecord, OrchestrationError> {
        self.retire_observed(request, network, &mut |_: &TransactionRecord| {})
            .await
    }

    /// As [`retire`](Self::retire), reporting every record transition to `observer`.
    #[instrument(
        target = "retirement",
        skip_all,
        fields(network = %network.name, projects = request.len())
    )]
    pub async fn retire_observed(
        &self,
        request: &RetirementRequest,
        network: &NetworkProfile,
        observer: RecordObserver<'_>,
    ) -> Result<TransactionRecord, OrchestrationError> {
        if request.pool() != network.pool {
            return Err(ConfigurationError::PoolMismatch {
                request: request.pool(),
                network: network.pool,
            }
            .into());
        }
        let required = request.total_amount()?;
        verify_chain(self.signer.as_ref(), network).await?;

        // Hard ordering point: nothing below runs unless the approval (if any) is mined.
        self.allowances
            .ensure_allowance_observed(
                self.signer.as_ref(),
                network.helper,
                network.allowance_token,
                required,
                &mut *observer,
            )
            .await?;

        let call = ContractCall {
            to: network.helper,
            calldata: calls::retire_specific_project(request),
            gas_limit: Some(self.config.retirement_gas_limit),
        };
        let record = submit_and_confirm(
            self.signer.as_ref(),
            call,
            TxStage::Retirement,
            self.config.confirmation_timeout(),
            observer,
        )
        .await
        .map_err(RetirementError::from)?;

        info!(target: "retirement", hash = %record.hash, total = %required, "retirement_confirmed");
        Ok(record)
    }
}
