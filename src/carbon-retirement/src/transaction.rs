//! Submit-then-confirm step shared by every state-changing call.

use std::time::Duration;

use alloy_primitives::B256;
use carbon_retirement_types::{TransactionRecord, TxStage};
use tracing::{info, warn};

use crate::{
    errors::{AllowanceError, ExecutionError, RetirementError, SwapError, TimeoutError},
    executor::{ChainSigner, Confirmation, ContractCall},
};

/// Receives every status transition of the records produced by a run.
pub type RecordObserver<'a> = &'a mut (dyn FnMut(&TransactionRecord) + Send);

/// Why a submit-then-confirm step did not end in a confirmed transaction.
#[derive(Debug)]
pub(crate) enum StepFailure {
    Submission(ExecutionError),
    Reverted { hash: B256, reason: Option<String> },
    TimedOut(TimeoutError),
    Wait { hash: B256, source: ExecutionError },
}

/// Submit `call`, then block until it is mined or `timeout` elapses.
///
/// The returned record is always `Confirmed`. A pending transaction cannot be cancelled
/// locally, so a timeout only stops waiting.
pub(crate) async fn submit_and_confirm<S: ChainSigner + ?Sized>(
    signer: &S,
    call: ContractCall,
    stage: TxStage,
    timeout: Duration,
    observer: RecordObserver<'_>,
) -> Result<TransactionRecord, StepFailure> {
    let to = call.to;
    let gas_limit = call.gas_limit;
    let hash = signer.submit(call).await.map_err(StepFailure::Submission)?;

    let mut record = TransactionRecord::pending(hash, stage);
    info!(target: "retirement", %stage, %hash, %to, ?gas_limit, "transaction_submitted");
    observer(&record);

    match tokio::time::timeout(timeout, signer.wait(hash)).await {
        Err(_) => {
            warn!(target: "retirement", %stage, %hash, timeout_secs = timeout.as_secs(), "confirmation_timed_out");
            Err(StepFailure::TimedOut(TimeoutError {
                stage,
                hash,
                waited: timeout,
            }))
        }
        Ok(Err(source)) => {
            warn!(target: "retirement", %stage, %hash, error = %source, "confirmation_wait_failed");
            Err(StepFailure::Wait { hash, source })
        }
        Ok(Ok(Confirmation::Confirmed { block_number })) => {
            record.confirm(block_number);
            info!(target: "retirement", %stage, %hash, ?block_number, "transaction_confirmed");
            observer(&record);
            Ok(record)
        }
        Ok(Ok(Confirmation::Reverted {
            block_number,
            reason,
        })) => {
            record.fail(block_number, reason.clone());
            warn!(target: "retirement", %stage, %hash, ?block_number, ?reason, "transaction_reverted");
            observer(&record);
            Err(StepFailure::Reverted { hash, reason })
        }
    }
}

impl From<StepFailure> for AllowanceError {
    fn from(failure: StepFailure) -> Self {
        match failure {
            StepFailure::Submission(e) => AllowanceError::Submission(e),
            StepFailure::Reverted { hash, reason } => AllowanceError::Reverted { hash, reason },
            StepFailure::TimedOut(t) => AllowanceError::TimedOut(t),
            StepFailure::Wait { hash, source } => AllowanceError::Wait { hash, source },
        }
    }
}

impl From<StepFailure> for RetirementError {
    fn from(failure: StepFailure) -> Self {
        match failure {
            StepFailure::Submission(e) => RetirementError::Submission(e),
            StepFailure::Reverted { hash, reason } => RetirementError::Reverted { hash, reason },
            StepFailure::TimedOut(t) => RetirementError::TimedOut(t),
            StepFailure::Wait { hash, source } => RetirementError::Wait { hash, source },
        }
    }
}

impl From<StepFailure> for SwapError {
    fn from(failure: StepFailure) -> Self {
        match failure {
            StepFailure::Submission(e) => SwapError::Submission(e),
            StepFailure::Reverted { hash, reason } => SwapError::Reverted { hash, reason },
            StepFailure::TimedOut(t) => SwapError::TimedOut(t),
            StepFailure::Wait { hash, source } => SwapError::Wait { hash, source },
        }
    }
}
