use std::time::Duration;

use alloy_primitives::B256;
use carbon_retirement_types::TxStage;
use thiserror::Error;

/// Invalid network, address or amount input.
pub use carbon_retirement_types::ConfigurationError;

/// Failures of the provider/signer capability itself.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("signer failed: {0}")]
    Signer(String),
    #[error("could not decode `{call}` return data: {reason}")]
    Decode { call: &'static str, reason: String },
    #[error("transaction {0} was dropped before inclusion")]
    Dropped(B256),
}

/// A confirmation wait exceeded the configured bound.
///
/// The transaction's final status is unknown: re-query `hash` instead of resubmitting, which
/// risks a duplicate spend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{stage} transaction {hash} not confirmed within {}s; final status unknown, re-query before resubmitting",
    .waited.as_secs()
)]
pub struct TimeoutError {
    pub stage: TxStage,
    pub hash: B256,
    pub waited: Duration,
}

/// Approval could not be established; retirement was not attempted.
#[derive(Debug, Error)]
pub enum AllowanceError {
    #[error("failed to read current allowance")]
    Query(#[source] ExecutionError),
    #[error("failed to submit approval")]
    Submission(#[source] ExecutionError),
    #[error("approval {hash} reverted: {}", display_reason(.reason))]
    Reverted { hash: B256, reason: Option<String> },
    #[error(transparent)]
    TimedOut(TimeoutError),
    #[error("failed waiting for approval {hash}")]
    Wait {
        hash: B256,
        #[source]
        source: ExecutionError,
    },
}

/// Retirement transaction failed after a valid allowance was confirmed.
#[derive(Debug, Error)]
pub enum RetirementError {
    #[error("failed to submit retirement")]
    Submission(#[source] ExecutionError),
    #[error("retirement {hash} reverted: {}", display_reason(.reason))]
    Reverted { hash: B256, reason: Option<String> },
    #[error(transparent)]
    TimedOut(TimeoutError),
    #[error("failed waiting for retirement {hash}")]
    Wait {
        hash: B256,
        #[source]
        source: ExecutionError,
    },
}

/// Swap transaction failed after the input-token allowance was confirmed.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("failed to submit swap")]
    Submission(#[source] ExecutionError),
    #[error("swap {hash} reverted: {}", display_reason(.reason))]
    Reverted { hash: B256, reason: Option<String> },
    #[error(transparent)]
    TimedOut(TimeoutError),
    #[error("failed waiting for swap {hash}")]
    Wait {
        hash: B256,
        #[source]
        source: ExecutionError,
    },
}

/// Result of a whole orchestration run. Each failure aborts the remaining steps.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Allowance(#[from] AllowanceError),
    #[error(transparent)]
    Retirement(#[from] RetirementError),
    #[error(transparent)]
    Swap(#[from] SwapError),
    /// A read-only query failed before any transaction was submitted.
    #[error("provider query failed before any transaction was submitted")]
    Provider(#[source] ExecutionError),
}

impl OrchestrationError {
    /// The timed-out transaction, if this run ended on a confirmation timeout.
    pub fn timeout(&self) -> Option<&TimeoutError> {
        match self {
            OrchestrationError::Allowance(AllowanceError::TimedOut(t))
            | OrchestrationError::Retirement(RetirementError::TimedOut(t))
            | OrchestrationError::Swap(SwapError::TimedOut(t)) => Some(t),
            _ => None,
        }
    }

    /// Hash of the transaction this run failed on, if one was submitted.
    pub fn failed_hash(&self) -> Option<B256> {
        match self {
            OrchestrationError::Allowance(
                AllowanceError::Reverted { hash, .. } | AllowanceError::Wait { hash, .. },
            )
            | OrchestrationError::Retirement(
                RetirementError::Reverted { hash, .. } | RetirementError::Wait { hash, .. },
            )
            | OrchestrationError::Swap(
                SwapError::Reverted { hash, .. } | SwapError::Wait { hash, .. },
            ) => Some(*hash),
            _ => self.timeout().map(|t| t.hash),
        }
    }
}

fn display_reason(reason: &Option<String>) -> &str {
    reason.as_deref().unwrap_or("no reason provided")
}
