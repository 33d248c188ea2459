use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Which step of an orchestration run a transaction belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStage {
    Approval,
    Retirement,
    Swap,
}

impl std::fmt::Display for TxStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TxStage::Approval => "approval",
            TxStage::Retirement => "retirement",
            TxStage::Swap => "swap",
        };
        f.write_str(s)
    }
}

/// Caller-visible result of a submitted transaction.
///
/// Created `Pending` on submission and moved to `Confirmed` or `Failed` once a receipt is seen.
/// A record that is still `Pending` after a timeout has an unknown final status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: B256,
    pub stage: TxStage,
    pub status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl TransactionRecord {
    pub fn pending(hash: B256, stage: TxStage) -> Self {
        Self {
            hash,
            stage,
            status: TxStatus::Pending,
            block_number: None,
            failure_reason: None,
        }
    }

    pub fn confirm(&mut self, block_number: Option<u64>) {
        self.status = TxStatus::Confirmed;
        self.block_number = block_number;
    }

    pub fn fail(&mut self, block_number: Option<u64>, reason: Option<String>) {
        self.status = TxStatus::Failed;
        self.block_number = block_number;
        self.failure_reason = reason;
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == TxStatus::Confirmed
    }
}
