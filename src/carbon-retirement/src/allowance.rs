//! Idempotent allowance management.
//!
//! The only component that mutates allowance state. The on-chain allowance is re-read on every
//! call and approvals are bounded to the exact amount needed, never unlimited.

use std::time::Duration;

use alloy_primitives::{Address, U256};
use carbon_retirement_types::{Allowance, TransactionRecord, TxStage};
use tracing::{debug, info};

use crate::{
    contracts::calls,
    errors::{AllowanceError, ExecutionError},
    executor::{ChainReader, ChainSigner, ContractCall},
    transaction::{submit_and_confirm, RecordObserver},
};

#[derive(Clone, Debug)]
pub struct AllowanceManager {
    confirmation_timeout: Duration,
}

impl AllowanceManager {
    pub fn new(confirmation_timeout: Duration) -> Self {
        Self {
            confirmation_timeout,
        }
    }

    /// Current `token.allowance(owner, spender)`.
    pub async fn current_allowance<R: ChainReader + ?Sized>(
        reader: &R,
        owner: Address,
        spender: Address,
        token: Address,
    ) -> Result<Allowance, ExecutionError> {
        let out = reader.read(token, calls::allowance(owner, spender)).await?;
        Ok(Allowance {
            owner,
            spender,
            token,
            amount: calls::decode_allowance(&out)?,
        })
    }

    /// Make sure `spender` may draw `required` of `token` from the signer's account.
    ///
    /// Returns `None` without submitting anything when the existing allowance already covers
    /// `required`; otherwise the confirmed approval record.
    pub async fn ensure_allowance<S: ChainSigner + ?Sized>(
        &self,
        signer: &S,
        spender: Address,
        token: Address,
        required: U256,
    ) -> Result<Option<TransactionRecord>, AllowanceError> {
        self.ensure_allowance_observed(signer, spender, token, required, &mut |_: &TransactionRecord| {})
            .await
    }

    pub async fn ensure_allowance_observed<S: ChainSigner + ?Sized>(
        &self,
        signer: &S,
        spender: Address,
        token: Address,
        required: U256,
        observer: RecordObserver<'_>,
    ) -> Result<Option<TransactionRecord>, AllowanceError> {
        let owner = signer.address();
        let current = Self::current_allowance(signer, owner, spender, token)
            .await
            .map_err(AllowanceError::Query)?;

        if current.covers(required) {
            debug!(
                target: "retirement",
                %owner, %spender, %token,
                current = %current.amount, %required,
                "allowance_sufficient"
            );
            return Ok(None);
        }

        info!(
            target: "retirement",
            %owner, %spender, %token,
            current = %current.amount, %required,
            shortfall = %current.shortfall(required),
            "allowance_approving"
        );
        // approve() overwrites, so approving `required` covers the shortfall exactly.
        let call = ContractCall {
            to: token,
            calldata: calls::approve(spender, required),
            gas_limit: None,
        };
        let record = submit_and_confirm(
            signer,
            call,
            TxStage::Approval,
            self.confirmation_timeout,
            observer,
        )
        .await?;
        Ok(Some(record))
    }
}
