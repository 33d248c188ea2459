use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Retire `amounts[i]` of the pool token as project credit token `project_tokens[i]`.
///
/// Always a sequence, even for a single project. Construct through [`RetirementRequest::new`],
/// which enforces equal lengths and positive amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RetirementRequest {
    pool: Address,
    project_tokens: Vec<Address>,
    amounts: Vec<U256>,
}

impl RetirementRequest {
    pub fn new(
        pool: Address,
        project_tokens: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<Self, ConfigurationError> {
        if project_tokens.len() != amounts.len() {
            return Err(ConfigurationError::LengthMismatch {
                tokens: project_tokens.len(),
                amounts: amounts.len(),
            });
        }
        if project_tokens.is_empty() {
            return Err(ConfigurationError::EmptyRequest);
        }
        if let Some(index) = amounts.iter().position(|a| a.is_zero()) {
            return Err(ConfigurationError::NonPositiveAmount { index });
        }
        Ok(Self {
            pool,
            project_tokens,
            amounts,
        })
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn project_tokens(&self) -> &[Address] {
        &self.project_tokens
    }

    pub fn amounts(&self) -> &[U256] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.project_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.project_tokens.is_empty()
    }

    /// Sum of all amounts; the allowance the helper will draw in one call.
    pub fn total_amount(&self) -> Result<U256, ConfigurationError> {
        self.amounts.iter().try_fold(U256::ZERO, |acc, amount| {
            acc.checked_add(*amount)
                .ok_or(ConfigurationError::AmountOverflow { partial: acc })
        })
    }
}

/// Acquire pool tokens by swapping `amount_in` of `token_in` through the network's swap helper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub token_in: Address,
    pub amount_in: U256,
}

impl SwapRequest {
    pub fn new(token_in: Address, amount_in: U256) -> Result<Self, ConfigurationError> {
        if amount_in.is_zero() {
            return Err(ConfigurationError::NonPositiveAmount { index: 0 });
        }
        Ok(Self {
            token_in,
            amount_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = RetirementRequest::new(addr(1), vec![addr(2), addr(3)], vec![U256::from(1)])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::LengthMismatch {
                tokens: 2,
                amounts: 1
            }
        );
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let err = RetirementRequest::new(
            addr(1),
            vec![addr(2), addr(3)],
            vec![U256::from(5), U256::ZERO],
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::NonPositiveAmount { index: 1 });
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let err = RetirementRequest::new(addr(1), vec![], vec![]).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyRequest);
    }

    #[test]
    fn test_total_amount_sums_all_projects() {
        let request = RetirementRequest::new(
            addr(1),
            vec![addr(2), addr(3)],
            vec![U256::from(40), U256::from(2)],
        )
        .unwrap();
        assert_eq!(request.total_amount().unwrap(), U256::from(42));
    }

    #[test]
    fn test_total_amount_overflow_is_a_configuration_error() {
        let request = RetirementRequest::new(
            addr(1),
            vec![addr(2), addr(3)],
            vec![U256::MAX, U256::from(1)],
        )
        .unwrap();
        assert!(matches!(
            request.total_amount(),
            Err(ConfigurationError::AmountOverflow { .. })
        ));
    }
}
