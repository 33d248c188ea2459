use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use carbon_retirement_types::{
    abi::{IRetirementHelper, ISimpleSwap, IERC20},
    RetirementRequest,
};

use crate::errors::ExecutionError;

pub fn allowance(owner: Address, spender: Address) -> Bytes {
    IERC20::allowanceCall { owner, spender }.abi_encode().into()
}

pub fn decode_allowance(data: &[u8]) -> Result<U256, ExecutionError> {
    IERC20::allowanceCall::abi_decode_returns(data, true)
        .map(|ret| ret._0)
        .map_err(|e| decode_error(IERC20::allowanceCall::SIGNATURE, e))
}

pub fn approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn decimals() -> Bytes {
    IERC20::decimalsCall {}.abi_encode().into()
}

pub fn decode_decimals(data: &[u8]) -> Result<u8, ExecutionError> {
    IERC20::decimalsCall::abi_decode_returns(data, true)
        .map(|ret| ret._0)
        .map_err(|e| decode_error(IERC20::decimalsCall::SIGNATURE, e))
}

/// `retireSpecificProject(pool, tokens[], amounts[])`. Sequences even for one project.
pub fn retire_specific_project(request: &RetirementRequest) -> Bytes {
    IRetirementHelper::retireSpecificProjectCall {
        _fromToken: request.pool(),
        _tco2s: request.project_tokens().to_vec(),
        _amounts: request.amounts().to_vec(),
    }
    .abi_encode()
    .into()
}

pub fn swap_exact_input_single(token_in: Address, token_out: Address, amount_in: U256) -> Bytes {
    ISimpleSwap::swapExactInputSingleCall {
        tokenIn: token_in,
        tokenOut: token_out,
        amountIn: amount_in,
    }
    .abi_encode()
    .into()
}

fn decode_error(call: &'static str, err: alloy_sol_types::Error) -> ExecutionError {
    ExecutionError::Decode {
        call,
        reason: err.to_string(),
    }
}
