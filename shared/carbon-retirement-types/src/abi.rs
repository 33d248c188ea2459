//! Solidity ABI descriptors for the contracts consumed by the orchestrator.
//!
//! Only the externally callable surface that the client actually encodes or decodes is declared
//! here. Calldata is produced with `SolCall::abi_encode` and return data decoded with
//! `SolCall::abi_decode_returns`.

use alloy_sol_types::sol;

sol! {
    /// ERC-20 surface of the pool token (the allowance token) and of any swap input token.
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
    }

    /// Retirement helper: redeems `_amounts[i]` of the pool token `_fromToken` for the project
    /// credit token `_tco2s[i]` and retires it. Draws the summed amount from the caller's
    /// allowance in a single call.
    #[derive(Debug, PartialEq, Eq)]
    interface IRetirementHelper {
        function retireSpecificProject(address _fromToken, address[] _tco2s, uint256[] _amounts) external;
    }

    /// Swap helper used to acquire pool tokens from a deposited ERC-20.
    #[derive(Debug, PartialEq, Eq)]
    interface ISimpleSwap {
        function swapExactInputSingle(address tokenIn, address tokenOut, uint256 amountIn) external returns (uint256 amountOut);
    }
}
