//! Scripted in-memory chain used by the orchestration tests.
//!
//! Applies ERC-20 allowance and retirement semantics only when a transaction is confirmed, and
//! records every read, submission and receipt in order so tests can assert on sequencing.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use carbon_retirement::{
    types::{
        abi::{IRetirementHelper, ISimpleSwap, IERC20},
        NetworkProfile,
    },
    ChainReader, ChainSigner, Confirmation, ContractCall, ExecutionError,
};

pub const CHAIN_ID: u64 = 42220;

pub fn owner() -> Address {
    Address::repeat_byte(0xaa)
}

pub fn pool() -> Address {
    Address::repeat_byte(0x01)
}

pub fn helper() -> Address {
    Address::repeat_byte(0x02)
}

pub fn swapper() -> Address {
    Address::repeat_byte(0x03)
}

pub fn deposit_token() -> Address {
    Address::repeat_byte(0x04)
}

pub fn project(n: u8) -> Address {
    Address::repeat_byte(0x10 + n)
}

pub fn profile() -> NetworkProfile {
    NetworkProfile {
        name: "testnet".to_string(),
        chain_id: CHAIN_ID,
        pool: pool(),
        helper: helper(),
        allowance_token: pool(),
        swapper: Some(swapper()),
        projects: [("TCO2-A".to_string(), project(1)), ("TCO2-B".to_string(), project(2))]
            .into_iter()
            .collect(),
        rpc_url: None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedCall {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Retire {
        pool: Address,
        tokens: Vec<Address>,
        amounts: Vec<U256>,
    },
    Swap {
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainEvent {
    Read { to: Address, selector: [u8; 4] },
    Submitted {
        hash: B256,
        call: DecodedCall,
        gas_limit: Option<u64>,
    },
    Confirmed { hash: B256 },
    Reverted { hash: B256 },
}

/// Which stage's receipt never arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hang {
    Approval,
    Retirement,
}

#[derive(Default)]
struct State {
    // (token, owner, spender) -> amount
    allowances: HashMap<(Address, Address, Address), U256>,
    decimals: HashMap<Address, u8>,
    pending: HashMap<B256, DecodedCall>,
    events: Vec<ChainEvent>,
    next_nonce: u64,
    revert_approval: Option<String>,
    revert_retirement: Option<String>,
    hang: Option<Hang>,
}

pub struct MockChain {
    owner: Address,
    chain_id: u64,
    state: Mutex<State>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Self::on_chain(CHAIN_ID)
    }

    pub fn on_chain(chain_id: u64) -> Arc<Self> {
        let mut state = State::default();
        state.decimals.insert(pool(), 18);
        Arc::new(Self {
            owner: owner(),
            chain_id,
            state: Mutex::new(state),
        })
    }

    pub fn set_allowance(&self, token: Address, spender: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, self.owner, spender), amount);
    }

    pub fn allowance(&self, token: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .allowances
            .get(&(token, self.owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_decimals(&self, token: Address, decimals: u8) {
        self.state.lock().unwrap().decimals.insert(token, decimals);
    }

    pub fn revert_approval(&self, reason: &str) {
        self.state.lock().unwrap().revert_approval = Some(reason.to_string());
    }

    pub fn revert_retirement(&self, reason: &str) {
        self.state.lock().unwrap().revert_retirement = Some(reason.to_string());
    }

    pub fn hang(&self, stage: Hang) {
        self.state.lock().unwrap().hang = Some(stage);
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn submissions(&self) -> Vec<DecodedCall> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChainEvent::Submitted { call, .. } => Some(call),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ChainEvent::Read { .. }))
            .count()
    }

    fn decode(to: Address, data: &[u8]) -> Result<DecodedCall, ExecutionError> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ExecutionError::Transport("calldata too short".to_string()))?;
        let bad = |e: alloy_sol_types::Error| ExecutionError::Transport(e.to_string());

        if selector == IERC20::approveCall::SELECTOR {
            let call = IERC20::approveCall::abi_decode(data, true).map_err(bad)?;
            return Ok(DecodedCall::Approve {
                token: to,
                spender: call.spender,
                amount: call.amount,
            });
        }
        if selector == IRetirementHelper::retireSpecificProjectCall::SELECTOR {
            let call =
                IRetirementHelper::retireSpecificProjectCall::abi_decode(data, true).map_err(bad)?;
            return Ok(DecodedCall::Retire {
                pool: call._fromToken,
                tokens: call._tco2s,
                amounts: call._amounts,
            });
        }
        if selector == ISimpleSwap::swapExactInputSingleCall::SELECTOR {
            let call =
                ISimpleSwap::swapExactInputSingleCall::abi_decode(data, true).map_err(bad)?;
            return Ok(DecodedCall::Swap {
                token_in: call.tokenIn,
                token_out: call.tokenOut,
                amount_in: call.amountIn,
            });
        }
        Err(ExecutionError::Transport(format!(
            "unexpected selector {selector:02x?}"
        )))
    }

    /// Apply a mined transaction. Effects happen only on success.
    fn execute(&self, state: &mut State, spender: Address, call: &DecodedCall) -> Result<(), String> {
        match call {
            DecodedCall::Approve {
                token,
                spender,
                amount,
            } => {
                if let Some(reason) = &state.revert_approval {
                    return Err(reason.clone());
                }
                state.allowances.insert((*token, self.owner, *spender), *amount);
                Ok(())
            }
            DecodedCall::Retire { pool, amounts, .. } => {
                if let Some(reason) = &state.revert_retirement {
                    return Err(reason.clone());
                }
                let total = amounts.iter().fold(U256::ZERO, |acc, a| acc + *a);
                let key = (*pool, self.owner, spender);
                let allowance = state.allowances.get(&key).copied().unwrap_or_default();
                if allowance < total {
                    return Err("ERC20: insufficient allowance".to_string());
                }
                state.allowances.insert(key, allowance - total);
                Ok(())
            }
            DecodedCall::Swap {
                token_in,
                amount_in,
                ..
            } => {
                let key = (*token_in, self.owner, spender);
                let allowance = state.allowances.get(&key).copied().unwrap_or_default();
                if allowance < *amount_in {
                    return Err("STF".to_string());
                }
                state.allowances.insert(key, allowance - *amount_in);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn chain_id(&self) -> Result<u64, ExecutionError> {
        Ok(self.chain_id)
    }

    async fn read(&self, to: Address, calldata: Bytes) -> Result<Bytes, ExecutionError> {
        let mut state = self.state.lock().unwrap();
        let selector: [u8; 4] = calldata
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ExecutionError::Transport("calldata too short".to_string()))?;
        state.events.push(ChainEvent::Read { to, selector });

        if selector == IERC20::allowanceCall::SELECTOR {
            let call = IERC20::allowanceCall::abi_decode(&calldata, true)
                .map_err(|e| ExecutionError::Transport(e.to_string()))?;
            let amount = state
                .allowances
                .get(&(to, call.owner, call.spender))
                .copied()
                .unwrap_or_default();
            return Ok(amount.to_be_bytes::<32>().to_vec().into());
        }
        if selector == IERC20::decimalsCall::SELECTOR {
            let decimals = state
                .decimals
                .get(&to)
                .copied()
                .ok_or_else(|| ExecutionError::Transport("execution reverted".to_string()))?;
            return Ok(U256::from(decimals).to_be_bytes::<32>().to_vec().into());
        }
        Err(ExecutionError::Transport(format!(
            "unexpected read selector {selector:02x?}"
        )))
    }
}

#[async_trait]
impl ChainSigner for MockChain {
    fn address(&self) -> Address {
        self.owner
    }

    async fn submit(&self, call: ContractCall) -> Result<B256, ExecutionError> {
        let decoded = Self::decode(call.to, &call.calldata)?;
        let mut state = self.state.lock().unwrap();
        state.next_nonce += 1;
        let hash = B256::left_padding_from(&state.next_nonce.to_be_bytes());
        state.pending.insert(hash, decoded.clone());
        state.events.push(ChainEvent::Submitted {
            hash,
            call: decoded,
            gas_limit: call.gas_limit,
        });
        Ok(hash)
    }

    async fn wait(&self, hash: B256) -> Result<Confirmation, ExecutionError> {
        let hangs = {
            let state = self.state.lock().unwrap();
            let call = state
                .pending
                .get(&hash)
                .ok_or(ExecutionError::Dropped(hash))?;
            matches!(
                (state.hang, call),
                (Some(Hang::Approval), DecodedCall::Approve { .. })
                    | (Some(Hang::Retirement), DecodedCall::Retire { .. })
            )
        };
        if hangs {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();
        let call = state
            .pending
            .remove(&hash)
            .ok_or(ExecutionError::Dropped(hash))?;
        let spender = match &call {
            DecodedCall::Approve { spender, .. } => *spender,
            DecodedCall::Retire { .. } => helper(),
            DecodedCall::Swap { .. } => swapper(),
        };
        let block_number = Some(state.next_nonce + 100);
        match self.execute(&mut *state, spender, &call) {
            Ok(()) => {
                state.events.push(ChainEvent::Confirmed { hash });
                Ok(Confirmation::Confirmed { block_number })
            }
            Err(reason) => {
                state.events.push(ChainEvent::Reverted { hash });
                Ok(Confirmation::Reverted {
                    block_number,
                    reason: Some(reason),
                })
            }
        }
    }
}
