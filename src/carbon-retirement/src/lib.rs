//! Carbon-credit retirement orchestration.
//!
//! Resolves a network profile and request, ensures the retirement helper holds a sufficient
//! pool-token allowance, then submits `retireSpecificProject` and waits for it to be mined.
//!
//! Flow: [`resolver`] -> [`allowance`] -> [`orchestrator`]. Chain access is always injected
//! through [`executor::ChainSigner`] / [`executor::ChainReader`].

pub mod allowance;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod executor;
pub mod orchestrator;
pub mod resolver;
pub mod swap;
pub mod utils;

mod transaction;

pub use carbon_retirement_types as types;

pub use allowance::AllowanceManager;
pub use config::{NetworksConfig, OrchestratorConfig};
pub use errors::{
    AllowanceError, ConfigurationError, ExecutionError, OrchestrationError, RetirementError,
    SwapError, TimeoutError,
};
pub use executor::{ChainReader, ChainSigner, Confirmation, ContractCall};
pub use orchestrator::RetirementOrchestrator;
pub use resolver::{Amount, NetworkRegistry};
pub use swap::SwapOrchestrator;
pub use transaction::RecordObserver;
