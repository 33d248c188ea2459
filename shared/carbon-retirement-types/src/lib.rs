//! Shared types for carbon-credit retirement: network profiles, requests, transaction records
//! and the static ABI descriptors of the contracts the orchestrator talks to.

pub mod abi;
pub mod allowance;
pub mod error;
pub mod network;
pub mod record;
pub mod request;

pub use allowance::Allowance;
pub use error::ConfigurationError;
pub use network::NetworkProfile;
pub use record::{TransactionRecord, TxStage, TxStatus};
pub use request::{RetirementRequest, SwapRequest};
