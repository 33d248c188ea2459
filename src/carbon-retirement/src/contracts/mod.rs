//! Calldata encoding and return-data decoding for the consumed contracts.
//!
//! The ABI descriptors themselves live in `carbon_retirement_types::abi`; this module is the only
//! place that turns them into bytes.

pub mod calls;
pub mod constants;
