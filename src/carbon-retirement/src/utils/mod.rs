//! Small, deterministic helpers shared by the resolver and the CLI.

pub mod address;
pub mod units;
