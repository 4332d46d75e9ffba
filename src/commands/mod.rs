//! CLI command implementations for mediagate.
//!
//! - [`serve`] - Run the gateway over the configured store
//! - [`check`] - Validate configuration without serving

pub mod check;
pub mod serve;
