//! Shared models, traits and helpers used by the recipe cookbook.
//!
//! This crate holds everything a recipe needs to talk about balances and calls without
//! knowing how steps are composed: resource records, call descriptors, quote records,
//! fee arithmetic, the per-network configuration table and the calldata encoders for the
//! standard token interfaces.

pub mod config;
pub mod contract;
pub mod fees;
pub mod models;
pub mod traits;

pub use alloy_primitives::{Address, Bytes};
